//! Metrics sink boundary.
//!
//! Lowering and binding logic MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics;
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    StatementLowered,
    FunctionResolved {
        function: &'a str,
    },
    ParameterSlotsAllocated {
        slots: u64,
    },
    /// The table-group-aware mapping lookup for a function result failed
    /// and the model expressible was treated as unavailable.
    ModelExpressibleUnavailable {
        function: &'a str,
    },
    BindingPlanBuilt {
        bindings: u64,
    },
    PlanCacheHit,
    PlanCacheMiss,
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics counters.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::StatementLowered => {
                m.ops.statements_lowered = m.ops.statements_lowered.saturating_add(1);
            }
            MetricsEvent::FunctionResolved { function } => {
                m.ops.function_resolutions = m.ops.function_resolutions.saturating_add(1);
                let entry = m.functions.entry(function.to_string()).or_default();
                *entry = entry.saturating_add(1);
            }
            MetricsEvent::ParameterSlotsAllocated { slots } => {
                m.ops.parameter_slots = m.ops.parameter_slots.saturating_add(slots);
            }
            MetricsEvent::ModelExpressibleUnavailable { .. } => {
                m.ops.model_expressible_fallbacks =
                    m.ops.model_expressible_fallbacks.saturating_add(1);
            }
            MetricsEvent::BindingPlanBuilt { bindings } => {
                m.ops.binding_plans = m.ops.binding_plans.saturating_add(1);
                m.ops.bindings = m.ops.bindings.saturating_add(bindings);
            }
            MetricsEvent::PlanCacheHit => {
                m.ops.plan_cache_hits = m.ops.plan_cache_hits.saturating_add(1);
            }
            MetricsEvent::PlanCacheMiss => {
                m.ops.plan_cache_misses = m.ops.plan_cache_misses.saturating_add(1);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset the current thread's counters.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}
