//! Interpretation cache: lowered and rendered statements keyed by their
//! fingerprint. Binding plans are never cached; they are rebuilt for every
//! execution from the cached slot index.

use crate::{
    binding::{
        DomainParameterXref, JdbcParameterBindings, JdbcParamsXref, QueryParameterBindings,
        StatementSink, bind_positional, build_jdbc_index, create_jdbc_parameter_bindings,
    },
    config::LoweringConfig,
    error::InternalError,
    lowering::{LoweredStatement, SqmToSqlConverter},
    model::DomainModel,
    obs::sink::{MetricsEvent, record},
    plan::{StatementFingerprint, fingerprint},
    sql::{RenderedSql, render_statement},
    sqm::{CopyContext, SqmStatement},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tracing::trace;

///
/// Interpretation
///
/// Everything about a statement that does not depend on bound values.
///

#[derive(Debug)]
pub struct Interpretation {
    pub fingerprint: StatementFingerprint,
    pub lowered: LoweredStatement,
    pub rendered: RenderedSql,
    pub jdbc_xref: JdbcParamsXref,
    pub affected_tables: BTreeSet<String>,
}

impl Interpretation {
    /// Lower a private copy of `statement`, leaving the caller's tree and
    /// its cached function result types untouched.
    pub fn build(
        statement: &SqmStatement,
        xref: &DomainParameterXref,
        model: &DomainModel,
        config: &LoweringConfig,
    ) -> Result<Self, InternalError> {
        Self::lower(fingerprint(statement, xref), statement, xref, model, config)
    }

    fn lower(
        fingerprint: StatementFingerprint,
        statement: &SqmStatement,
        xref: &DomainParameterXref,
        model: &DomainModel,
        config: &LoweringConfig,
    ) -> Result<Self, InternalError> {
        let mut context = CopyContext::new();
        let private = statement.copy(&mut context);

        let lowered = SqmToSqlConverter::new(model, config)
            .with_expansions(xref)
            .lower_statement(&private)?;
        let rendered = render_statement(&lowered.statement);
        let jdbc_xref = build_jdbc_index(xref, &lowered.jdbc_params)?;
        let affected_tables = lowered.statement.affected_table_names();

        Ok(Self {
            fingerprint,
            lowered,
            rendered,
            jdbc_xref,
            affected_tables,
        })
    }

    /// Binding plan for one execution.
    pub fn create_bindings(
        &self,
        bindings: &QueryParameterBindings,
        xref: &DomainParameterXref,
        model: &DomainModel,
    ) -> Result<JdbcParameterBindings, InternalError> {
        let plan = create_jdbc_parameter_bindings(
            bindings,
            xref,
            &self.jdbc_xref,
            model,
            &self.lowered.table_groups,
            model,
        )?;

        Ok(plan)
    }

    /// Apply `plan` to `sink` in rendered placeholder order.
    pub fn bind(
        &self,
        plan: &JdbcParameterBindings,
        sink: &mut dyn StatementSink,
        trace_bindings: bool,
    ) -> Result<(), InternalError> {
        bind_positional(plan, &self.rendered.parameters, sink, trace_bindings)?;

        Ok(())
    }
}

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub size: usize,
}

///
/// InterpretationCache
///

#[derive(Debug)]
pub struct InterpretationCache {
    config: LoweringConfig,
    entries: Mutex<BTreeMap<StatementFingerprint, Arc<Interpretation>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl InterpretationCache {
    #[must_use]
    pub const fn new(config: LoweringConfig) -> Self {
        Self {
            config,
            entries: Mutex::new(BTreeMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LoweringConfig {
        &self.config
    }

    /// Cached interpretation of `statement`, lowering it on a miss.
    pub fn interpret(
        &self,
        statement: &SqmStatement,
        xref: &DomainParameterXref,
        model: &DomainModel,
    ) -> Result<Arc<Interpretation>, InternalError> {
        if !self.config.plan_cache.enabled {
            return Interpretation::build(statement, xref, model, &self.config).map(Arc::new);
        }

        let key = fingerprint(statement, xref);
        if let Some(hit) = self.get(&key) {
            // Stats are best-effort; relaxed ordering is enough.
            self.hits.fetch_add(1, Ordering::Relaxed);
            record(MetricsEvent::PlanCacheHit);
            trace!(fingerprint = %key, "interpretation cache hit");

            return Ok(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        record(MetricsEvent::PlanCacheMiss);
        trace!(fingerprint = %key, "interpretation cache miss");

        let built = Arc::new(Interpretation::lower(key, statement, xref, model, &self.config)?);

        Ok(self.insert(key, built))
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let size = self.entries.lock().map_or(0, |entries| entries.len());

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn get(&self, key: &StatementFingerprint) -> Option<Arc<Interpretation>> {
        self.entries
            .lock()
            .expect("interpretation cache lock poisoned")
            .get(key)
            .cloned()
    }

    // A full cache stops admitting entries; a racing insert keeps the
    // first interpretation.
    fn insert(&self, key: StatementFingerprint, built: Arc<Interpretation>) -> Arc<Interpretation> {
        let mut entries = self
            .entries
            .lock()
            .expect("interpretation cache lock poisoned");

        if let Some(existing) = entries.get(&key) {
            return Arc::clone(existing);
        }
        if entries.len() >= self.config.plan_cache.capacity {
            trace!(fingerprint = %key, capacity = self.config.plan_cache.capacity, "interpretation cache full");
            return built;
        }
        entries.insert(key, Arc::clone(&built));

        built
    }
}
