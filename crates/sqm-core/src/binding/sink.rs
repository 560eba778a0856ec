use crate::{
    binding::{BindingError, JdbcParameterBindings},
    sql::SlotId,
    types::JdbcType,
    value::Value,
};
use derive_more::Display;
use std::collections::BTreeMap;
use tracing::trace;

///
/// BindTarget
///
/// Where a statement receives one value: a 1-based position or a name.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum BindTarget<'a> {
    #[display("#{_0}")]
    Index(usize),
    #[display(":{_0}")]
    Name(&'a str),
}

///
/// StatementSink
///
/// Prepared-statement-like receiver of bind values.
///

pub trait StatementSink {
    fn bind_value(
        &mut self,
        target: BindTarget<'_>,
        jdbc_type: JdbcType,
        value: &Value,
    ) -> Result<(), BindingError>;

    fn bind_null(
        &mut self,
        target: BindTarget<'_>,
        jdbc_type: JdbcType,
    ) -> Result<(), BindingError>;
}

/// Apply `plan` by index, following the slot order of the rendered SQL.
pub fn bind_positional(
    plan: &JdbcParameterBindings,
    order: &[SlotId],
    sink: &mut dyn StatementSink,
    trace_bindings: bool,
) -> Result<(), BindingError> {
    for (offset, slot) in order.iter().enumerate() {
        apply(plan, *slot, BindTarget::Index(offset + 1), sink, trace_bindings)?;
    }

    Ok(())
}

/// Apply `plan` by name.
pub fn bind_named(
    plan: &JdbcParameterBindings,
    names: &BTreeMap<SlotId, String>,
    sink: &mut dyn StatementSink,
    trace_bindings: bool,
) -> Result<(), BindingError> {
    for (slot, name) in names {
        apply(plan, *slot, BindTarget::Name(name), sink, trace_bindings)?;
    }

    Ok(())
}

fn apply(
    plan: &JdbcParameterBindings,
    slot: SlotId,
    target: BindTarget<'_>,
    sink: &mut dyn StatementSink,
    trace_bindings: bool,
) -> Result<(), BindingError> {
    let binding = plan.get(slot).ok_or(BindingError::UnboundSlot { slot })?;

    if binding.value.is_null() {
        let jdbc_type = binding.jdbc_type.unwrap_or(JdbcType::Other);
        if trace_bindings {
            trace!(%slot, %target, %jdbc_type, "binding null");
        }

        return sink.bind_null(target, jdbc_type);
    }

    let jdbc_type = binding
        .jdbc_type
        .or_else(|| JdbcType::for_kind(binding.value.kind()))
        .unwrap_or(JdbcType::Other);
    if trace_bindings {
        trace!(%slot, %target, %jdbc_type, value = %binding.value, "binding value");
    }

    sink.bind_value(target, jdbc_type, &binding.value)
}
