use crate::{binding::BindingError, sql::SlotId, types::JdbcType, value::Value};
use std::collections::{BTreeMap, btree_map::Entry};

///
/// JdbcParameterBinding
///
/// Relational type and value for one slot. A placeholder for an unbound
/// parameter has neither.
///

#[derive(Clone, Debug, PartialEq)]
pub struct JdbcParameterBinding {
    pub jdbc_type: Option<JdbcType>,
    pub value: Value,
}

impl JdbcParameterBinding {
    #[must_use]
    pub const fn new(jdbc_type: Option<JdbcType>, value: Value) -> Self {
        Self { jdbc_type, value }
    }

    #[must_use]
    pub const fn placeholder() -> Self {
        Self::new(None, Value::Null)
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.jdbc_type.is_none() && self.value.is_null()
    }
}

///
/// JdbcParameterBindings
///
/// The binding plan: exactly one binding per slot.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JdbcParameterBindings {
    bindings: BTreeMap<SlotId, JdbcParameterBinding>,
}

impl JdbcParameterBindings {
    pub fn add_binding(
        &mut self,
        slot: SlotId,
        binding: JdbcParameterBinding,
    ) -> Result<(), BindingError> {
        match self.bindings.entry(slot) {
            Entry::Vacant(entry) => {
                entry.insert(binding);
                Ok(())
            }
            Entry::Occupied(_) => Err(BindingError::DuplicateSlot { slot }),
        }
    }

    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&JdbcParameterBinding> {
        self.bindings.get(&slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.bindings.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &JdbcParameterBinding)> {
        self.bindings.iter().map(|(slot, binding)| (*slot, binding))
    }
}
