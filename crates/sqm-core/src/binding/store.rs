use crate::{
    binding::{BindingError, DomainParameterXref},
    sqm::{ParameterKey, QueryParameter},
    types::Expressible,
    value::Value,
};
use std::{collections::BTreeMap, sync::Arc};

///
/// BindValue
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum BindValue {
    #[default]
    Unbound,
    Single(Value),
    Multi(Vec<Value>),
}

///
/// QueryParameterBinding
///
/// Domain-level value bound to one query parameter, with an optional
/// explicit bind type that overrides the parameter's declared type.
///

#[derive(Clone, Debug)]
pub struct QueryParameterBinding {
    pub parameter: Arc<QueryParameter>,
    pub value: BindValue,
    pub bind_type: Option<Expressible>,
}

impl QueryParameterBinding {
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        !matches!(self.value, BindValue::Unbound)
    }

    #[must_use]
    pub const fn is_multi_valued(&self) -> bool {
        matches!(self.value, BindValue::Multi(_))
    }

    /// First non-null value, used to derive a type when none was given.
    #[must_use]
    pub fn representative_value(&self) -> Option<&Value> {
        match &self.value {
            BindValue::Unbound => None,
            BindValue::Single(value) => Some(value).filter(|value| !value.is_null()),
            BindValue::Multi(values) => values.iter().find(|value| !value.is_null()),
        }
    }
}

///
/// QueryParameterBindings
///
/// One binding per parameter of a statement. Every parameter starts
/// unbound.
///

#[derive(Clone, Debug, Default)]
pub struct QueryParameterBindings {
    bindings: BTreeMap<ParameterKey, QueryParameterBinding>,
}

impl QueryParameterBindings {
    #[must_use]
    pub fn from_xref(xref: &DomainParameterXref) -> Self {
        let bindings = xref
            .iter()
            .map(|entry| {
                (
                    entry.parameter.key.clone(),
                    QueryParameterBinding {
                        parameter: Arc::clone(&entry.parameter),
                        value: BindValue::Unbound,
                        bind_type: None,
                    },
                )
            })
            .collect();

        Self { bindings }
    }

    pub fn bind(
        &mut self,
        key: &ParameterKey,
        value: impl Into<Value>,
    ) -> Result<(), BindingError> {
        self.slot(key)?.value = BindValue::Single(value.into());

        Ok(())
    }

    pub fn bind_with_type(
        &mut self,
        key: &ParameterKey,
        value: impl Into<Value>,
        bind_type: Expressible,
    ) -> Result<(), BindingError> {
        let binding = self.slot(key)?;
        binding.value = BindValue::Single(value.into());
        binding.bind_type = Some(bind_type);

        Ok(())
    }

    pub fn bind_multi<I>(&mut self, key: &ParameterKey, values: I) -> Result<(), BindingError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let binding = self.slot(key)?;
        if !binding.parameter.allows_multi_valued {
            return Err(BindingError::MultiValuedNotAllowed {
                parameter: key.to_string(),
            });
        }
        binding.value = BindValue::Multi(values.into_iter().map(Into::into).collect());

        Ok(())
    }

    pub fn unbind(&mut self, key: &ParameterKey) -> Result<(), BindingError> {
        let binding = self.slot(key)?;
        binding.value = BindValue::Unbound;
        binding.bind_type = None;

        Ok(())
    }

    #[must_use]
    pub fn binding(&self, key: &ParameterKey) -> Option<&QueryParameterBinding> {
        self.bindings.get(key)
    }

    fn slot(&mut self, key: &ParameterKey) -> Result<&mut QueryParameterBinding, BindingError> {
        self.bindings
            .get_mut(key)
            .ok_or_else(|| BindingError::UnknownParameter {
                parameter: key.to_string(),
            })
    }
}
