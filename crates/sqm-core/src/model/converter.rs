use crate::{model::MappingError, types::ValueKind, value::Value};
use std::fmt;

///
/// ValueConverter
///
/// Two-way conversion between a domain value and the value stored in a
/// single column. Null converts to null in both directions.
///

pub trait ValueConverter: fmt::Debug + Send + Sync {
    /// Stable name; two converters with the same name are interchangeable.
    fn name(&self) -> &str;

    fn domain_kind(&self) -> ValueKind;

    fn relational_kind(&self) -> ValueKind;

    fn to_relational(&self, value: &Value) -> Result<Value, MappingError>;

    fn to_domain(&self, value: &Value) -> Result<Value, MappingError>;
}

fn conversion_error(converter: &dyn ValueConverter, value: &Value) -> MappingError {
    MappingError::Conversion {
        converter: converter.name().to_string(),
        value: value.to_string(),
    }
}

///
/// YesNoConverter
///
/// Boolean stored as a `'Y'`/`'N'` character column.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct YesNoConverter;

impl ValueConverter for YesNoConverter {
    fn name(&self) -> &str {
        "yes_no"
    }

    fn domain_kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn relational_kind(&self) -> ValueKind {
        ValueKind::Character
    }

    fn to_relational(&self, value: &Value) -> Result<Value, MappingError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Bool(true) => Ok(Value::Char('Y')),
            Value::Bool(false) => Ok(Value::Char('N')),
            other => Err(conversion_error(self, other)),
        }
    }

    fn to_domain(&self, value: &Value) -> Result<Value, MappingError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Char('Y') => Ok(Value::Bool(true)),
            Value::Char('N') => Ok(Value::Bool(false)),
            other => Err(conversion_error(self, other)),
        }
    }
}

///
/// OrdinalConverter
///
/// Named constant stored as its ordinal in declaration order.
///

#[derive(Clone, Debug)]
pub struct OrdinalConverter {
    name: String,
    constants: Vec<String>,
}

impl OrdinalConverter {
    pub fn new<I, S>(name: impl Into<String>, constants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }
}

impl ValueConverter for OrdinalConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain_kind(&self) -> ValueKind {
        ValueKind::Text
    }

    fn relational_kind(&self) -> ValueKind {
        ValueKind::Integer
    }

    fn to_relational(&self, value: &Value) -> Result<Value, MappingError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Text(constant) => self
                .constants
                .iter()
                .position(|c| c == constant)
                .and_then(|ordinal| i32::try_from(ordinal).ok())
                .map(Value::Int)
                .ok_or_else(|| conversion_error(self, value)),
            other => Err(conversion_error(self, other)),
        }
    }

    fn to_domain(&self, value: &Value) -> Result<Value, MappingError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Int(ordinal) => usize::try_from(*ordinal)
                .ok()
                .and_then(|ordinal| self.constants.get(ordinal))
                .map(|constant| Value::Text(constant.clone()))
                .ok_or_else(|| conversion_error(self, value)),
            other => Err(conversion_error(self, other)),
        }
    }
}
