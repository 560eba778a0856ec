//! Runtime values supplied as bind arguments, carried by literals, and
//! produced by relational decomposition.

#[cfg(test)]
mod tests;

use crate::types::ValueKind;
use std::{collections::BTreeMap, fmt};

///
/// Value
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    BigInt(i128),
    Float(f32),
    Double(f64),
    /// Fixed-point decimal in canonical text form.
    Decimal(String),
    Char(char),
    Text(String),
    Uuid(u128),
    Bytes(Vec<u8>),
    /// Days since the Unix epoch.
    Date(i32),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    /// Ordered components of an embeddable value.
    Composite(Vec<Self>),
    Entity(Box<EntityValue>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Value class used when no explicit bind type is available.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Object,
            Self::Bool(_) => ValueKind::Boolean,
            Self::Byte(_) => ValueKind::Byte,
            Self::Short(_) => ValueKind::Short,
            Self::Int(_) => ValueKind::Integer,
            Self::Long(_) => ValueKind::Long,
            Self::BigInt(_) => ValueKind::BigInteger,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::Decimal(_) => ValueKind::BigDecimal,
            Self::Char(_) => ValueKind::Character,
            Self::Text(_) => ValueKind::Text,
            Self::Uuid(_) => ValueKind::Uuid,
            Self::Bytes(_) => ValueKind::Binary,
            Self::Date(_) => ValueKind::Date,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Composite(_) => ValueKind::Composite,
            Self::Entity(_) => ValueKind::Entity,
        }
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    #[must_use]
    pub fn entity(entity: impl Into<String>, id: Self) -> Self {
        Self::Entity(Box::new(EntityValue::new(entity, id)))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Decimal(v) => f.write_str(v),
            Self::Char(v) => write!(f, "'{v}'"),
            Self::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Self::Uuid(v) => write!(f, "{v:032x}"),
            Self::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Self::Date(v) => write!(f, "date({v})"),
            Self::Timestamp(v) => write!(f, "timestamp({v})"),
            Self::Composite(parts) => {
                f.write_str("(")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{part}")?;
                }
                f.write_str(")")
            }
            Self::Entity(entity) => write!(f, "{}#{}", entity.entity, entity.id),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

///
/// EntityValue
///
/// Entity instance as seen by binding: its name, identifier, and loaded
/// attribute state.
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityValue {
    pub entity: String,
    pub id: Value,
    pub attributes: BTreeMap<String, Value>,
}

impl EntityValue {
    #[must_use]
    pub fn new(entity: impl Into<String>, id: Value) -> Self {
        Self {
            entity: entity.into(),
            id,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }
}
