use crate::types::ValueKind;
use derive_more::Display;

///
/// JdbcType
///
/// Relational column type. Codes follow `java.sql.Types` so binding plans
/// can be handed to a driver without translation.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum JdbcType {
    #[display("BOOLEAN")]
    Boolean,
    #[display("TINYINT")]
    TinyInt,
    #[display("SMALLINT")]
    SmallInt,
    #[display("INTEGER")]
    Integer,
    #[display("BIGINT")]
    BigInt,
    #[display("NUMERIC")]
    Numeric,
    #[display("REAL")]
    Real,
    #[display("DOUBLE")]
    Double,
    #[display("CHAR")]
    Char,
    #[display("VARCHAR")]
    Varchar,
    #[display("VARBINARY")]
    Varbinary,
    #[display("DATE")]
    Date,
    #[display("TIMESTAMP")]
    Timestamp,
    #[display("OTHER")]
    Other,
}

impl JdbcType {
    #[must_use]
    pub const fn type_code(self) -> i32 {
        match self {
            Self::Boolean => 16,
            Self::TinyInt => -6,
            Self::SmallInt => 5,
            Self::Integer => 4,
            Self::BigInt => -5,
            Self::Numeric => 2,
            Self::Real => 7,
            Self::Double => 8,
            Self::Char => 1,
            Self::Varchar => 12,
            Self::Varbinary => -3,
            Self::Date => 91,
            Self::Timestamp => 93,
            Self::Other => 1111,
        }
    }

    /// Default column type for a scalar value kind.
    /// Non-scalar kinds (composites, entities) have no single column type.
    #[must_use]
    pub const fn for_kind(kind: ValueKind) -> Option<Self> {
        let ty = match kind {
            ValueKind::Boolean => Self::Boolean,
            ValueKind::Byte => Self::TinyInt,
            ValueKind::Short => Self::SmallInt,
            ValueKind::Integer => Self::Integer,
            ValueKind::Long => Self::BigInt,
            ValueKind::BigInteger | ValueKind::BigDecimal => Self::Numeric,
            ValueKind::Float => Self::Real,
            ValueKind::Double => Self::Double,
            ValueKind::Character => Self::Char,
            ValueKind::Text => Self::Varchar,
            ValueKind::Uuid => Self::Other,
            ValueKind::Binary => Self::Varbinary,
            ValueKind::Date => Self::Date,
            ValueKind::Timestamp => Self::Timestamp,
            ValueKind::Composite | ValueKind::Entity | ValueKind::Object => return None,
        };

        Some(ty)
    }

    /// Value kind read back from a column of this type.
    #[must_use]
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::Boolean => ValueKind::Boolean,
            Self::TinyInt => ValueKind::Byte,
            Self::SmallInt => ValueKind::Short,
            Self::Integer => ValueKind::Integer,
            Self::BigInt => ValueKind::Long,
            Self::Numeric => ValueKind::BigDecimal,
            Self::Real => ValueKind::Float,
            Self::Double => ValueKind::Double,
            Self::Char => ValueKind::Character,
            Self::Varchar => ValueKind::Text,
            Self::Varbinary => ValueKind::Binary,
            Self::Date => ValueKind::Date,
            Self::Timestamp => ValueKind::Timestamp,
            Self::Other => ValueKind::Object,
        }
    }
}
