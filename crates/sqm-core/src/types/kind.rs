use derive_more::Display;

///
/// ValueKind
///
/// Domain-level value representation class. This is the semantic type of a
/// value as the application sees it, not its column type.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    BigInteger,
    Float,
    Double,
    BigDecimal,
    Character,
    Text,
    Uuid,
    Binary,
    Date,
    Timestamp,
    Composite,
    Entity,
    Object,
}

impl ValueKind {
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Integer
                | Self::Long
                | Self::BigInteger
                | Self::Float
                | Self::Double
                | Self::BigDecimal
        )
    }

    /// Returns whether `self` can hold every value of `other`.
    ///
    /// The relation is strict: a kind is never wider than itself, so equal
    /// kinds tie.
    #[must_use]
    pub const fn is_wider(self, other: Self) -> bool {
        match self {
            Self::Short => matches!(other, Self::Byte),
            Self::Integer => matches!(other, Self::Byte | Self::Short),
            Self::Long => matches!(other, Self::Byte | Self::Short | Self::Integer),
            Self::BigInteger => {
                matches!(other, Self::Byte | Self::Short | Self::Integer | Self::Long)
            }
            Self::Float => matches!(other, Self::Byte | Self::Short | Self::Integer),
            Self::Double => matches!(
                other,
                Self::Byte | Self::Short | Self::Integer | Self::Long | Self::Float
            ),
            Self::BigDecimal => matches!(
                other,
                Self::Byte
                    | Self::Short
                    | Self::Integer
                    | Self::Long
                    | Self::BigInteger
                    | Self::Float
                    | Self::Double
            ),
            Self::Text => matches!(other, Self::Character),
            Self::Timestamp => matches!(other, Self::Date),
            _ => false,
        }
    }

    #[must_use]
    pub const fn family(self) -> TypeFamily {
        match self {
            Self::Byte
            | Self::Short
            | Self::Integer
            | Self::Long
            | Self::BigInteger
            | Self::Float
            | Self::Double
            | Self::BigDecimal => TypeFamily::Numeric,
            Self::Character | Self::Text => TypeFamily::Textual,
            Self::Date | Self::Timestamp => TypeFamily::Temporal,
            Self::Boolean => TypeFamily::Boolean,
            Self::Uuid | Self::Binary | Self::Composite | Self::Entity | Self::Object => {
                TypeFamily::Other
            }
        }
    }
}

///
/// TypeFamily
///
/// Coarse classification used by function argument validation only.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TypeFamily {
    Numeric,
    Textual,
    Temporal,
    Boolean,
    Other,
}
