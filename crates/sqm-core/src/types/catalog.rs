use crate::types::{JdbcType, ValueKind};
use derive_more::Display;
use std::{collections::BTreeMap, sync::Arc};

///
/// BasicType
///
/// Single-column type: a value kind paired with the column type it is
/// stored as. A basic type is both an expressible and a relational mapping.
///

#[derive(Clone, Debug, Display, Eq, Hash, PartialEq)]
#[display("{name}")]
pub struct BasicType {
    pub name: String,
    pub kind: ValueKind,
    pub jdbc: JdbcType,
}

impl BasicType {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ValueKind, jdbc: JdbcType) -> Self {
        Self {
            name: name.into(),
            kind,
            jdbc,
        }
    }
}

///
/// TypeCatalog
///
/// Registry of basic types, keyed by value kind. Answers "what is the
/// standard type for values of this kind".
///

#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    basics: BTreeMap<ValueKind, Arc<BasicType>>,
}

impl TypeCatalog {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with one basic type per scalar value kind.
    #[must_use]
    pub fn standard() -> Self {
        const SCALARS: [(&str, ValueKind); 14] = [
            ("boolean", ValueKind::Boolean),
            ("byte", ValueKind::Byte),
            ("short", ValueKind::Short),
            ("integer", ValueKind::Integer),
            ("long", ValueKind::Long),
            ("big_integer", ValueKind::BigInteger),
            ("float", ValueKind::Float),
            ("double", ValueKind::Double),
            ("big_decimal", ValueKind::BigDecimal),
            ("character", ValueKind::Character),
            ("string", ValueKind::Text),
            ("uuid", ValueKind::Uuid),
            ("binary", ValueKind::Binary),
            ("date", ValueKind::Date),
        ];

        let mut catalog = Self::default();
        for (name, kind) in SCALARS {
            if let Some(jdbc) = JdbcType::for_kind(kind) {
                catalog.register(BasicType::new(name, kind, jdbc));
            }
        }
        catalog.register(BasicType::new(
            "timestamp",
            ValueKind::Timestamp,
            JdbcType::Timestamp,
        ));

        catalog
    }

    /// Register (or replace) the standard type for a value kind.
    pub fn register(&mut self, basic: BasicType) -> Arc<BasicType> {
        let basic = Arc::new(basic);
        self.basics.insert(basic.kind, Arc::clone(&basic));

        basic
    }

    #[must_use]
    pub fn standard_basic_type_for(&self, kind: ValueKind) -> Option<Arc<BasicType>> {
        self.basics.get(&kind).cloned()
    }

    pub fn basic_types(&self) -> impl Iterator<Item = &Arc<BasicType>> {
        self.basics.values()
    }
}
