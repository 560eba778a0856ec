use crate::{
    model::{MappingError, ValueConverter},
    types::{BasicType, JdbcType, ValueKind},
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// Mapping
///
/// Relational shape of a domain type: how many columns a value spans, the
/// column types in order, and how a value decomposes into column values.
/// Column order is fixed per mapping and every operation here walks it the
/// same way.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Mapping {
    Basic(Arc<BasicType>),
    Embedded(Arc<EmbeddedMapping>),
    Converted(Arc<ConvertedMapping>),
    EntityIdentifier(Arc<IdentifierMapping>),
    ForeignKey(Arc<ForeignKeyMapping>),
}

impl Mapping {
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Basic(basic) => basic.kind,
            Self::Embedded(_) => ValueKind::Composite,
            Self::Converted(converted) => converted.domain_kind,
            Self::EntityIdentifier(_) | Self::ForeignKey(_) => ValueKind::Entity,
        }
    }

    #[must_use]
    pub fn jdbc_type_count(&self) -> usize {
        match self {
            Self::Basic(_) | Self::Converted(_) => 1,
            Self::Embedded(embedded) => embedded
                .components
                .iter()
                .map(|component| component.mapping.jdbc_type_count())
                .sum(),
            Self::EntityIdentifier(identifier) => identifier.mapping.jdbc_type_count(),
            Self::ForeignKey(fk) => fk.key.jdbc_type_count(),
        }
    }

    /// Visit each column type with its position; returns the column count.
    pub fn for_each_jdbc_type(&self, mut action: impl FnMut(usize, JdbcType)) -> usize {
        self.visit_jdbc_types(0, &mut action)
    }

    #[must_use]
    pub fn jdbc_types(&self) -> Vec<JdbcType> {
        let mut out = Vec::with_capacity(self.jdbc_type_count());
        self.for_each_jdbc_type(|_, ty| out.push(ty));

        out
    }

    fn visit_jdbc_types(&self, offset: usize, action: &mut dyn FnMut(usize, JdbcType)) -> usize {
        match self {
            Self::Basic(basic) => {
                action(offset, basic.jdbc);
                1
            }
            Self::Converted(converted) => {
                action(offset, converted.relational.jdbc);
                1
            }
            Self::Embedded(embedded) => {
                let mut span = 0;
                for component in &embedded.components {
                    span += component.mapping.visit_jdbc_types(offset + span, action);
                }
                span
            }
            Self::EntityIdentifier(identifier) => identifier.mapping.visit_jdbc_types(offset, action),
            Self::ForeignKey(fk) => fk.key.visit_jdbc_types(offset, action),
        }
    }

    /// Break a domain value into one column value per column, in column order.
    pub fn disassemble(&self, value: &Value) -> Result<Vec<JdbcValue>, MappingError> {
        let mut out = Vec::with_capacity(self.jdbc_type_count());
        self.disassemble_into(value, &mut out)?;

        Ok(out)
    }

    fn disassemble_into(
        &self,
        value: &Value,
        out: &mut Vec<JdbcValue>,
    ) -> Result<(), MappingError> {
        match self {
            Self::Basic(basic) => {
                let kind = value.kind();
                if !value.is_null() && kind != basic.kind && !basic.kind.is_wider(kind) {
                    return Err(self.shape_error(value));
                }
                out.push(JdbcValue::new(basic.jdbc, value.clone()));
            }
            Self::Converted(converted) => {
                let relational = converted.converter.to_relational(value)?;
                out.push(JdbcValue::new(converted.relational.jdbc, relational));
            }
            Self::Embedded(embedded) => match value {
                Value::Null => {
                    self.for_each_jdbc_type(|_, ty| out.push(JdbcValue::new(ty, Value::Null)));
                }
                Value::Composite(parts) if parts.len() == embedded.components.len() => {
                    for (component, part) in embedded.components.iter().zip(parts) {
                        component.mapping.disassemble_into(part, out)?;
                    }
                }
                other => return Err(self.shape_error(other)),
            },
            Self::EntityIdentifier(identifier) => identifier
                .mapping
                .disassemble_into(identifier.identifier_value(value), out)?,
            Self::ForeignKey(fk) => fk.key.disassemble_into(fk.key_value(value), out)?,
        }

        Ok(())
    }

    fn shape_error(&self, value: &Value) -> MappingError {
        MappingError::ValueShape {
            mapping: self.to_string(),
            found: value.kind(),
        }
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(basic) => write!(f, "{basic}"),
            Self::Embedded(embedded) => write!(f, "embedded({})", embedded.name),
            Self::Converted(converted) => {
                write!(f, "converted({}:{})", converted.converter.name(), converted.relational)
            }
            Self::EntityIdentifier(identifier) => write!(f, "entity({})", identifier.entity),
            Self::ForeignKey(fk) => write!(f, "fk({}->{})", fk.association, fk.target_entity),
        }
    }
}

///
/// JdbcValue
///

#[derive(Clone, Debug, PartialEq)]
pub struct JdbcValue {
    pub jdbc_type: JdbcType,
    pub value: Value,
}

impl JdbcValue {
    #[must_use]
    pub const fn new(jdbc_type: JdbcType, value: Value) -> Self {
        Self { jdbc_type, value }
    }
}

///
/// EmbeddedMapping
///

#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddedMapping {
    pub name: String,
    pub components: Vec<EmbeddedComponent>,
}

impl EmbeddedMapping {
    #[must_use]
    pub fn new(name: impl Into<String>, components: Vec<EmbeddedComponent>) -> Self {
        Self {
            name: name.into(),
            components,
        }
    }

    /// Component by name, with the column offset it starts at.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<(usize, &Mapping)> {
        let mut offset = 0;
        for component in &self.components {
            if component.name == name {
                return Some((offset, &component.mapping));
            }
            offset += component.mapping.jdbc_type_count();
        }

        None
    }
}

///
/// EmbeddedComponent
///

#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddedComponent {
    pub name: String,
    pub mapping: Mapping,
}

impl EmbeddedComponent {
    #[must_use]
    pub fn new(name: impl Into<String>, mapping: Mapping) -> Self {
        Self {
            name: name.into(),
            mapping,
        }
    }
}

///
/// ConvertedMapping
///
/// Single-column mapping whose domain value passes through a converter
/// before it reaches the column.
///

#[derive(Clone, Debug)]
pub struct ConvertedMapping {
    pub domain_kind: ValueKind,
    pub converter: Arc<dyn ValueConverter>,
    pub relational: Arc<BasicType>,
}

impl ConvertedMapping {
    #[must_use]
    pub fn new(converter: Arc<dyn ValueConverter>, relational: Arc<BasicType>) -> Self {
        Self {
            domain_kind: converter.domain_kind(),
            converter,
            relational,
        }
    }
}

impl PartialEq for ConvertedMapping {
    fn eq(&self, other: &Self) -> bool {
        self.domain_kind == other.domain_kind
            && self.relational == other.relational
            && self.converter.name() == other.converter.name()
    }
}

///
/// IdentifierMapping
///
/// Entity-valued mapping: an entity is bound and compared through its
/// identifier columns.
///

#[derive(Clone, Debug, PartialEq)]
pub struct IdentifierMapping {
    pub entity: String,
    pub attribute: String,
    pub mapping: Mapping,
}

impl IdentifierMapping {
    /// The identifier of an entity instance; anything else is taken to be
    /// an identifier already.
    #[must_use]
    pub fn identifier_value<'v>(&self, value: &'v Value) -> &'v Value {
        match value {
            Value::Entity(entity) => &entity.id,
            other => other,
        }
    }
}

///
/// ForeignKeyMapping
///
/// To-one association, bound through the foreign key that references the
/// target entity's identifier.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ForeignKeyMapping {
    pub association: String,
    pub target_entity: String,
    pub key: Mapping,
}

impl ForeignKeyMapping {
    /// Foreign-key representation of an associated value.
    #[must_use]
    pub fn key_value<'v>(&self, value: &'v Value) -> &'v Value {
        match value {
            Value::Entity(entity) => &entity.id,
            other => other,
        }
    }
}
