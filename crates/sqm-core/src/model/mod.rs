//! Relational mapping model: how domain types decompose into columns.

mod converter;
mod entity;
mod mapping;
mod path;


use crate::types::ValueKind;
use thiserror::Error as ThisError;

// re-exports
pub use converter::{OrdinalConverter, ValueConverter, YesNoConverter};
pub use entity::{AttributeMapping, DomainModel, EntityMapping, ResolvedPath};
pub use mapping::{
    ConvertedMapping, EmbeddedComponent, EmbeddedMapping, ForeignKeyMapping, IdentifierMapping,
    JdbcValue, Mapping,
};
pub use path::NavigablePath;

///
/// MappingError
///

#[derive(Debug, ThisError)]
pub enum MappingError {
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("entity '{entity}' has no attribute '{attribute}'")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("cannot resolve path '{path}'")]
    UnresolvedPath { path: String },

    #[error("no standard type registered for value kind {kind}")]
    NoStandardType { kind: ValueKind },

    #[error("value of kind {found} does not fit mapping {mapping}")]
    ValueShape { mapping: String, found: ValueKind },

    #[error("converter '{converter}' cannot convert {value}")]
    Conversion { converter: String, value: String },

    #[error("values column '{column}' maps to {mapping}, which spans more than one column")]
    MultiColumnValues { column: String, mapping: String },
}
