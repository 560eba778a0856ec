//! Lowering: the walk that turns a domain statement into a relational
//! statement and records which bind slots each parameter occurrence got.

mod converter;
mod walker;

#[cfg(test)]
mod tests;

use crate::{model::MappingError, sqm::function::FunctionError};
use thiserror::Error as ThisError;

// re-exports
pub use converter::{JdbcParamsByOccurrence, LoweredStatement, SqmToSqlConverter};
pub use walker::SqlAstWalker;

///
/// LoweringError
///

#[derive(Debug, ThisError)]
pub enum LoweringError {
    #[error(transparent)]
    Function(Box<FunctionError>),

    #[error(transparent)]
    Mapping(Box<MappingError>),

    #[error("expected a {expected} statement, found {found}")]
    StatementKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot infer a type for parameter {parameter}")]
    UntypedParameter { parameter: String },

    #[error("no table group registered for '{path}'")]
    MissingTableGroup { path: String },
}

impl From<FunctionError> for LoweringError {
    fn from(err: FunctionError) -> Self {
        Self::Function(Box::new(err))
    }
}

impl From<MappingError> for LoweringError {
    fn from(err: MappingError) -> Self {
        Self::Mapping(Box::new(err))
    }
}
