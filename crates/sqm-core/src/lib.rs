//! Core runtime for SQM lowering: semantic query trees, their translation into
//! a relational SQL AST, and the parameter binding plans that feed execution.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod binding;
pub mod config;
pub mod error;
pub mod lowering;
pub mod model;
pub mod obs;
pub mod plan;
pub mod sql;
pub mod sqm;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, walkers, caches, or sinks are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{DomainModel, Mapping, NavigablePath},
        sqm::{ParameterKey, QueryParameter, SqmExpr, SqmStatement},
        types::{Expressible, JdbcType, TypeCatalog, ValueKind},
        value::Value,
    };
}
