//! Semantic query model: the validated, representation-agnostic query tree
//! produced upstream and consumed by lowering.

mod builder;
mod expr;
pub mod function;
mod parameter;
mod predicate;
mod statement;


// re-exports
pub use builder::SqmNodeBuilder;
pub use expr::{CopyContext, NodeMeta, SqmExpr, SqmLiteral, SqmTuple};
pub use parameter::{OccurrenceId, ParameterKey, QueryParameter, SqmParameter};
pub use predicate::{ComparisonOperator, SqmPredicate};
pub use statement::{
    SqmAssignment, SqmDelete, SqmRoot, SqmSelect, SqmSelection, SqmStatement, SqmUpdate,
    SqmValuesRoot,
};
