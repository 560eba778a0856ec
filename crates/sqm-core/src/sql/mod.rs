//! Relational SQL AST produced by lowering.

mod expr;
mod from;
mod render;
mod results;
mod statement;

#[cfg(test)]
mod tests;

// re-exports
pub use expr::{
    ColumnReference, JdbcParameter, SlotId, SqlExpr, SqlFunctionCall, SqlLiteral, SqlPredicate,
};
pub use from::{
    FromClause, StandardTableGroup, TableGroup, TableGroupLocator, TableReference,
    TableReferenceRef, ValuesTableGroup, ValuesTableReference,
};
pub use render::{RenderedSql, SqlWriter, render_statement};
pub use results::{BasicResult, DomainResult, TupleAssembler, TupleResult};
pub use statement::{
    DeleteStatement, SelectStatement, SqlAssignment, SqlSelection, SqlStatement, UpdateStatement,
};
