//! Type vocabulary shared by the domain tree, the mapping model, and the
//! relational AST.

mod catalog;
mod expressible;
mod jdbc;
mod kind;
mod precedence;


// re-exports
pub use catalog::{BasicType, TypeCatalog};
pub use expressible::{Expressible, PathSource};
pub use jdbc::JdbcType;
pub use kind::{TypeFamily, ValueKind};
pub use precedence::{highest_precedence, widen};
