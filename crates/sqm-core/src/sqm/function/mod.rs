//! Self-rendering function calls: descriptors, the call node, and the
//! pluggable validation, typing, and rendering strategies they carry.

mod descriptor;
mod node;
mod renderer;
mod resolvers;
mod validators;


use crate::types::{TypeFamily, ValueKind};
use thiserror::Error as ThisError;

// re-exports
pub use descriptor::{FunctionDescriptor, FunctionRegistry};
pub use node::{ResolutionState, SelfRenderingFunction};
pub use renderer::{FunctionRenderer, KeywordFunctionRenderer, StandardFunctionRenderer};
pub use resolvers::{
    ArgumentTypeResolver, FromOtherArguments, HighestPrecedenceReturnType, InvariantArgumentType,
    InvariantReturnType, ReturnTypeResolver, UseArgumentType,
};
pub use validators::{AllOf, ArgumentCount, ArgumentFamilies, ArgumentsValidator};

///
/// FunctionError
///

#[derive(Debug, ThisError)]
pub enum FunctionError {
    #[error("function '{function}' expects {expected} argument(s), found {found}")]
    ArgumentCount {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("function '{function}' argument {index} is {found}, expected a {expected} type")]
    ArgumentType {
        function: String,
        index: usize,
        expected: TypeFamily,
        found: ValueKind,
    },

    #[error("cannot resolve result type of '{function}': {reason}")]
    ReturnType { function: String, reason: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },
}
