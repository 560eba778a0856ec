//! Parameter binding: the domain parameter cross reference, the per-slot
//! index built from it after lowering, domain-level bind values, and the
//! builder that turns those into a slot-keyed binding plan.

mod builder;
mod jdbc_xref;
mod plan;
mod sink;
mod store;
mod xref;


use crate::{model::MappingError, sql::SlotId, sqm::OccurrenceId};
use thiserror::Error as ThisError;

// re-exports
pub use builder::{SessionContext, create_jdbc_parameter_bindings, determine_parameter_type};
pub use jdbc_xref::{JdbcParameterLookup, JdbcParamsXref, build_jdbc_index};
pub use plan::{JdbcParameterBinding, JdbcParameterBindings};
pub use sink::{BindTarget, StatementSink, bind_named, bind_positional};
pub use store::{BindValue, QueryParameterBinding, QueryParameterBindings};
pub use xref::{DomainParameterXref, ParameterOccurrences};

///
/// BindingError
///

#[derive(Debug, ThisError)]
pub enum BindingError {
    #[error(transparent)]
    Mapping(Box<MappingError>),

    #[error("parameter {parameter} has no type by which it can be bound")]
    UntypedParameter { parameter: String },

    #[error("no slots were allocated for occurrence {occurrence} of parameter {parameter}")]
    MissingSlots {
        parameter: String,
        occurrence: OccurrenceId,
    },

    #[error("parameter {parameter} decomposed into {found} value(s) for {expected} slot(s)")]
    SlotCountMismatch {
        parameter: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter {parameter} has {found} expansion(s), expected {expected}")]
    ExpansionCountMismatch {
        parameter: String,
        expected: usize,
        found: usize,
    },

    #[error("parameter {parameter} is bound to an empty collection")]
    EmptyMultiValued { parameter: String },

    #[error("converted parameter {parameter} spans {slots} slots; converted values bind to exactly one")]
    ConvertedMultiColumn { parameter: String, slots: usize },

    #[error("{slot} already has a binding")]
    DuplicateSlot { slot: SlotId },

    #[error("{slot} has no binding")]
    UnboundSlot { slot: SlotId },

    #[error("expansion occurrence {occurrence} does not belong to parameter {parameter}")]
    ForeignExpansion {
        occurrence: OccurrenceId,
        parameter: String,
    },

    #[error("query has no parameter {parameter}")]
    UnknownParameter { parameter: String },

    #[error("parameter {parameter} does not accept multiple values")]
    MultiValuedNotAllowed { parameter: String },

    #[error("statement sink rejected a binding: {message}")]
    Sink { message: String },
}

impl From<MappingError> for BindingError {
    fn from(err: MappingError) -> Self {
        Self::Mapping(Box::new(err))
    }
}
