use crate::{
    binding::BindingError, config::ConfigError, lowering::LoweringError, model::MappingError,
    sqm::function::FunctionError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured error with a stable classification.
/// Module errors convert into this at crate boundaries (plan cache, facades).
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a binding-origin invariant violation.
    pub(crate) fn binding_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Binding,
            message.into(),
        )
    }

    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<FunctionError> for InternalError {
    fn from(err: FunctionError) -> Self {
        let class = match err {
            FunctionError::ArgumentCount { .. }
            | FunctionError::ArgumentType { .. }
            | FunctionError::UnknownFunction { .. } => ErrorClass::Semantic,
            FunctionError::ReturnType { .. } => ErrorClass::TypeResolution,
        };

        Self::new(class, ErrorOrigin::Function, err.to_string())
    }
}

impl From<MappingError> for InternalError {
    fn from(err: MappingError) -> Self {
        let class = match err {
            MappingError::NoStandardType { .. } | MappingError::UnresolvedPath { .. } => {
                ErrorClass::TypeResolution
            }
            MappingError::Conversion { .. } | MappingError::ValueShape { .. } => {
                ErrorClass::Usage
            }
            MappingError::UnknownEntity { .. }
            | MappingError::UnknownAttribute { .. }
            | MappingError::MultiColumnValues { .. } => ErrorClass::Semantic,
        };

        Self::new(class, ErrorOrigin::Mapping, err.to_string())
    }
}

impl From<LoweringError> for InternalError {
    fn from(err: LoweringError) -> Self {
        match err {
            LoweringError::Function(inner) => Self::from(*inner),
            LoweringError::Mapping(inner) => Self::from(*inner),
            LoweringError::StatementKind { .. } => {
                Self::new(ErrorClass::Usage, ErrorOrigin::Lowering, err.to_string())
            }
            LoweringError::UntypedParameter { .. } => Self::new(
                ErrorClass::TypeResolution,
                ErrorOrigin::Lowering,
                err.to_string(),
            ),
            LoweringError::MissingTableGroup { .. } => {
                Self::new(ErrorClass::Semantic, ErrorOrigin::Lowering, err.to_string())
            }
        }
    }
}

impl From<BindingError> for InternalError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::Mapping(inner) => Self::from(*inner),
            BindingError::UntypedParameter { .. } => Self::new(
                ErrorClass::TypeResolution,
                ErrorOrigin::Binding,
                err.to_string(),
            ),
            BindingError::UnknownParameter { .. }
            | BindingError::MultiValuedNotAllowed { .. }
            | BindingError::EmptyMultiValued { .. }
            | BindingError::Sink { .. } => {
                Self::new(ErrorClass::Usage, ErrorOrigin::Binding, err.to_string())
            }
            BindingError::MissingSlots { .. }
            | BindingError::SlotCountMismatch { .. }
            | BindingError::ExpansionCountMismatch { .. }
            | BindingError::ConvertedMultiColumn { .. }
            | BindingError::DuplicateSlot { .. }
            | BindingError::UnboundSlot { .. }
            | BindingError::ForeignExpansion { .. } => Self::binding_invariant(err.to_string()),
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Caller supplied the wrong kind of input (never retried).
    Usage,
    /// A parameter or expression could not be typed.
    TypeResolution,
    /// A function was applied to incompatible arguments.
    Semantic,
    Unsupported,
    /// Upstream construction bug; unreachable in correct operation.
    InvariantViolation,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usage => "usage",
            Self::TypeResolution => "type_resolution",
            Self::Semantic => "semantic",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Types,
    Function,
    Mapping,
    Lowering,
    Binding,
    Plan,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Types => "types",
            Self::Function => "function",
            Self::Mapping => "mapping",
            Self::Lowering => "lowering",
            Self::Binding => "binding",
            Self::Plan => "plan",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}
