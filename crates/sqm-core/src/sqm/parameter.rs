use crate::types::Expressible;
use derive_more::Display;
use std::{fmt, sync::Arc};

///
/// ParameterKey
///
/// User-facing identity of a query parameter.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ParameterKey {
    Named(String),
    Positional(u32),
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, ":{name}"),
            Self::Positional(position) => write!(f, "?{position}"),
        }
    }
}

///
/// QueryParameter
///
/// A parameter as the caller binds it. All occurrences of the same key in
/// a statement share one `QueryParameter`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryParameter {
    pub key: ParameterKey,
    pub declared_type: Option<Expressible>,
    pub allows_multi_valued: bool,
}

impl QueryParameter {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(ParameterKey::Named(name.into()))
    }

    #[must_use]
    pub const fn positional(position: u32) -> Self {
        Self::new(ParameterKey::Positional(position))
    }

    const fn new(key: ParameterKey) -> Self {
        Self {
            key,
            declared_type: None,
            allows_multi_valued: false,
        }
    }

    #[must_use]
    pub fn with_type(mut self, declared_type: Expressible) -> Self {
        self.declared_type = Some(declared_type);
        self
    }

    #[must_use]
    pub const fn multi_valued(mut self) -> Self {
        self.allows_multi_valued = true;
        self
    }
}

///
/// OccurrenceId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("#{_0}")]
pub struct OccurrenceId(pub u32);

///
/// SqmParameter
///
/// One syntactic occurrence of a query parameter. Expansions are extra
/// occurrences created for the second and later values of a multi-valued
/// bind, and point back at the occurrence they expand.
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqmParameter {
    pub id: OccurrenceId,
    pub parameter: Arc<QueryParameter>,
    pub anticipated_type: Option<Expressible>,
    pub expansion_of: Option<OccurrenceId>,
}

impl SqmParameter {
    #[must_use]
    pub fn key(&self) -> &ParameterKey {
        &self.parameter.key
    }

    /// Type inferred for this occurrence, else the parameter's declared type.
    #[must_use]
    pub fn expressible_type(&self) -> Option<&Expressible> {
        self.anticipated_type
            .as_ref()
            .or(self.parameter.declared_type.as_ref())
    }
}
