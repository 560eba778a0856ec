use crate::{
    model::{Mapping, NavigablePath},
    types::{BasicType, ValueKind},
};
use std::{fmt, sync::Arc};

///
/// Expressible
///
/// Domain type of an expression. Closed over the shapes lowering needs to
/// tell apart: basic types double as relational mappings, paths are
/// resolved against the from clause, bare value kinds carry no relational
/// shape, and mapped types carry an explicit one.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expressible {
    Basic(Arc<BasicType>),
    Path(Arc<PathSource>),
    Domain(ValueKind),
    Mapped(Mapping),
}

impl Expressible {
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Basic(basic) => basic.kind,
            Self::Path(source) => source.kind,
            Self::Domain(kind) => *kind,
            Self::Mapped(mapping) => mapping.value_kind(),
        }
    }

    #[must_use]
    pub const fn is_path(&self) -> bool {
        matches!(self, Self::Path(_))
    }

    /// Relational mapping carried directly by this type, if any.
    /// Paths and bare value kinds need a lookup instead.
    #[must_use]
    pub fn as_mapping(&self) -> Option<Mapping> {
        match self {
            Self::Basic(basic) => Some(Mapping::Basic(Arc::clone(basic))),
            Self::Mapped(mapping) => Some(mapping.clone()),
            Self::Path(_) | Self::Domain(_) => None,
        }
    }
}

impl From<Mapping> for Expressible {
    fn from(mapping: Mapping) -> Self {
        match mapping {
            Mapping::Basic(basic) => Self::Basic(basic),
            other => Self::Mapped(other),
        }
    }
}

impl fmt::Display for Expressible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(basic) => write!(f, "{basic}"),
            Self::Path(source) => write!(f, "path({})", source.path),
            Self::Domain(kind) => write!(f, "{kind}"),
            Self::Mapped(mapping) => write!(f, "{mapping}"),
        }
    }
}

///
/// PathSource
///
/// Navigation path reference. Its value kind is the kind of the attribute
/// at the end of the path; its mapping depends on the table group the
/// path is rooted in.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PathSource {
    pub path: NavigablePath,
    pub kind: ValueKind,
}

impl PathSource {
    #[must_use]
    pub const fn new(path: NavigablePath, kind: ValueKind) -> Self {
        Self { path, kind }
    }
}
