use crate::{model::NavigablePath, types::ValueKind, value::Value};

///
/// DomainResult
///
/// How one selection item is read back from a result row.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DomainResult {
    Basic(BasicResult),
    Tuple(TupleResult),
}

impl DomainResult {
    #[must_use]
    pub fn result_variable(&self) -> Option<&str> {
        match self {
            Self::Basic(result) => result.result_variable.as_deref(),
            Self::Tuple(result) => result.result_variable(),
        }
    }

    /// Read this result from a row of column values.
    /// Returns `None` if the row is shorter than the positions require.
    #[must_use]
    pub fn assemble(&self, row: &[Value]) -> Option<Value> {
        match self {
            Self::Basic(result) => row.get(result.position).cloned(),
            Self::Tuple(result) => result.create_assembler().assemble(row),
        }
    }
}

///
/// BasicResult
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BasicResult {
    pub position: usize,
    pub result_variable: Option<String>,
    pub kind: Option<ValueKind>,
}

///
/// TupleResult
///
/// Multi-column selection item read back as one composite value.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TupleResult {
    jdbc_values_array_positions: Vec<usize>,
    result_variable: Option<String>,
    kind: ValueKind,
    navigable_path: Option<NavigablePath>,
}

impl TupleResult {
    #[must_use]
    pub const fn new(
        jdbc_values_array_positions: Vec<usize>,
        result_variable: Option<String>,
        kind: ValueKind,
        navigable_path: Option<NavigablePath>,
    ) -> Self {
        Self {
            jdbc_values_array_positions,
            result_variable,
            kind,
            navigable_path,
        }
    }

    #[must_use]
    pub fn jdbc_values_array_positions(&self) -> &[usize] {
        &self.jdbc_values_array_positions
    }

    #[must_use]
    pub fn result_variable(&self) -> Option<&str> {
        self.result_variable.as_deref()
    }

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub const fn navigable_path(&self) -> Option<&NavigablePath> {
        self.navigable_path.as_ref()
    }

    #[must_use]
    pub fn create_assembler(&self) -> TupleAssembler<'_> {
        TupleAssembler {
            positions: &self.jdbc_values_array_positions,
        }
    }
}

///
/// TupleAssembler
///

#[derive(Clone, Copy, Debug)]
pub struct TupleAssembler<'a> {
    positions: &'a [usize],
}

impl TupleAssembler<'_> {
    #[must_use]
    pub fn assemble(&self, row: &[Value]) -> Option<Value> {
        self.positions
            .iter()
            .map(|position| row.get(*position).cloned())
            .collect::<Option<Vec<_>>>()
            .map(Value::Composite)
    }
}
