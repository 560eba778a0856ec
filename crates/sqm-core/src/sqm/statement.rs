use crate::{
    lowering::LoweringError,
    model::NavigablePath,
    sqm::{CopyContext, SqmExpr, SqmParameter, SqmPredicate},
    types::PathSource,
};
use std::sync::Arc;

///
/// SqmRoot
///
/// Entity root of a from clause, identified by its alias path.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SqmRoot {
    pub entity: String,
    pub path: NavigablePath,
}

impl SqmRoot {
    #[must_use]
    pub fn new(entity: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            path: NavigablePath::root(alias),
        }
    }
}

///
/// SqmValuesRoot
///
/// Inline `VALUES` rows used as a from-clause source.
///

#[derive(Clone, Debug)]
pub struct SqmValuesRoot {
    pub path: NavigablePath,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqmExpr>>,
}

///
/// SqmSelection
///

#[derive(Clone, Debug)]
pub struct SqmSelection {
    pub expr: SqmExpr,
    pub alias: Option<String>,
}

impl SqmSelection {
    #[must_use]
    pub const fn new(expr: SqmExpr) -> Self {
        Self { expr, alias: None }
    }

    #[must_use]
    pub fn aliased(expr: SqmExpr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

///
/// SqmSelect
///

#[derive(Clone, Debug, Default)]
pub struct SqmSelect {
    pub roots: Vec<SqmRoot>,
    pub values_roots: Vec<SqmValuesRoot>,
    pub selections: Vec<SqmSelection>,
    pub restriction: Option<SqmPredicate>,
}

///
/// SqmAssignment
///

#[derive(Clone, Debug)]
pub struct SqmAssignment {
    pub target: Arc<PathSource>,
    pub value: SqmExpr,
}

///
/// SqmUpdate
///

#[derive(Clone, Debug)]
pub struct SqmUpdate {
    pub target: SqmRoot,
    pub assignments: Vec<SqmAssignment>,
    pub restriction: Option<SqmPredicate>,
}

///
/// SqmDelete
///

#[derive(Clone, Debug)]
pub struct SqmDelete {
    pub target: SqmRoot,
    pub restriction: Option<SqmPredicate>,
}

///
/// SqmStatement
///

#[derive(Clone, Debug)]
pub enum SqmStatement {
    Select(SqmSelect),
    Update(SqmUpdate),
    Delete(SqmDelete),
}

impl SqmStatement {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Select(_) => "select",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }

    /// Require a query; data-modification statements are a usage error.
    pub fn verify_is_select(&self) -> Result<&SqmSelect, LoweringError> {
        match self {
            Self::Select(select) => Ok(select),
            Self::Update(_) | Self::Delete(_) => Err(LoweringError::StatementKind {
                expected: "select",
                found: self.kind(),
            }),
        }
    }

    /// Require a data-modification statement.
    pub fn verify_is_non_select(&self) -> Result<(), LoweringError> {
        match self {
            Self::Select(_) => Err(LoweringError::StatementKind {
                expected: "update or delete",
                found: self.kind(),
            }),
            Self::Update(_) | Self::Delete(_) => Ok(()),
        }
    }

    /// Private copy of the statement; see [`SqmExpr::copy`].
    #[must_use]
    pub fn copy(&self, context: &mut CopyContext) -> Self {
        let copy_restriction = |restriction: &Option<SqmPredicate>, context: &mut CopyContext| {
            restriction.as_ref().map(|predicate| predicate.copy(context))
        };

        match self {
            Self::Select(select) => Self::Select(SqmSelect {
                roots: select.roots.clone(),
                values_roots: select
                    .values_roots
                    .iter()
                    .map(|root| SqmValuesRoot {
                        path: root.path.clone(),
                        columns: root.columns.clone(),
                        rows: root
                            .rows
                            .iter()
                            .map(|row| row.iter().map(|cell| cell.copy(context)).collect())
                            .collect(),
                    })
                    .collect(),
                selections: select
                    .selections
                    .iter()
                    .map(|selection| SqmSelection {
                        expr: selection.expr.copy(context),
                        alias: selection.alias.clone(),
                    })
                    .collect(),
                restriction: copy_restriction(&select.restriction, context),
            }),
            Self::Update(update) => Self::Update(SqmUpdate {
                target: update.target.clone(),
                assignments: update
                    .assignments
                    .iter()
                    .map(|assignment| SqmAssignment {
                        target: Arc::clone(&assignment.target),
                        value: assignment.value.copy(context),
                    })
                    .collect(),
                restriction: copy_restriction(&update.restriction, context),
            }),
            Self::Delete(delete) => Self::Delete(SqmDelete {
                target: delete.target.clone(),
                restriction: copy_restriction(&delete.restriction, context),
            }),
        }
    }

    /// Visit every expression node in source order: values rows, then
    /// selections or assignments, then the restriction.
    pub fn for_each_node(&self, visit: &mut dyn FnMut(&SqmExpr)) {
        let restriction = match self {
            Self::Select(select) => {
                for root in &select.values_roots {
                    for cell in root.rows.iter().flatten() {
                        cell.for_each_node(visit);
                    }
                }
                for selection in &select.selections {
                    selection.expr.for_each_node(visit);
                }
                &select.restriction
            }
            Self::Update(update) => {
                for assignment in &update.assignments {
                    assignment.value.for_each_node(visit);
                }
                &update.restriction
            }
            Self::Delete(delete) => &delete.restriction,
        };

        if let Some(restriction) = restriction {
            restriction.for_each_node(visit);
        }
    }

    /// Visit every parameter occurrence in source order.
    pub fn for_each_parameter(&self, visit: &mut dyn FnMut(&Arc<SqmParameter>)) {
        self.for_each_node(&mut |node| {
            if let SqmExpr::Parameter(parameter) = node {
                visit(parameter);
            }
        });
    }
}
