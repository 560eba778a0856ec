use crate::sql::{ColumnReference, DomainResult, FromClause, SqlExpr, SqlPredicate, TableReference};
use std::collections::BTreeSet;

///
/// SqlStatement
///

#[derive(Clone, Debug)]
pub enum SqlStatement {
    Select(SelectStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl SqlStatement {
    /// Tables read or written by the statement.
    #[must_use]
    pub fn affected_table_names(&self) -> BTreeSet<String> {
        match self {
            Self::Select(select) => select.from.affected_table_names(),
            Self::Update(UpdateStatement { target, .. })
            | Self::Delete(DeleteStatement { target, .. }) => {
                BTreeSet::from([target.table.clone()])
            }
        }
    }
}

///
/// SelectStatement
///
/// `selections` holds one entry per selected column; `domain_results`
/// groups those columns back into selection items.
///

#[derive(Clone, Debug)]
pub struct SelectStatement {
    pub from: FromClause,
    pub selections: Vec<SqlSelection>,
    pub domain_results: Vec<DomainResult>,
    pub restriction: Option<SqlPredicate>,
}

///
/// SqlSelection
///

#[derive(Clone, Debug)]
pub struct SqlSelection {
    pub position: usize,
    pub expr: SqlExpr,
}

///
/// UpdateStatement
///

#[derive(Clone, Debug)]
pub struct UpdateStatement {
    pub target: TableReference,
    pub assignments: Vec<SqlAssignment>,
    pub restriction: Option<SqlPredicate>,
}

///
/// SqlAssignment
///

#[derive(Clone, Debug)]
pub struct SqlAssignment {
    pub columns: Vec<ColumnReference>,
    pub value: SqlExpr,
}

///
/// DeleteStatement
///

#[derive(Clone, Debug)]
pub struct DeleteStatement {
    pub target: TableReference,
    pub restriction: Option<SqlPredicate>,
}
