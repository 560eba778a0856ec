use crate::sqm::{CopyContext, SqmExpr};

///
/// ComparisonOperator
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl ComparisonOperator {
    #[must_use]
    pub const fn sql_token(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }
}

///
/// SqmPredicate
///

#[derive(Clone, Debug)]
pub enum SqmPredicate {
    Comparison {
        lhs: SqmExpr,
        operator: ComparisonOperator,
        rhs: SqmExpr,
    },
    InList {
        test: SqmExpr,
        list: Vec<SqmExpr>,
        negated: bool,
    },
    And(Vec<SqmPredicate>),
    Or(Vec<SqmPredicate>),
    Not(Box<SqmPredicate>),
    IsNull {
        expr: SqmExpr,
        negated: bool,
    },
}

impl SqmPredicate {
    #[must_use]
    pub const fn comparison(lhs: SqmExpr, operator: ComparisonOperator, rhs: SqmExpr) -> Self {
        Self::Comparison { lhs, operator, rhs }
    }

    #[must_use]
    pub const fn equal(lhs: SqmExpr, rhs: SqmExpr) -> Self {
        Self::comparison(lhs, ComparisonOperator::Equal, rhs)
    }

    #[must_use]
    pub const fn in_list(test: SqmExpr, list: Vec<SqmExpr>) -> Self {
        Self::InList {
            test,
            list,
            negated: false,
        }
    }

    #[must_use]
    pub fn copy(&self, context: &mut CopyContext) -> Self {
        match self {
            Self::Comparison { lhs, operator, rhs } => Self::Comparison {
                lhs: lhs.copy(context),
                operator: *operator,
                rhs: rhs.copy(context),
            },
            Self::InList {
                test,
                list,
                negated,
            } => Self::InList {
                test: test.copy(context),
                list: list.iter().map(|item| item.copy(context)).collect(),
                negated: *negated,
            },
            Self::And(children) => Self::And(children.iter().map(|c| c.copy(context)).collect()),
            Self::Or(children) => Self::Or(children.iter().map(|c| c.copy(context)).collect()),
            Self::Not(inner) => Self::Not(Box::new(inner.copy(context))),
            Self::IsNull { expr, negated } => Self::IsNull {
                expr: expr.copy(context),
                negated: *negated,
            },
        }
    }

    /// Visit every expression node in the predicate, in source order.
    pub fn for_each_node(&self, visit: &mut dyn FnMut(&SqmExpr)) {
        match self {
            Self::Comparison { lhs, rhs, .. } => {
                lhs.for_each_node(visit);
                rhs.for_each_node(visit);
            }
            Self::InList { test, list, .. } => {
                test.for_each_node(visit);
                for item in list {
                    item.for_each_node(visit);
                }
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.for_each_node(visit);
                }
            }
            Self::Not(inner) => inner.for_each_node(visit),
            Self::IsNull { expr, .. } => expr.for_each_node(visit),
        }
    }
}
