use crate::{
    model::Mapping,
    sqm::{ComparisonOperator, function::FunctionRenderer},
    types::{Expressible, JdbcType, ValueKind},
    value::Value,
};
use derive_more::Display;
use std::sync::Arc;

///
/// SlotId
///
/// Identity of one low-level bind position. Slots are numbered in
/// allocation order during lowering; render order is tracked separately.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("slot{_0}")]
pub struct SlotId(pub u32);

///
/// JdbcParameter
///
/// One bind position. `jdbc_type` is set when the occurrence could be
/// typed while lowering, and left empty for deferred typing.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JdbcParameter {
    pub slot: SlotId,
    pub jdbc_type: Option<JdbcType>,
}

///
/// ColumnReference
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnReference {
    pub qualifier: String,
    pub column: String,
    pub jdbc_type: JdbcType,
}

///
/// SqlLiteral
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqlLiteral {
    pub value: Value,
    pub jdbc_type: JdbcType,
}

///
/// SqlFunctionCall
///
/// Lowered function invocation. Carries the resolved domain result type
/// and, when one could be found, the relational mapping of its result.
///

#[derive(Clone, Debug)]
pub struct SqlFunctionCall {
    pub name: String,
    pub renderer: Arc<dyn FunctionRenderer>,
    pub arguments: Vec<SqlExpr>,
    pub result_type: Option<Expressible>,
    pub model_expressible: Option<Mapping>,
}

///
/// SqlExpr
///

#[derive(Clone, Debug)]
pub enum SqlExpr {
    Column(ColumnReference),
    Literal(SqlLiteral),
    Parameter(JdbcParameter),
    Function(Box<SqlFunctionCall>),
    Tuple(Vec<SqlExpr>),
}

impl SqlExpr {
    /// Value kind of the expression as seen at the relational level.
    /// Untyped parameters report `None`.
    #[must_use]
    pub fn value_kind(&self) -> Option<ValueKind> {
        match self {
            Self::Column(column) => Some(column.jdbc_type.value_kind()),
            Self::Literal(literal) => Some(literal.jdbc_type.value_kind()),
            Self::Parameter(parameter) => parameter.jdbc_type.map(JdbcType::value_kind),
            Self::Function(call) => call.result_type.as_ref().map(Expressible::value_kind),
            Self::Tuple(_) => Some(ValueKind::Composite),
        }
    }

    /// Number of selection columns the expression occupies.
    #[must_use]
    pub fn column_count(&self) -> usize {
        match self {
            Self::Tuple(elements) => elements.iter().map(Self::column_count).sum(),
            _ => 1,
        }
    }

    /// Split a tuple into its leaf expressions; anything else is one leaf.
    pub fn flatten_into(self, out: &mut Vec<Self>) {
        match self {
            Self::Tuple(elements) => {
                for element in elements {
                    element.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }

    /// Build a column list expression, collapsing a single column.
    #[must_use]
    pub fn from_columns(mut columns: Vec<ColumnReference>) -> Self {
        if columns.len() == 1
            && let Some(column) = columns.pop()
        {
            return Self::Column(column);
        }

        Self::Tuple(columns.into_iter().map(Self::Column).collect())
    }

    #[must_use]
    pub fn from_parameters(mut parameters: Vec<JdbcParameter>) -> Self {
        if parameters.len() == 1
            && let Some(parameter) = parameters.pop()
        {
            return Self::Parameter(parameter);
        }

        Self::Tuple(parameters.into_iter().map(Self::Parameter).collect())
    }
}

///
/// SqlPredicate
///

#[derive(Clone, Debug)]
pub enum SqlPredicate {
    Comparison {
        lhs: SqlExpr,
        operator: ComparisonOperator,
        rhs: SqlExpr,
    },
    InList {
        test: SqlExpr,
        list: Vec<SqlExpr>,
        negated: bool,
    },
    And(Vec<SqlPredicate>),
    Or(Vec<SqlPredicate>),
    Not(Box<SqlPredicate>),
    IsNull {
        expr: SqlExpr,
        negated: bool,
    },
}
