use crate::{
    sqm::{
        SqmParameter,
        function::{FunctionError, SelfRenderingFunction},
    },
    types::{Expressible, PathSource, ValueKind},
    value::Value,
};
use std::{collections::BTreeMap, sync::Arc};

///
/// NodeMeta
///
/// Source-level bookkeeping carried by a node: where it came from in the
/// query text and the alias it was given, if any.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodeMeta {
    pub span: Option<(u32, u32)>,
    pub alias: Option<String>,
}

///
/// SqmLiteral
///

#[derive(Clone, Debug, PartialEq)]
pub struct SqmLiteral {
    pub value: Value,
    pub expressible: Expressible,
}

///
/// SqmTuple
///

#[derive(Debug)]
pub struct SqmTuple {
    pub elements: Vec<SqmExpr>,
    pub meta: NodeMeta,
}

///
/// SqmExpr
///
/// Domain expression node. Nodes are shared behind `Arc`; a tree can be
/// referenced by many cached plans at once and is never mutated in place.
///

#[derive(Clone, Debug)]
pub enum SqmExpr {
    Literal(Arc<SqmLiteral>),
    Parameter(Arc<SqmParameter>),
    Path(Arc<PathSource>),
    Function(Arc<SelfRenderingFunction>),
    Tuple(Arc<SqmTuple>),
}

impl SqmExpr {
    /// Domain type of this expression, resolving function result types on
    /// first use.
    pub fn expressible_type(&self) -> Result<Option<Expressible>, FunctionError> {
        let ty = match self {
            Self::Literal(literal) => Some(literal.expressible.clone()),
            Self::Parameter(parameter) => parameter.expressible_type().cloned(),
            Self::Path(source) => Some(Expressible::Path(Arc::clone(source))),
            Self::Function(function) => function.resolve_result_type()?.cloned(),
            Self::Tuple(_) => Some(Expressible::Domain(ValueKind::Composite)),
        };

        Ok(ty)
    }

    /// Copy this expression into `context`.
    ///
    /// Literals, parameters, and paths hold no mutable state and keep their
    /// identity; functions and tuples are rebuilt once per context.
    #[must_use]
    pub fn copy(&self, context: &mut CopyContext) -> Self {
        match self {
            Self::Literal(_) | Self::Parameter(_) | Self::Path(_) => self.clone(),
            Self::Function(function) => SelfRenderingFunction::copy(function, context),
            Self::Tuple(tuple) => {
                if let Some(existing) = context.get_copy(self) {
                    return existing;
                }
                let elements = tuple
                    .elements
                    .iter()
                    .map(|element| element.copy(context))
                    .collect();
                let copy = Self::Tuple(Arc::new(SqmTuple {
                    elements,
                    meta: tuple.meta.clone(),
                }));
                context.register_copy(self, copy.clone());

                copy
            }
        }
    }

    /// Visit this node and every node below it, parents first.
    pub fn for_each_node(&self, visit: &mut dyn FnMut(&Self)) {
        visit(self);
        match self {
            Self::Function(function) => {
                for argument in function.arguments() {
                    argument.for_each_node(visit);
                }
            }
            Self::Tuple(tuple) => {
                for element in &tuple.elements {
                    element.for_each_node(visit);
                }
            }
            Self::Literal(_) | Self::Parameter(_) | Self::Path(_) => {}
        }
    }

    /// Identity of the shared node behind this expression.
    #[must_use]
    pub fn node_id(&self) -> usize {
        match self {
            Self::Literal(node) => Arc::as_ptr(node).addr(),
            Self::Parameter(node) => Arc::as_ptr(node).addr(),
            Self::Path(node) => Arc::as_ptr(node).addr(),
            Self::Function(node) => Arc::as_ptr(node).addr(),
            Self::Tuple(node) => Arc::as_ptr(node).addr(),
        }
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.node_id() == other.node_id()
    }
}

///
/// CopyContext
///
/// Identity-keyed registry for one copy operation. A node copied twice
/// through the same context yields the same copy, so shared subtrees stay
/// shared in the result.
///

#[derive(Debug, Default)]
pub struct CopyContext {
    // The original is retained so its address cannot be reused while the
    // context is alive.
    copies: BTreeMap<usize, (SqmExpr, SqmExpr)>,
}

impl CopyContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_copy(&self, original: &SqmExpr) -> Option<SqmExpr> {
        self.copies
            .get(&original.node_id())
            .map(|(_, copy)| copy.clone())
    }

    pub fn register_copy(&mut self, original: &SqmExpr, copy: SqmExpr) {
        self.copies
            .insert(original.node_id(), (original.clone(), copy));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }
}
