use crate::{
    lowering::SqlAstWalker,
    model::Mapping,
    sql::SqlExpr,
    sqm::{
        SqmExpr,
        function::{FunctionError, SelfRenderingFunction},
    },
    types::{BasicType, Expressible, TypeCatalog, highest_precedence},
};
use std::{fmt, sync::Arc};

///
/// ReturnTypeResolver
///

pub trait ReturnTypeResolver: fmt::Debug + Send + Sync {
    /// Domain result type of a call with these arguments. `implied` is the
    /// type the surrounding context expects, when known.
    fn resolve_return_type(
        &self,
        implied: Option<&Expressible>,
        arguments: &[SqmExpr],
        catalog: &TypeCatalog,
    ) -> Result<Option<Expressible>, FunctionError>;

    /// Relational mapping of the result, given the lowered arguments.
    /// `explicit` looks the mapping up from the resolved result type and
    /// answers `None` when that lookup is unavailable.
    fn resolve_return_mapping(
        &self,
        explicit: &dyn Fn() -> Option<Mapping>,
        _arguments: &[SqlExpr],
    ) -> Option<Mapping> {
        explicit()
    }
}

///
/// InvariantReturnType
///
/// Always the same type, unless the context implies a type of the same
/// kind (for instance a converted or custom-named variant).
///

#[derive(Clone, Debug)]
pub struct InvariantReturnType(pub Arc<BasicType>);

impl ReturnTypeResolver for InvariantReturnType {
    fn resolve_return_type(
        &self,
        implied: Option<&Expressible>,
        _: &[SqmExpr],
        _: &TypeCatalog,
    ) -> Result<Option<Expressible>, FunctionError> {
        let ty = match implied {
            Some(implied) if implied.value_kind() == self.0.kind => implied.clone(),
            _ => Expressible::Basic(Arc::clone(&self.0)),
        };

        Ok(Some(ty))
    }
}

///
/// UseArgumentType
///
/// The type of the argument at a fixed position.
///

#[derive(Clone, Copy, Debug)]
pub struct UseArgumentType(pub usize);

impl ReturnTypeResolver for UseArgumentType {
    fn resolve_return_type(
        &self,
        implied: Option<&Expressible>,
        arguments: &[SqmExpr],
        _: &TypeCatalog,
    ) -> Result<Option<Expressible>, FunctionError> {
        let from_argument = match arguments.get(self.0) {
            Some(argument) => argument.expressible_type()?,
            None => None,
        };

        Ok(from_argument.or_else(|| implied.cloned()))
    }

    fn resolve_return_mapping(
        &self,
        explicit: &dyn Fn() -> Option<Mapping>,
        arguments: &[SqlExpr],
    ) -> Option<Mapping> {
        if let Some(SqlExpr::Function(call)) = arguments.get(self.0)
            && let Some(mapping) = &call.model_expressible
        {
            return Some(mapping.clone());
        }

        explicit()
    }
}

///
/// HighestPrecedenceReturnType
///
/// The highest-precedence type among the arguments.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct HighestPrecedenceReturnType;

impl ReturnTypeResolver for HighestPrecedenceReturnType {
    fn resolve_return_type(
        &self,
        implied: Option<&Expressible>,
        arguments: &[SqmExpr],
        _: &TypeCatalog,
    ) -> Result<Option<Expressible>, FunctionError> {
        let types = arguments
            .iter()
            .map(SqmExpr::expressible_type)
            .collect::<Result<Vec<_>, _>>()?;
        let widest = highest_precedence(types.iter().map(Option::as_ref));

        Ok(widest.cloned().or_else(|| implied.cloned()))
    }
}

///
/// ArgumentTypeResolver
///
/// Contextual type for one argument, used to type parameters and other
/// expressions that cannot type themselves.
///

pub trait ArgumentTypeResolver: fmt::Debug + Send + Sync {
    fn resolve_argument_type(
        &self,
        function: &SelfRenderingFunction,
        index: usize,
        walker: &dyn SqlAstWalker,
    ) -> Option<Mapping>;
}

///
/// FromOtherArguments
///
/// An argument takes the highest-precedence type of its siblings.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct FromOtherArguments;

impl ArgumentTypeResolver for FromOtherArguments {
    fn resolve_argument_type(
        &self,
        function: &SelfRenderingFunction,
        index: usize,
        walker: &dyn SqlAstWalker,
    ) -> Option<Mapping> {
        let siblings: Vec<Option<Expressible>> = function
            .arguments()
            .iter()
            .enumerate()
            .filter(|(position, _)| *position != index)
            .map(|(_, argument)| argument.expressible_type().ok().flatten())
            .collect();
        let widest = highest_precedence(siblings.iter().map(Option::as_ref))?;

        walker.table_group_aware_mapping(widest).ok().flatten()
    }
}

///
/// InvariantArgumentType
///

#[derive(Clone, Debug)]
pub struct InvariantArgumentType(pub Arc<BasicType>);

impl ArgumentTypeResolver for InvariantArgumentType {
    fn resolve_argument_type(
        &self,
        _: &SelfRenderingFunction,
        _: usize,
        _: &dyn SqlAstWalker,
    ) -> Option<Mapping> {
        Some(Mapping::Basic(Arc::clone(&self.0)))
    }
}
