use crate::{
    lowering::LoweringError,
    model::{Mapping, MappingError},
    sql::SqlExpr,
    sqm::SqmExpr,
    types::{Expressible, TypeCatalog},
};

///
/// SqlAstWalker
///
/// The lowering walk as seen by nodes that lower themselves. Type hints
/// are passed as closures so a hint is only computed when the node being
/// lowered actually needs one.
///

pub trait SqlAstWalker {
    fn lower_with_inferred_type(
        &mut self,
        expr: &SqmExpr,
        inferred: &dyn Fn(&dyn SqlAstWalker) -> Option<Mapping>,
    ) -> Result<SqlExpr, LoweringError>;

    fn lower_expression(&mut self, expr: &SqmExpr) -> Result<SqlExpr, LoweringError> {
        self.lower_with_inferred_type(expr, &|_| None)
    }

    /// Mapping for a domain type, resolving paths through the table groups
    /// registered so far.
    fn table_group_aware_mapping(
        &self,
        expressible: &Expressible,
    ) -> Result<Option<Mapping>, MappingError>;

    fn type_catalog(&self) -> &TypeCatalog;
}

/// Hint taken from the type of a sibling expression.
pub(crate) fn mapping_of(walker: &dyn SqlAstWalker, expr: &SqmExpr) -> Option<Mapping> {
    let expressible = expr.expressible_type().ok().flatten()?;

    walker.table_group_aware_mapping(&expressible).ok().flatten()
}
