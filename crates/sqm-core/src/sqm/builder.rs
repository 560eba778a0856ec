use crate::{
    model::NavigablePath,
    sqm::{
        NodeMeta, OccurrenceId, QueryParameter, SqmExpr, SqmLiteral, SqmParameter, SqmTuple,
        function::{FunctionError, FunctionRegistry},
    },
    types::{Expressible, PathSource, TypeCatalog, ValueKind},
    value::Value,
};
use std::sync::Arc;

///
/// SqmNodeBuilder
///
/// Factory for domain tree nodes. Owns the occurrence counter, so every
/// parameter occurrence built through one builder has a distinct id.
///

#[derive(Clone, Debug)]
pub struct SqmNodeBuilder {
    catalog: Arc<TypeCatalog>,
    functions: Arc<FunctionRegistry>,
    next_occurrence: u32,
}

impl SqmNodeBuilder {
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        let functions = Arc::new(FunctionRegistry::standard(&catalog));

        Self::with_functions(catalog, functions)
    }

    #[must_use]
    pub const fn with_functions(
        catalog: Arc<TypeCatalog>,
        functions: Arc<FunctionRegistry>,
    ) -> Self {
        Self {
            catalog,
            functions,
            next_occurrence: 0,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// Literal typed with the catalog's standard type for its kind.
    #[must_use]
    pub fn literal(&self, value: impl Into<Value>) -> SqmExpr {
        let value = value.into();
        let kind = value.kind();
        let expressible = self
            .catalog
            .standard_basic_type_for(kind)
            .map_or(Expressible::Domain(kind), Expressible::Basic);

        SqmExpr::Literal(Arc::new(SqmLiteral { value, expressible }))
    }

    #[must_use]
    pub fn typed_literal(&self, value: impl Into<Value>, expressible: Expressible) -> SqmExpr {
        SqmExpr::Literal(Arc::new(SqmLiteral {
            value: value.into(),
            expressible,
        }))
    }

    #[must_use]
    pub fn path(&self, path: NavigablePath, kind: ValueKind) -> SqmExpr {
        SqmExpr::Path(Arc::new(PathSource::new(path, kind)))
    }

    /// New occurrence of `parameter`.
    pub fn parameter(&mut self, parameter: &Arc<QueryParameter>) -> SqmExpr {
        SqmExpr::Parameter(Arc::new(self.occurrence(parameter, None, None)))
    }

    /// New occurrence of `parameter` whose type was inferred upstream.
    pub fn typed_parameter(
        &mut self,
        parameter: &Arc<QueryParameter>,
        anticipated_type: Expressible,
    ) -> SqmExpr {
        SqmExpr::Parameter(Arc::new(self.occurrence(
            parameter,
            Some(anticipated_type),
            None,
        )))
    }

    /// Sibling occurrence standing in for one more value of a multi-valued
    /// bind of `original`.
    pub fn expansion_of(&mut self, original: &SqmParameter) -> Arc<SqmParameter> {
        Arc::new(self.occurrence(
            &original.parameter,
            original.anticipated_type.clone(),
            Some(original.id),
        ))
    }

    fn occurrence(
        &mut self,
        parameter: &Arc<QueryParameter>,
        anticipated_type: Option<Expressible>,
        expansion_of: Option<OccurrenceId>,
    ) -> SqmParameter {
        let id = OccurrenceId(self.next_occurrence);
        self.next_occurrence += 1;

        SqmParameter {
            id,
            parameter: Arc::clone(parameter),
            anticipated_type,
            expansion_of,
        }
    }

    pub fn function(&self, name: &str, arguments: Vec<SqmExpr>) -> Result<SqmExpr, FunctionError> {
        self.function_with_implied_type(name, arguments, None)
    }

    pub fn function_with_implied_type(
        &self,
        name: &str,
        arguments: Vec<SqmExpr>,
        implied_result_type: Option<Expressible>,
    ) -> Result<SqmExpr, FunctionError> {
        let descriptor = self.functions.find(name)?;
        let function = descriptor.generate(arguments, implied_result_type, &self.catalog)?;

        Ok(SqmExpr::Function(Arc::new(function)))
    }

    #[must_use]
    pub fn tuple(&self, elements: Vec<SqmExpr>) -> SqmExpr {
        SqmExpr::Tuple(Arc::new(SqmTuple {
            elements,
            meta: NodeMeta::default(),
        }))
    }
}
