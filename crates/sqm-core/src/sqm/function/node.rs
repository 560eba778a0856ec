use crate::{
    lowering::{LoweringError, SqlAstWalker},
    model::Mapping,
    obs::sink::{MetricsEvent, record},
    sql::{SqlExpr, SqlFunctionCall},
    sqm::{
        CopyContext, NodeMeta, SqmExpr,
        function::{FunctionDescriptor, FunctionError},
    },
    types::{Expressible, TypeCatalog},
};
use std::sync::{Arc, OnceLock};
use tracing::debug;

///
/// ResolutionState
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResolutionState {
    Unresolved,
    Resolved,
}

///
/// SelfRenderingFunction
///
/// Function call node. Owns its arguments and a write-once result type
/// cell that is filled on first demand. The resolver is a pure function of
/// the node's immutable inputs, so concurrent first calls may both compute
/// but always agree; only one value is ever stored.
///

#[derive(Debug)]
pub struct SelfRenderingFunction {
    descriptor: Arc<FunctionDescriptor>,
    arguments: Vec<SqmExpr>,
    implied_result_type: Option<Expressible>,
    catalog: Arc<TypeCatalog>,
    result_type: OnceLock<Option<Expressible>>,
    meta: NodeMeta,
}

impl SelfRenderingFunction {
    pub(crate) fn new(
        descriptor: Arc<FunctionDescriptor>,
        arguments: Vec<SqmExpr>,
        implied_result_type: Option<Expressible>,
        catalog: Arc<TypeCatalog>,
    ) -> Self {
        Self {
            descriptor,
            arguments,
            implied_result_type,
            catalog,
            result_type: OnceLock::new(),
            meta: NodeMeta::default(),
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: NodeMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[must_use]
    pub const fn descriptor(&self) -> &Arc<FunctionDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub fn arguments(&self) -> &[SqmExpr] {
        &self.arguments
    }

    #[must_use]
    pub const fn implied_result_type(&self) -> Option<&Expressible> {
        self.implied_result_type.as_ref()
    }

    #[must_use]
    pub const fn meta(&self) -> &NodeMeta {
        &self.meta
    }

    #[must_use]
    pub fn result_type_state(&self) -> ResolutionState {
        if self.result_type.get().is_some() {
            ResolutionState::Resolved
        } else {
            ResolutionState::Unresolved
        }
    }

    /// Result type of the call, resolved once and cached on the node.
    pub fn resolve_result_type(&self) -> Result<Option<&Expressible>, FunctionError> {
        if let Some(resolved) = self.result_type.get() {
            return Ok(resolved.as_ref());
        }

        let resolved = self.descriptor.return_type_resolver.resolve_return_type(
            self.implied_result_type.as_ref(),
            &self.arguments,
            &self.catalog,
        )?;
        record(MetricsEvent::FunctionResolved {
            function: self.name(),
        });

        // A concurrent first call may have stored an equal value already.
        let stored = self.result_type.get_or_init(|| resolved);

        Ok(stored.as_ref())
    }

    /// Lower each argument in order. With an argument type resolver, each
    /// argument is lowered under a hint for its own position, computed only
    /// if the walker asks for it.
    pub fn lower_arguments(
        &self,
        walker: &mut dyn SqlAstWalker,
    ) -> Result<Vec<SqlExpr>, LoweringError> {
        if self.arguments.is_empty() {
            return Ok(Vec::new());
        }

        let Some(resolver) = &self.descriptor.argument_type_resolver else {
            return self
                .arguments
                .iter()
                .map(|argument| walker.lower_expression(argument))
                .collect();
        };

        self.arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| {
                walker.lower_with_inferred_type(argument, &|walker| {
                    resolver.resolve_argument_type(self, index, walker)
                })
            })
            .collect()
    }

    /// Lower the call: resolve its type, lower and validate its arguments,
    /// then attach the relational mapping of the result when available.
    pub fn lower_to_target(&self, walker: &mut dyn SqlAstWalker) -> Result<SqlExpr, LoweringError> {
        let result_type = self.resolve_result_type()?.cloned();
        let arguments = self.lower_arguments(walker)?;

        if let Some(validator) = &self.descriptor.arguments_validator {
            validator.validate_sql_types(&arguments, self.name())?;
        }

        let model_expressible = self.model_expressible(result_type.as_ref(), &*walker, &arguments);

        Ok(SqlExpr::Function(Box::new(SqlFunctionCall {
            name: self.name().to_string(),
            renderer: Arc::clone(&self.descriptor.renderer),
            arguments,
            result_type,
            model_expressible,
        })))
    }

    fn model_expressible(
        &self,
        result_type: Option<&Expressible>,
        walker: &dyn SqlAstWalker,
        arguments: &[SqlExpr],
    ) -> Option<Mapping> {
        if let Some(mapping) = result_type.and_then(Expressible::as_mapping) {
            return Some(mapping);
        }

        let explicit = || self.table_group_aware_mapping_or_unavailable(result_type?, walker);

        self.descriptor
            .return_type_resolver
            .resolve_return_mapping(&explicit, arguments)
    }

    // Best-effort lookup: a result without a relational mapping only loses
    // downstream optimizations, so failure is logged and reported as absent.
    fn table_group_aware_mapping_or_unavailable(
        &self,
        result_type: &Expressible,
        walker: &dyn SqlAstWalker,
    ) -> Option<Mapping> {
        match walker.table_group_aware_mapping(result_type) {
            Ok(mapping) => mapping,
            Err(err) => {
                debug!(
                    function = self.name(),
                    result_type = %result_type,
                    error = %err,
                    "model expressible unavailable for function result"
                );
                record(MetricsEvent::ModelExpressibleUnavailable {
                    function: self.name(),
                });
                None
            }
        }
    }

    /// Copy into `context`: arguments are copied through the same context
    /// and the result type cell starts empty.
    #[must_use]
    pub fn copy(this: &Arc<Self>, context: &mut CopyContext) -> SqmExpr {
        let original = SqmExpr::Function(Arc::clone(this));
        if let Some(existing) = context.get_copy(&original) {
            return existing;
        }

        let arguments = this
            .arguments
            .iter()
            .map(|argument| argument.copy(context))
            .collect();
        let copy = Self::new(
            Arc::clone(&this.descriptor),
            arguments,
            this.implied_result_type.clone(),
            Arc::clone(&this.catalog),
        )
        .with_meta(this.meta.clone());

        let copy = SqmExpr::Function(Arc::new(copy));
        context.register_copy(&original, copy.clone());

        copy
    }
}
