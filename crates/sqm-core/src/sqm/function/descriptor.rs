use crate::{
    sqm::{
        SqmExpr,
        function::{
            AllOf, ArgumentCount, ArgumentFamilies, ArgumentTypeResolver, ArgumentsValidator,
            FromOtherArguments, FunctionError, FunctionRenderer, HighestPrecedenceReturnType,
            InvariantArgumentType, InvariantReturnType, KeywordFunctionRenderer,
            ReturnTypeResolver, SelfRenderingFunction, StandardFunctionRenderer, UseArgumentType,
        },
    },
    types::{BasicType, Expressible, JdbcType, TypeCatalog, TypeFamily, ValueKind},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// FunctionDescriptor
///
/// Everything a call node needs besides its arguments. Descriptors are
/// shared by every call to the same function.
///

#[derive(Clone, Debug)]
pub struct FunctionDescriptor {
    pub name: String,
    pub arguments_validator: Option<Arc<dyn ArgumentsValidator>>,
    pub argument_type_resolver: Option<Arc<dyn ArgumentTypeResolver>>,
    pub return_type_resolver: Arc<dyn ReturnTypeResolver>,
    pub renderer: Arc<dyn FunctionRenderer>,
}

impl FunctionDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, return_type_resolver: Arc<dyn ReturnTypeResolver>) -> Self {
        Self {
            name: name.into(),
            arguments_validator: None,
            argument_type_resolver: None,
            return_type_resolver,
            renderer: Arc::new(StandardFunctionRenderer),
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn ArgumentsValidator>) -> Self {
        self.arguments_validator = Some(validator);
        self
    }

    #[must_use]
    pub fn with_argument_type_resolver(mut self, resolver: Arc<dyn ArgumentTypeResolver>) -> Self {
        self.argument_type_resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn FunctionRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Build a call node, validating the domain-level arguments first.
    pub fn generate(
        self: &Arc<Self>,
        arguments: Vec<SqmExpr>,
        implied_result_type: Option<Expressible>,
        catalog: &Arc<TypeCatalog>,
    ) -> Result<SelfRenderingFunction, FunctionError> {
        if let Some(validator) = &self.arguments_validator {
            validator.validate(&arguments, &self.name)?;
        }

        Ok(SelfRenderingFunction::new(
            Arc::clone(self),
            arguments,
            implied_result_type,
            Arc::clone(catalog),
        ))
    }
}

///
/// FunctionRegistry
///
/// Function descriptors by case-insensitive name.
///

#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    descriptors: BTreeMap<String, Arc<FunctionDescriptor>>,
}

impl FunctionRegistry {
    /// Registry with the portable functions every dialect provides.
    #[must_use]
    pub fn standard(catalog: &TypeCatalog) -> Self {
        let text = standard_type(catalog, "string", ValueKind::Text, JdbcType::Varchar);
        let integer = standard_type(catalog, "integer", ValueKind::Integer, JdbcType::Integer);
        let date = standard_type(catalog, "date", ValueKind::Date, JdbcType::Date);

        let numeric = |count: ArgumentCount| counted_family(count, TypeFamily::Numeric);
        let textual = |count: ArgumentCount| counted_family(count, TypeFamily::Textual);

        let mut registry = Self::default();
        registry.register(
            FunctionDescriptor::new("abs", Arc::new(UseArgumentType(0)))
                .with_validator(numeric(ArgumentCount::exactly(1))),
        );
        registry.register(
            FunctionDescriptor::new("mod", Arc::new(HighestPrecedenceReturnType))
                .with_validator(numeric(ArgumentCount::exactly(2)))
                .with_argument_type_resolver(Arc::new(FromOtherArguments)),
        );
        for name in ["coalesce", "greatest", "least"] {
            registry.register(
                FunctionDescriptor::new(name, Arc::new(HighestPrecedenceReturnType))
                    .with_validator(Arc::new(ArgumentCount::at_least(2)))
                    .with_argument_type_resolver(Arc::new(FromOtherArguments)),
            );
        }
        for name in ["upper", "lower"] {
            registry.register(
                FunctionDescriptor::new(name, Arc::new(InvariantReturnType(Arc::clone(&text))))
                    .with_validator(textual(ArgumentCount::exactly(1))),
            );
        }
        registry.register(
            FunctionDescriptor::new("length", Arc::new(InvariantReturnType(integer)))
                .with_validator(textual(ArgumentCount::exactly(1))),
        );
        registry.register(
            FunctionDescriptor::new("concat", Arc::new(InvariantReturnType(Arc::clone(&text))))
                .with_validator(textual(ArgumentCount::at_least(2)))
                .with_argument_type_resolver(Arc::new(InvariantArgumentType(text))),
        );
        registry.register(
            FunctionDescriptor::new("current_date", Arc::new(InvariantReturnType(date)))
                .with_validator(Arc::new(ArgumentCount::exactly(0)))
                .with_renderer(Arc::new(KeywordFunctionRenderer)),
        );

        registry
    }

    pub fn register(&mut self, descriptor: FunctionDescriptor) -> Arc<FunctionDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.descriptors
            .insert(descriptor.name.to_ascii_lowercase(), Arc::clone(&descriptor));

        descriptor
    }

    pub fn find(&self, name: &str) -> Result<&Arc<FunctionDescriptor>, FunctionError> {
        self.descriptors
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| FunctionError::UnknownFunction {
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}

fn standard_type(
    catalog: &TypeCatalog,
    name: &str,
    kind: ValueKind,
    jdbc: JdbcType,
) -> Arc<BasicType> {
    catalog
        .standard_basic_type_for(kind)
        .unwrap_or_else(|| Arc::new(BasicType::new(name, kind, jdbc)))
}

fn counted_family(count: ArgumentCount, family: TypeFamily) -> Arc<dyn ArgumentsValidator> {
    let count: Arc<dyn ArgumentsValidator> = Arc::new(count);
    let family: Arc<dyn ArgumentsValidator> = Arc::new(ArgumentFamilies::uniform(family));

    Arc::new(AllOf(vec![count, family]))
}
