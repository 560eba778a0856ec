//! Shared fixtures: a small domain model, counting resolvers, and a
//! recording statement sink.

use crate::{
    binding::{BindTarget, BindingError, StatementSink},
    lowering::SqlAstWalker,
    model::{
        AttributeMapping, ConvertedMapping, DomainModel, EmbeddedComponent, EmbeddedMapping,
        EntityMapping, Mapping, OrdinalConverter, YesNoConverter,
    },
    sqm::{
        SqmExpr, SqmNodeBuilder,
        function::{ArgumentTypeResolver, FunctionError, ReturnTypeResolver, SelfRenderingFunction},
    },
    types::{BasicType, Expressible, JdbcType, TypeCatalog, ValueKind},
    value::Value,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

pub(crate) fn catalog() -> Arc<TypeCatalog> {
    Arc::new(TypeCatalog::standard())
}

pub(crate) fn basic(catalog: &TypeCatalog, kind: ValueKind) -> Arc<BasicType> {
    catalog
        .standard_basic_type_for(kind)
        .expect("standard catalog covers scalar kinds")
}

pub(crate) fn basic_mapping(catalog: &TypeCatalog, kind: ValueKind) -> Mapping {
    Mapping::Basic(basic(catalog, kind))
}

pub(crate) fn address_mapping(catalog: &TypeCatalog) -> Mapping {
    Mapping::Embedded(Arc::new(EmbeddedMapping::new(
        "Address",
        vec![
            EmbeddedComponent::new("street", basic_mapping(catalog, ValueKind::Text)),
            EmbeddedComponent::new("city", basic_mapping(catalog, ValueKind::Text)),
        ],
    )))
}

pub(crate) fn person(catalog: &TypeCatalog) -> EntityMapping {
    let active = Mapping::Converted(Arc::new(ConvertedMapping::new(
        Arc::new(YesNoConverter),
        basic(catalog, ValueKind::Character),
    )));
    let status = Mapping::Converted(Arc::new(ConvertedMapping::new(
        Arc::new(OrdinalConverter::new("status", ["ACTIVE", "SUSPENDED", "CLOSED"])),
        basic(catalog, ValueKind::Integer),
    )));

    EntityMapping::new(
        "Person",
        "person",
        AttributeMapping::new("id", basic_mapping(catalog, ValueKind::Long), ["id"]),
    )
    .with_attribute(AttributeMapping::new(
        "name",
        basic_mapping(catalog, ValueKind::Text),
        ["name"],
    ))
    .with_attribute(AttributeMapping::new(
        "age",
        basic_mapping(catalog, ValueKind::Integer),
        ["age"],
    ))
    .with_attribute(AttributeMapping::new("active", active, ["active"]))
    .with_attribute(AttributeMapping::new("status", status, ["status"]))
    .with_attribute(AttributeMapping::new(
        "address",
        address_mapping(catalog),
        ["street", "city"],
    ))
}

pub(crate) fn order(catalog: &TypeCatalog, customer: &EntityMapping) -> EntityMapping {
    EntityMapping::new(
        "Order",
        "orders",
        AttributeMapping::new("id", basic_mapping(catalog, ValueKind::Long), ["id"]),
    )
    .with_attribute(AttributeMapping::to_one("customer", customer, ["customer_id"]))
    .with_attribute(AttributeMapping::new(
        "total",
        basic_mapping(catalog, ValueKind::BigDecimal),
        ["total"],
    ))
}

/// Person, Order, and the standard catalog.
pub(crate) fn model() -> DomainModel {
    let catalog = catalog();
    let person = person(&catalog);
    let order = order(&catalog, &person);

    DomainModel::new(catalog).with_entity(person).with_entity(order)
}

pub(crate) fn builder(model: &DomainModel) -> SqmNodeBuilder {
    SqmNodeBuilder::new(Arc::clone(model.catalog()))
}

///
/// CountingReturnType
///
/// Delegates to an inner resolver and counts calls.
///

#[derive(Debug)]
pub(crate) struct CountingReturnType {
    pub(crate) calls: Arc<AtomicUsize>,
    pub(crate) inner: Arc<dyn ReturnTypeResolver>,
}

impl CountingReturnType {
    pub(crate) fn new(inner: Arc<dyn ReturnTypeResolver>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = Self {
            calls: Arc::clone(&calls),
            inner,
        };

        (resolver, calls)
    }
}

impl ReturnTypeResolver for CountingReturnType {
    fn resolve_return_type(
        &self,
        implied: Option<&Expressible>,
        arguments: &[SqmExpr],
        catalog: &TypeCatalog,
    ) -> Result<Option<Expressible>, FunctionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.inner.resolve_return_type(implied, arguments, catalog)
    }
}

///
/// FixedReturnType
///
/// Always answers the same expressible.
///

#[derive(Debug)]
pub(crate) struct FixedReturnType(pub(crate) Expressible);

impl ReturnTypeResolver for FixedReturnType {
    fn resolve_return_type(
        &self,
        _: Option<&Expressible>,
        _: &[SqmExpr],
        _: &TypeCatalog,
    ) -> Result<Option<Expressible>, FunctionError> {
        Ok(Some(self.0.clone()))
    }
}

///
/// RecordingArgumentType
///
/// Records which argument positions were asked for a hint.
///

#[derive(Debug)]
pub(crate) struct RecordingArgumentType {
    pub(crate) requested: Arc<Mutex<Vec<usize>>>,
    pub(crate) hint: Arc<BasicType>,
}

impl ArgumentTypeResolver for RecordingArgumentType {
    fn resolve_argument_type(
        &self,
        _: &SelfRenderingFunction,
        index: usize,
        _: &dyn SqlAstWalker,
    ) -> Option<Mapping> {
        self.requested
            .lock()
            .expect("requested positions lock poisoned")
            .push(index);

        Some(Mapping::Basic(Arc::clone(&self.hint)))
    }
}

///
/// RecordingSink
///

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) calls: Vec<(String, JdbcType, Value)>,
    pub(crate) reject: bool,
}

impl StatementSink for RecordingSink {
    fn bind_value(
        &mut self,
        target: BindTarget<'_>,
        jdbc_type: JdbcType,
        value: &Value,
    ) -> Result<(), BindingError> {
        if self.reject {
            return Err(BindingError::Sink {
                message: format!("rejected {target}"),
            });
        }
        self.calls.push((target.to_string(), jdbc_type, value.clone()));

        Ok(())
    }

    fn bind_null(
        &mut self,
        target: BindTarget<'_>,
        jdbc_type: JdbcType,
    ) -> Result<(), BindingError> {
        self.bind_value(target, jdbc_type, &Value::Null)
    }
}
