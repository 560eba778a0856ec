use crate::{
    binding::{
        BindValue, BindingError, DomainParameterXref, JdbcParameterBinding, JdbcParameterBindings,
        JdbcParamsXref, QueryParameterBinding, QueryParameterBindings,
    },
    model::{
        ConvertedMapping, DomainModel, ForeignKeyMapping, IdentifierMapping, JdbcValue, Mapping,
    },
    obs::sink::{MetricsEvent, record},
    sql::{JdbcParameter, TableGroupLocator},
    sqm::{ParameterKey, SqmParameter},
    types::{Expressible, TypeCatalog},
    value::Value,
};
use std::sync::Arc;
use tracing::debug;

///
/// SessionContext
///
/// Execution-scoped services the builder consults.
///

pub trait SessionContext {
    fn type_catalog(&self) -> &TypeCatalog;
}

impl SessionContext for DomainModel {
    fn type_catalog(&self) -> &TypeCatalog {
        self.catalog()
    }
}

///
/// BindShape
///
/// How a bound value reaches its slots, chosen once per occurrence from
/// its resolved mapping.
///

enum BindShape {
    Plain(Mapping),
    Converted(Arc<ConvertedMapping>),
    EntityIdentifier(Arc<IdentifierMapping>),
    ForeignKey(Arc<ForeignKeyMapping>),
}

impl BindShape {
    fn of(mapping: Mapping) -> Self {
        match mapping {
            Mapping::Converted(converted) => Self::Converted(converted),
            Mapping::EntityIdentifier(identifier) => Self::EntityIdentifier(identifier),
            Mapping::ForeignKey(fk) => Self::ForeignKey(fk),
            plain @ (Mapping::Basic(_) | Mapping::Embedded(_)) => Self::Plain(plain),
        }
    }

    // Converted values go through the converter inside `disassemble`.
    fn disassemble(&self, value: &Value) -> Result<Vec<JdbcValue>, BindingError> {
        let values = match self {
            Self::Plain(mapping) => mapping.disassemble(value)?,
            Self::Converted(converted) => {
                Mapping::Converted(Arc::clone(converted)).disassemble(value)?
            }
            Self::EntityIdentifier(identifier) => identifier
                .mapping
                .disassemble(identifier.identifier_value(value))?,
            Self::ForeignKey(fk) => fk.key.disassemble(fk.key_value(value))?,
        };

        Ok(values)
    }
}

/// Bind type for one occurrence: the binding's explicit type, else the
/// parameter's declared type, else the type inferred for the occurrence
/// upstream, else the catalog's standard type for the bound value's class.
#[must_use]
pub fn determine_parameter_type(
    binding: &QueryParameterBinding,
    occurrence: &SqmParameter,
    session: &dyn SessionContext,
) -> Option<Expressible> {
    if let Some(bind_type) = &binding.bind_type {
        return Some(bind_type.clone());
    }
    if let Some(declared) = &occurrence.parameter.declared_type {
        return Some(declared.clone());
    }
    if let Some(anticipated) = &occurrence.anticipated_type {
        return Some(anticipated.clone());
    }

    binding
        .representative_value()
        .and_then(|value| session.type_catalog().standard_basic_type_for(value.kind()))
        .map(Expressible::Basic)
}

/// Build the binding plan for one execution.
pub fn create_jdbc_parameter_bindings(
    domain_bindings: &QueryParameterBindings,
    xref: &DomainParameterXref,
    jdbc_xref: &JdbcParamsXref,
    model: &DomainModel,
    locator: &dyn TableGroupLocator,
    session: &dyn SessionContext,
) -> Result<JdbcParameterBindings, BindingError> {
    let mut plan = JdbcParameterBindings::default();

    for entry in xref.iter() {
        let parameter = &entry.parameter;
        let key = &parameter.key;
        let binding = domain_bindings
            .binding(key)
            .ok_or_else(|| BindingError::UnknownParameter {
                parameter: key.to_string(),
            })?;
        let builder = ParameterBinder {
            key,
            model,
            locator,
            jdbc_xref,
        };

        for occurrence in &entry.occurrences {
            let groups = builder.groups(occurrence)?;
            let parameter_type = determine_parameter_type(binding, occurrence, session);

            match &binding.value {
                BindValue::Unbound => builder.bind_unbound(&mut plan, occurrence, groups)?,
                BindValue::Multi(values) => {
                    let shape = builder.shape(parameter_type.as_ref())?;
                    let expansions = xref.expansions(occurrence.id);
                    if values.is_empty() {
                        return Err(BindingError::EmptyMultiValued {
                            parameter: key.to_string(),
                        });
                    }
                    if expansions.len() != values.len() - 1 {
                        return Err(BindingError::ExpansionCountMismatch {
                            parameter: key.to_string(),
                            expected: values.len() - 1,
                            found: expansions.len(),
                        });
                    }

                    // Each slot group takes the next value: the occurrence's
                    // own groups first, then its expansions in order.
                    let mut remaining = values.iter();
                    let exhausted = || BindingError::ExpansionCountMismatch {
                        parameter: key.to_string(),
                        expected: values.len() - 1,
                        found: expansions.len(),
                    };

                    for group in groups {
                        let value = remaining.next().ok_or_else(exhausted)?;
                        builder.bind_value(&mut plan, shape.as_ref(), group, value)?;
                    }
                    for (position, expansion) in expansions.iter().enumerate() {
                        for group in builder.expansion_groups(occurrence, position, expansion)? {
                            let value = remaining.next().ok_or_else(exhausted)?;
                            builder.bind_value(&mut plan, shape.as_ref(), group, value)?;
                        }
                    }
                    if remaining.next().is_some() {
                        return Err(exhausted());
                    }
                }
                BindValue::Single(Value::Null) => {
                    for group in groups {
                        bind_nulls(&mut plan, group)?;
                    }
                }
                BindValue::Single(value) => {
                    let shape = builder.shape(parameter_type.as_ref())?;
                    if let Some(BindShape::Converted(converted)) = &shape {
                        builder.bind_converted(&mut plan, converted, groups, value)?;
                        continue;
                    }

                    for group in groups {
                        builder.bind_value(&mut plan, shape.as_ref(), group, value)?;
                    }
                }
            }
        }
    }

    let bindings = plan.len() as u64;
    record(MetricsEvent::BindingPlanBuilt { bindings });
    debug!(bindings, parameters = xref.parameter_count(), "built binding plan");

    Ok(plan)
}

///
/// ParameterBinder
///
/// Per-parameter state for the binding walk.
///

struct ParameterBinder<'a> {
    key: &'a ParameterKey,
    model: &'a DomainModel,
    locator: &'a dyn TableGroupLocator,
    jdbc_xref: &'a JdbcParamsXref,
}

impl<'a> ParameterBinder<'a> {
    fn groups(&self, occurrence: &SqmParameter) -> Result<&'a [Vec<JdbcParameter>], BindingError> {
        self.jdbc_xref
            .groups(self.key, occurrence.id)
            .ok_or_else(|| BindingError::MissingSlots {
                parameter: self.key.to_string(),
                occurrence: occurrence.id,
            })
    }

    // Expansions are indexed by position under the occurrence they expand.
    fn expansion_groups(
        &self,
        original: &SqmParameter,
        position: usize,
        expansion: &SqmParameter,
    ) -> Result<&'a [Vec<JdbcParameter>], BindingError> {
        self.jdbc_xref
            .expansion_groups(self.key, original.id, position)
            .ok_or_else(|| BindingError::MissingSlots {
                parameter: self.key.to_string(),
                occurrence: expansion.id,
            })
    }

    fn shape(
        &self,
        parameter_type: Option<&Expressible>,
    ) -> Result<Option<BindShape>, BindingError> {
        let Some(parameter_type) = parameter_type else {
            return Ok(None);
        };

        Ok(self
            .model
            .resolve_mapping(parameter_type, self.locator)?
            .map(BindShape::of))
    }

    // One placeholder per column of the occurrence's mapping. Without a
    // mapping every allocated slot gets one.
    fn bind_unbound(
        &self,
        plan: &mut JdbcParameterBindings,
        occurrence: &SqmParameter,
        groups: &[Vec<JdbcParameter>],
    ) -> Result<(), BindingError> {
        let mapping = match occurrence.expressible_type() {
            Some(expressible) => self.model.resolve_mapping(expressible, self.locator)?,
            None => None,
        };

        for group in groups {
            let Some(mapping) = &mapping else {
                for parameter in group {
                    plan.add_binding(parameter.slot, JdbcParameterBinding::placeholder())?;
                }
                continue;
            };

            let mut result = Ok(());
            let columns = mapping.for_each_jdbc_type(|position, _| {
                if result.is_err() {
                    return;
                }
                if let Some(parameter) = group.get(position) {
                    result = plan.add_binding(parameter.slot, JdbcParameterBinding::placeholder());
                }
            });
            result?;

            if columns != group.len() {
                return Err(self.slot_count_mismatch(group.len(), columns));
            }
        }

        Ok(())
    }

    fn bind_converted(
        &self,
        plan: &mut JdbcParameterBindings,
        converted: &ConvertedMapping,
        groups: &[Vec<JdbcParameter>],
        value: &Value,
    ) -> Result<(), BindingError> {
        let relational = converted.converter.to_relational(value)?;

        for group in groups {
            let [parameter] = group.as_slice() else {
                return Err(BindingError::ConvertedMultiColumn {
                    parameter: self.key.to_string(),
                    slots: group.len(),
                });
            };
            plan.add_binding(
                parameter.slot,
                JdbcParameterBinding::new(Some(converted.relational.jdbc), relational.clone()),
            )?;
        }

        Ok(())
    }

    fn bind_value(
        &self,
        plan: &mut JdbcParameterBindings,
        shape: Option<&BindShape>,
        group: &[JdbcParameter],
        value: &Value,
    ) -> Result<(), BindingError> {
        if value.is_null() {
            return bind_nulls(plan, group);
        }

        let shape = shape.ok_or_else(|| BindingError::UntypedParameter {
            parameter: self.key.to_string(),
        })?;
        let values = shape.disassemble(value)?;
        if values.len() != group.len() {
            return Err(self.slot_count_mismatch(group.len(), values.len()));
        }

        for (parameter, value) in group.iter().zip(values) {
            plan.add_binding(
                parameter.slot,
                JdbcParameterBinding::new(Some(value.jdbc_type), value.value),
            )?;
        }

        Ok(())
    }

    fn slot_count_mismatch(&self, expected: usize, found: usize) -> BindingError {
        BindingError::SlotCountMismatch {
            parameter: self.key.to_string(),
            expected,
            found,
        }
    }
}

// Nulls keep whatever type the slot was lowered with.
fn bind_nulls(
    plan: &mut JdbcParameterBindings,
    group: &[JdbcParameter],
) -> Result<(), BindingError> {
    for parameter in group {
        plan.add_binding(
            parameter.slot,
            JdbcParameterBinding::new(parameter.jdbc_type, Value::Null),
        )?;
    }

    Ok(())
}
