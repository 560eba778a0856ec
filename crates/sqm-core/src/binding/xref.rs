use crate::{
    binding::{BindValue, BindingError, QueryParameterBindings},
    sqm::{OccurrenceId, ParameterKey, QueryParameter, SqmNodeBuilder, SqmParameter, SqmStatement},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

///
/// ParameterOccurrences
///
/// One domain parameter and its occurrences in tree order.
///

#[derive(Clone, Debug)]
pub struct ParameterOccurrences {
    pub parameter: Arc<QueryParameter>,
    pub occurrences: Vec<Arc<SqmParameter>>,
}

///
/// DomainParameterXref
///
/// Domain parameter -> occurrences, plus the expansion occurrences created
/// for multi-valued binds, keyed by the occurrence they expand.
///

#[derive(Clone, Debug, Default)]
pub struct DomainParameterXref {
    parameters: BTreeMap<ParameterKey, ParameterOccurrences>,
    expansions: BTreeMap<OccurrenceId, Vec<Arc<SqmParameter>>>,
}

impl DomainParameterXref {
    /// Collect every parameter occurrence reachable from `statement`.
    /// Occurrences reachable through shared subtrees are recorded once.
    #[must_use]
    pub fn from_statement(statement: &SqmStatement) -> Self {
        let mut xref = Self::default();
        let mut seen = BTreeSet::new();

        statement.for_each_parameter(&mut |occurrence| {
            if !seen.insert(occurrence.id) {
                return;
            }

            if let Some(expanded) = occurrence.expansion_of {
                xref.expansions
                    .entry(expanded)
                    .or_default()
                    .push(Arc::clone(occurrence));
                return;
            }

            xref.parameters
                .entry(occurrence.key().clone())
                .or_insert_with(|| ParameterOccurrences {
                    parameter: Arc::clone(&occurrence.parameter),
                    occurrences: Vec::new(),
                })
                .occurrences
                .push(Arc::clone(occurrence));
        });

        xref
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterOccurrences> {
        self.parameters.values()
    }

    #[must_use]
    pub fn occurrences(&self, key: &ParameterKey) -> Option<&ParameterOccurrences> {
        self.parameters.get(key)
    }

    /// Expansions of `occurrence`, in creation order.
    #[must_use]
    pub fn expansions(&self, occurrence: OccurrenceId) -> &[Arc<SqmParameter>] {
        self.expansions
            .get(&occurrence)
            .map_or(&[], Vec::as_slice)
    }

    /// Total number of occurrences including expansions.
    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        let primary: usize = self.parameters.values().map(|p| p.occurrences.len()).sum();
        let expansions: usize = self.expansions.values().map(Vec::len).sum();

        primary + expansions
    }

    pub fn register_expansion(&mut self, expansion: Arc<SqmParameter>) -> Result<(), BindingError> {
        let foreign = || BindingError::ForeignExpansion {
            occurrence: expansion.id,
            parameter: expansion.key().to_string(),
        };
        let original = expansion.expansion_of.ok_or_else(foreign)?;

        let owned = self.parameters.get(expansion.key()).is_some_and(|entry| {
            entry
                .occurrences
                .iter()
                .any(|occurrence| occurrence.id == original)
        });
        if !owned {
            return Err(foreign());
        }

        self.expansions.entry(original).or_default().push(expansion);

        Ok(())
    }

    pub fn clear_expansions(&mut self) {
        self.expansions.clear();
    }

    /// Replace any previous expansions with `values - 1` expansions per
    /// occurrence of every multi-valued bind.
    pub fn expand_multi_valued(
        &mut self,
        bindings: &QueryParameterBindings,
        builder: &mut SqmNodeBuilder,
    ) -> Result<(), BindingError> {
        self.clear_expansions();

        let mut created = Vec::new();
        for entry in self.parameters.values() {
            let Some(binding) = bindings.binding(&entry.parameter.key) else {
                continue;
            };
            let BindValue::Multi(values) = &binding.value else {
                continue;
            };
            if values.is_empty() {
                return Err(BindingError::EmptyMultiValued {
                    parameter: entry.parameter.key.to_string(),
                });
            }

            for occurrence in &entry.occurrences {
                for _ in 1..values.len() {
                    created.push(builder.expansion_of(occurrence));
                }
            }
        }

        for expansion in created {
            self.register_expansion(expansion)?;
        }

        Ok(())
    }
}
