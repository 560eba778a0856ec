use crate::{
    binding::{BindingError, DomainParameterXref},
    sql::{JdbcParameter, SlotId},
    sqm::{OccurrenceId, ParameterKey},
};
use std::collections::BTreeMap;

///
/// JdbcParameterLookup
///
/// Slot groups allocated for one occurrence while lowering.
///

pub trait JdbcParameterLookup {
    fn jdbc_params_for(&self, occurrence: OccurrenceId) -> Option<&[Vec<JdbcParameter>]>;
}

///
/// OccurrenceSlots
///
/// Slot groups of one occurrence, followed by those of its expansions in
/// expansion order. Expansions are addressed by position, not by their
/// occurrence id, so an index survives re-expansion to the same width.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct OccurrenceSlots {
    groups: Vec<Vec<JdbcParameter>>,
    expansions: Vec<Vec<Vec<JdbcParameter>>>,
}

impl OccurrenceSlots {
    fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.groups
            .iter()
            .chain(self.expansions.iter().flatten())
            .flatten()
            .map(|parameter| parameter.slot)
    }
}

///
/// JdbcParamsXref
///
/// Domain parameter -> occurrence -> slot groups. Expansion occurrences
/// are filed under the occurrence they expand.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JdbcParamsXref {
    params: BTreeMap<ParameterKey, BTreeMap<OccurrenceId, OccurrenceSlots>>,
}

impl JdbcParamsXref {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[must_use]
    pub fn groups(
        &self,
        key: &ParameterKey,
        occurrence: OccurrenceId,
    ) -> Option<&[Vec<JdbcParameter>]> {
        self.occurrence(key, occurrence)
            .map(|slots| slots.groups.as_slice())
    }

    /// Slot groups of the `position`th expansion of `occurrence`.
    #[must_use]
    pub fn expansion_groups(
        &self,
        key: &ParameterKey,
        occurrence: OccurrenceId,
        position: usize,
    ) -> Option<&[Vec<JdbcParameter>]> {
        self.occurrence(key, occurrence)
            .and_then(|slots| slots.expansions.get(position))
            .map(Vec::as_slice)
    }

    /// Number of expansions indexed for `occurrence`.
    #[must_use]
    pub fn expansion_count(&self, key: &ParameterKey, occurrence: OccurrenceId) -> usize {
        self.occurrence(key, occurrence)
            .map_or(0, |slots| slots.expansions.len())
    }

    /// Every slot referenced for `key`, in occurrence then column order.
    #[must_use]
    pub fn slots_for(&self, key: &ParameterKey) -> Vec<SlotId> {
        self.params
            .get(key)
            .into_iter()
            .flat_map(BTreeMap::values)
            .flat_map(OccurrenceSlots::slots)
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> {
        self.params.keys()
    }

    fn occurrence(&self, key: &ParameterKey, occurrence: OccurrenceId) -> Option<&OccurrenceSlots> {
        self.params
            .get(key)
            .and_then(|occurrences| occurrences.get(&occurrence))
    }
}

/// Index the slots of every occurrence and expansion in `xref`.
pub fn build_jdbc_index(
    xref: &DomainParameterXref,
    lookup: &dyn JdbcParameterLookup,
) -> Result<JdbcParamsXref, BindingError> {
    let mut index = JdbcParamsXref::default();
    if xref.is_empty() {
        return Ok(index);
    }

    for entry in xref.iter() {
        let key = &entry.parameter.key;
        let lookup_groups = |occurrence: OccurrenceId| {
            lookup
                .jdbc_params_for(occurrence)
                .map(<[Vec<JdbcParameter>]>::to_vec)
                .ok_or_else(|| BindingError::MissingSlots {
                    parameter: key.to_string(),
                    occurrence,
                })
        };

        for occurrence in &entry.occurrences {
            let slots = OccurrenceSlots {
                groups: lookup_groups(occurrence.id)?,
                expansions: xref
                    .expansions(occurrence.id)
                    .iter()
                    .map(|expansion| lookup_groups(expansion.id))
                    .collect::<Result<_, _>>()?,
            };

            index
                .params
                .entry(key.clone())
                .or_default()
                .insert(occurrence.id, slots);
        }
    }

    Ok(index)
}
