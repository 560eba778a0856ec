use crate::{
    model::{DomainModel, Mapping, MappingError, NavigablePath},
    sql::SqlExpr,
};
use std::collections::BTreeSet;

///
/// TableGroupLocator
///
/// Lookup of the table group registered for a navigation path. The from
/// clause built during lowering is the usual implementation.
///

pub trait TableGroupLocator {
    fn find_table_group(&self, path: &NavigablePath) -> Option<&TableGroup>;
}

///
/// TableReference
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableReference {
    pub table: String,
    pub identification_variable: String,
}

///
/// ValuesTableReference
///
/// Inline `VALUES` rows used as a table source.
///

#[derive(Clone, Debug)]
pub struct ValuesTableReference {
    pub rows: Vec<Vec<SqlExpr>>,
    pub identification_variable: String,
    pub column_names: Vec<String>,
}

///
/// TableReferenceRef
///

#[derive(Clone, Copy, Debug)]
pub enum TableReferenceRef<'a> {
    Table(&'a TableReference),
    Values(&'a ValuesTableReference),
}

///
/// TableGroup
///

#[derive(Clone, Debug)]
pub enum TableGroup {
    Standard(StandardTableGroup),
    Values(ValuesTableGroup),
}

impl TableGroup {
    #[must_use]
    pub const fn navigable_path(&self) -> &NavigablePath {
        match self {
            Self::Standard(group) => &group.path,
            Self::Values(group) => &group.path,
        }
    }

    #[must_use]
    pub fn identification_variable(&self) -> &str {
        match self {
            Self::Standard(group) => &group.primary.identification_variable,
            Self::Values(group) => &group.reference.identification_variable,
        }
    }

    /// Find the table reference that produces `table_expression`, searching
    /// this group and then its joins.
    #[must_use]
    pub fn table_reference(&self, table_expression: &str) -> Option<TableReferenceRef<'_>> {
        match self {
            Self::Standard(group) => (group.primary.table == table_expression
                || group.primary.identification_variable == table_expression)
                .then_some(TableReferenceRef::Table(&group.primary)),
            Self::Values(group) => group.table_reference(table_expression),
        }
    }

    /// Physical tables this group reads.
    pub fn apply_affected_table_names(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Standard(group) => {
                out.insert(group.primary.table.clone());
            }
            // Inline rows touch no tables.
            Self::Values(_) => {}
        }
    }

    fn find(&self, path: &NavigablePath) -> Option<&Self> {
        if self.navigable_path() == path {
            return Some(self);
        }

        match self {
            Self::Standard(_) => None,
            Self::Values(group) => group
                .nested_joins
                .iter()
                .chain(&group.joins)
                .find_map(|join| join.find(path)),
        }
    }

    /// Mapping and columns of a reference to the group's root itself.
    pub(crate) fn root_mapping(
        &self,
        model: &DomainModel,
    ) -> Result<(Mapping, Vec<String>), MappingError> {
        match self {
            Self::Standard(group) => {
                let entity = model.entity(&group.entity)?;
                Ok((
                    entity.entity_valued_mapping(),
                    entity.identifier.columns.clone(),
                ))
            }
            Self::Values(group) => Err(MappingError::UnresolvedPath {
                path: group.path.to_string(),
            }),
        }
    }

    /// Mapping and columns of a direct attribute of the group's root.
    pub(crate) fn attribute(
        &self,
        model: &DomainModel,
        name: &str,
    ) -> Result<(Mapping, Vec<String>), MappingError> {
        match self {
            Self::Standard(group) => {
                let entity = model.entity(&group.entity)?;
                let attribute =
                    entity
                        .attribute(name)
                        .ok_or_else(|| MappingError::UnknownAttribute {
                            entity: entity.name.clone(),
                            attribute: name.to_string(),
                        })?;

                Ok((attribute.mapping.clone(), attribute.columns.clone()))
            }
            Self::Values(group) => {
                let unresolved = || MappingError::UnresolvedPath {
                    path: group.path.append(name).to_string(),
                };
                let index = group
                    .reference
                    .column_names
                    .iter()
                    .position(|column| column == name)
                    .ok_or_else(unresolved)?;
                let mapping = group
                    .column_mappings
                    .get(index)
                    .cloned()
                    .flatten()
                    .ok_or_else(unresolved)?;
                if mapping.jdbc_type_count() != 1 {
                    return Err(MappingError::MultiColumnValues {
                        column: name.to_string(),
                        mapping: mapping.to_string(),
                    });
                }

                Ok((mapping, vec![name.to_string()]))
            }
        }
    }
}

///
/// StandardTableGroup
///
/// Entity root backed by its primary table.
///

#[derive(Clone, Debug)]
pub struct StandardTableGroup {
    pub path: NavigablePath,
    pub entity: String,
    pub primary: TableReference,
}

///
/// ValuesTableGroup
///
/// Table group over inline rows. Column mappings are the types chosen for
/// each column across all rows; a column whose type could not be resolved
/// cannot be navigated to.
///

#[derive(Clone, Debug)]
pub struct ValuesTableGroup {
    pub path: NavigablePath,
    pub reference: ValuesTableReference,
    pub column_mappings: Vec<Option<Mapping>>,
    nested_joins: Vec<TableGroup>,
    joins: Vec<TableGroup>,
}

impl ValuesTableGroup {
    #[must_use]
    pub const fn new(
        path: NavigablePath,
        reference: ValuesTableReference,
        column_mappings: Vec<Option<Mapping>>,
    ) -> Self {
        Self {
            path,
            reference,
            column_mappings,
            nested_joins: Vec::new(),
            joins: Vec::new(),
        }
    }

    pub fn add_nested_join(&mut self, group: TableGroup) {
        self.nested_joins.push(group);
    }

    pub fn add_join(&mut self, group: TableGroup) {
        self.joins.push(group);
    }

    #[must_use]
    pub fn nested_joins(&self) -> &[TableGroup] {
        &self.nested_joins
    }

    #[must_use]
    pub fn joins(&self) -> &[TableGroup] {
        &self.joins
    }

    /// Own producer first, then nested joins, then joins.
    #[must_use]
    pub fn table_reference(&self, table_expression: &str) -> Option<TableReferenceRef<'_>> {
        if self.reference.identification_variable == table_expression {
            return Some(TableReferenceRef::Values(&self.reference));
        }

        self.nested_joins
            .iter()
            .chain(&self.joins)
            .find_map(|join| join.table_reference(table_expression))
    }
}

///
/// FromClause
///

#[derive(Clone, Debug, Default)]
pub struct FromClause {
    roots: Vec<TableGroup>,
}

impl FromClause {
    pub fn add_root(&mut self, group: TableGroup) {
        self.roots.push(group);
    }

    #[must_use]
    pub fn roots(&self) -> &[TableGroup] {
        &self.roots
    }

    #[must_use]
    pub fn affected_table_names(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for root in &self.roots {
            root.apply_affected_table_names(&mut out);
        }

        out
    }
}

impl TableGroupLocator for FromClause {
    fn find_table_group(&self, path: &NavigablePath) -> Option<&TableGroup> {
        self.roots.iter().find_map(|root| root.find(path))
    }
}
