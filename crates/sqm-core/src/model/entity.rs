use crate::{
    model::{ForeignKeyMapping, IdentifierMapping, Mapping, MappingError, NavigablePath},
    sql::TableGroupLocator,
    types::{Expressible, TypeCatalog},
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::trace;

///
/// AttributeMapping
///

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeMapping {
    pub name: String,
    pub mapping: Mapping,
    pub columns: Vec<String>,
}

impl AttributeMapping {
    pub fn new<I, S>(name: impl Into<String>, mapping: Mapping, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            mapping,
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// To-one association onto `target`, stored in the given key columns.
    pub fn to_one<I, S>(name: impl Into<String>, target: &EntityMapping, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let mapping = Mapping::ForeignKey(Arc::new(ForeignKeyMapping {
            association: name.clone(),
            target_entity: target.name.clone(),
            key: target.identifier.mapping.clone(),
        }));

        Self::new(name, mapping, columns)
    }
}

///
/// EntityMapping
///

#[derive(Clone, Debug, PartialEq)]
pub struct EntityMapping {
    pub name: String,
    pub table: String,
    pub identifier: AttributeMapping,
    pub attributes: Vec<AttributeMapping>,
}

impl EntityMapping {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        identifier: AttributeMapping,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            identifier,
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeMapping) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeMapping> {
        if self.identifier.name == name {
            return Some(&self.identifier);
        }

        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Mapping of a reference to the entity itself.
    #[must_use]
    pub fn entity_valued_mapping(&self) -> Mapping {
        Mapping::EntityIdentifier(Arc::new(IdentifierMapping {
            entity: self.name.clone(),
            attribute: self.identifier.name.clone(),
            mapping: self.identifier.mapping.clone(),
        }))
    }
}

///
/// ResolvedPath
///
/// A navigation path resolved to the columns it reads through a table
/// group, qualified by that group's identification variable.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPath {
    pub qualifier: String,
    pub columns: Vec<String>,
    pub mapping: Mapping,
}

///
/// DomainModel
///
/// Entity mappings plus the type catalog. This is the runtime metamodel
/// lowering and binding resolve relational shapes against.
///

#[derive(Clone, Debug)]
pub struct DomainModel {
    catalog: Arc<TypeCatalog>,
    entities: BTreeMap<String, EntityMapping>,
}

impl DomainModel {
    #[must_use]
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            entities: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_entity(mut self, entity: EntityMapping) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<TypeCatalog> {
        &self.catalog
    }

    pub fn entity(&self, name: &str) -> Result<&EntityMapping, MappingError> {
        self.entities.get(name).ok_or_else(|| MappingError::UnknownEntity {
            entity: name.to_string(),
        })
    }

    /// Relational mapping for an expressible type.
    ///
    /// Paths resolve through the table group registered for their root;
    /// bare value kinds fall back to the catalog's standard type and yield
    /// `None` when the catalog has none.
    pub fn resolve_mapping(
        &self,
        expressible: &Expressible,
        locator: &dyn TableGroupLocator,
    ) -> Result<Option<Mapping>, MappingError> {
        match expressible {
            Expressible::Basic(_) | Expressible::Mapped(_) => Ok(expressible.as_mapping()),
            Expressible::Domain(kind) => Ok(self
                .catalog
                .standard_basic_type_for(*kind)
                .map(Mapping::Basic)),
            Expressible::Path(source) => self
                .resolve_path(&source.path, locator)
                .map(|resolved| Some(resolved.mapping)),
        }
    }

    /// Resolve a path to its columns through the nearest enclosing table
    /// group, descending into embedded components segment by segment.
    pub fn resolve_path(
        &self,
        path: &NavigablePath,
        locator: &dyn TableGroupLocator,
    ) -> Result<ResolvedPath, MappingError> {
        let unresolved = || MappingError::UnresolvedPath {
            path: path.to_string(),
        };

        let mut segments = Vec::new();
        let mut current = path.clone();
        let group = loop {
            if let Some(group) = locator.find_table_group(&current) {
                break group;
            }
            segments.push(current.local_name().to_string());
            current = current.parent().ok_or_else(unresolved)?;
        };
        segments.reverse();

        let qualifier = group.identification_variable().to_string();
        let Some((first, rest)) = segments.split_first() else {
            let (mapping, columns) = group.root_mapping(self)?;
            return Ok(ResolvedPath {
                qualifier,
                columns,
                mapping,
            });
        };

        let (mut mapping, mut columns) = group.attribute(self, first)?;
        for segment in rest {
            let Mapping::Embedded(embedded) = &mapping else {
                return Err(unresolved());
            };
            let (offset, component) = embedded.component(segment).ok_or_else(unresolved)?;
            let span = component.jdbc_type_count();
            let component = component.clone();
            columns = columns
                .get(offset..offset + span)
                .ok_or_else(unresolved)?
                .to_vec();
            mapping = component;
        }
        trace!(path = %path, qualifier = %qualifier, columns = columns.len(), "resolved navigable path");

        Ok(ResolvedPath {
            qualifier,
            columns,
            mapping,
        })
    }
}
