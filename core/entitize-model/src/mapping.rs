use crate::error::{EntitizeError, EntitizeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Describes one property of an entity type.
///
/// The wire/config shape matches the mapping lists written by hand in
/// client code: `{"propType": "int", "propName": "ID"}` for a scalar,
/// `{"propName": "Filter", "nav": true, "relationship": "one-to-one", "childType": "Filter"}`
/// for a navigation property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Declared type of the property. Informational only, never enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop_type: Option<String>,
    /// Key on both the plain object and the entity.
    pub prop_name: String,
    /// True if the property refers to related entities rather than a value.
    #[serde(default, skip_serializing_if = "is_false")]
    pub nav: bool,
    /// Only meaningful when `nav` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Relationship>,
    /// Registered type used to materialize the related object(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_type: Option<String>,
    /// Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Cardinality of a navigation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relationship {
    #[serde(rename = "one-to-one")]
    OneToOne,
    #[serde(rename = "one-to-many")]
    OneToMany,
}

/// A mapping resolved to what the materializer actually does with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind<'a> {
    Scalar,
    OneToOne(&'a str),
    OneToMany(&'a str),
}

impl FieldMapping {
    /// Shorthand for a scalar (non-navigation) property.
    pub fn scalar(prop_name: &str) -> Self {
        Self {
            prop_type: None,
            prop_name: prop_name.into(),
            nav: false,
            relationship: None,
            child_type: None,
            foreign_key: None,
        }
    }

    /// Shorthand for a navigation property holding at most one related entity.
    pub fn one_to_one(prop_name: &str, child_type: &str) -> Self {
        Self::navigation(prop_name, Relationship::OneToOne, child_type)
    }

    /// Shorthand for a navigation property holding a sequence of related entities.
    pub fn one_to_many(prop_name: &str, child_type: &str) -> Self {
        Self::navigation(prop_name, Relationship::OneToMany, child_type)
    }

    fn navigation(prop_name: &str, relationship: Relationship, child_type: &str) -> Self {
        Self {
            prop_type: Some(child_type.into()),
            prop_name: prop_name.into(),
            nav: true,
            relationship: Some(relationship),
            child_type: Some(child_type.into()),
            foreign_key: None,
        }
    }

    /// Sets the informational `propType`.
    pub fn with_prop_type(mut self, prop_type: &str) -> Self {
        self.prop_type = Some(prop_type.into());
        self
    }

    /// Sets the informational `foreignKey`.
    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = Some(foreign_key.into());
        self
    }

    /// Resolves the mapping, or returns the reason it is malformed.
    pub fn kind(&self) -> Result<FieldKind<'_>, &'static str> {
        if !self.nav {
            return Ok(FieldKind::Scalar);
        }
        let child = self
            .child_type
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or("navigation property without childType")?;
        match self.relationship {
            Some(Relationship::OneToOne) => Ok(FieldKind::OneToOne(child)),
            Some(Relationship::OneToMany) => Ok(FieldKind::OneToMany(child)),
            None => Err("navigation property without relationship"),
        }
    }

    pub(crate) fn resolve(&self, entity_type: &str) -> EntitizeResult<FieldKind<'_>> {
        self.kind().map_err(|reason| EntitizeError::InvalidMapping {
            entity_type: entity_type.to_string(),
            field: self.prop_name.clone(),
            reason: reason.to_string(),
        })
    }
}

/// A registered type's name, ordered mapping list and update endpoint.
///
/// Shared behavior lives next to the descriptor in the registry, not in it,
/// so descriptors stay plain data that can be loaded from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypeDescriptor {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(alias = "updateUrl")]
    pub update_endpoint: Option<String>,
    pub mappings: Vec<FieldMapping>,
}

impl EntityTypeDescriptor {
    pub fn new(entity_type: &str, mappings: Vec<FieldMapping>) -> Self {
        Self {
            entity_type: entity_type.into(),
            update_endpoint: None,
            mappings,
        }
    }

    pub fn with_update_endpoint(mut self, endpoint: &str) -> Self {
        self.update_endpoint = Some(endpoint.into());
        self
    }

    /// Returns the mapping for `prop_name`, if the type declares one.
    pub fn mapping(&self, prop_name: &str) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.prop_name == prop_name)
    }

    pub fn is_mapped(&self, prop_name: &str) -> bool {
        self.mapping(prop_name).is_some()
    }

    /// Checks names and navigation metadata. Child types are not required
    /// to be registered yet; they are looked up at materialization time.
    pub fn validate(&self) -> EntitizeResult<()> {
        if self.entity_type.is_empty() {
            return Err(EntitizeError::InvalidMapping {
                entity_type: String::new(),
                field: String::new(),
                reason: "empty type name".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for mapping in &self.mappings {
            let invalid = |reason: &str| EntitizeError::InvalidMapping {
                entity_type: self.entity_type.clone(),
                field: mapping.prop_name.clone(),
                reason: reason.to_string(),
            };
            if mapping.prop_name.is_empty() {
                return Err(invalid("empty propName"));
            }
            if !seen.insert(mapping.prop_name.as_str()) {
                return Err(invalid("duplicate propName"));
            }
            mapping.resolve(&self.entity_type)?;
        }
        Ok(())
    }
}
