use crate::behavior::{Behavior, BehaviorHandle};
use crate::error::{EntitizeError, EntitizeResult};
use crate::mapping::{EntityTypeDescriptor, FieldMapping};
use crate::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A type registration that carries code: descriptor plus shared methods.
#[derive(Debug, Clone)]
pub struct TypeBundle {
    pub descriptor: EntityTypeDescriptor,
    pub behavior: Behavior,
}

impl TypeBundle {
    pub fn new(entity_type: &str, mappings: Vec<FieldMapping>) -> Self {
        Self {
            descriptor: EntityTypeDescriptor::new(entity_type, mappings),
            behavior: Behavior::new(),
        }
    }

    pub fn update_endpoint(mut self, endpoint: &str) -> Self {
        self.descriptor.update_endpoint = Some(endpoint.into());
        self
    }

    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Entity, &[Value]) -> EntitizeResult<Value> + Send + Sync + 'static,
    {
        self.behavior.insert(name, f);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior.merge(behavior);
        self
    }
}

impl From<EntityTypeDescriptor> for TypeBundle {
    fn from(descriptor: EntityTypeDescriptor) -> Self {
        Self {
            descriptor,
            behavior: Behavior::new(),
        }
    }
}

/// Registry configuration as loaded from JSON.
///
/// `types` holds full descriptors (`type`, `updateEndpoint`, `mappings`);
/// `mappings` is the batch form, type name to mapping list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    #[serde(default)]
    pub types: Vec<EntityTypeDescriptor>,
    #[serde(default)]
    pub mappings: BTreeMap<String, Vec<FieldMapping>>,
}

#[derive(Debug)]
struct RegisteredType {
    descriptor: EntityTypeDescriptor,
    behavior: BehaviorHandle,
}

/// Process-wide table from type name to mapping list and shared behavior.
///
/// Registration takes `&mut self`; extension only touches the shared
/// behavior tables and takes `&self`. Every mutating call validates its
/// whole input first and leaves the registry untouched on error.
#[derive(Debug, Default)]
pub struct Registry {
    types: HashMap<String, RegisteredType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from loaded settings.
    pub fn from_settings(settings: RegistrySettings) -> EntitizeResult<Self> {
        let mut registry = Self::new();
        registry.apply_settings(settings)?;
        Ok(registry)
    }

    /// Registers every type named in `settings`. Descriptors carry no code,
    /// so existing behavior of re-registered types is kept.
    pub fn apply_settings(&mut self, settings: RegistrySettings) -> EntitizeResult<()> {
        let mut descriptors = settings.types;
        // a batch entry for a type also listed under `types` keeps that endpoint
        let batch: Vec<EntityTypeDescriptor> = settings
            .mappings
            .into_iter()
            .map(|(name, mappings)| {
                let listed = descriptors
                    .iter()
                    .rev()
                    .find(|d| d.entity_type == name)
                    .map(|d| d.update_endpoint.clone());
                let mut descriptor = self.batch_descriptor(name, mappings);
                if let Some(endpoint) = listed {
                    descriptor.update_endpoint = endpoint;
                }
                descriptor
            })
            .collect();
        descriptors.extend(batch);
        for descriptor in &descriptors {
            descriptor.validate()?;
        }
        for descriptor in descriptors {
            self.install(descriptor, None);
        }
        Ok(())
    }

    /// Adds or replaces a type together with its shared behavior.
    ///
    /// If the type already exists its behavior table is replaced in place,
    /// so entities materialized earlier resolve methods against the new table.
    pub fn register(&mut self, bundle: impl Into<TypeBundle>) -> EntitizeResult<()> {
        let TypeBundle {
            descriptor,
            behavior,
        } = bundle.into();
        descriptor.validate()?;
        self.install(descriptor, Some(behavior));
        Ok(())
    }

    /// Batch registration of `{typeName: mappingList}` pairs with no behavior.
    ///
    /// Only the mapping lists are replaced. Existing types keep their update
    /// endpoint and behavior; new types start with an empty behavior table,
    /// to be filled later through [`Registry::extend`].
    pub fn register_mappings<I>(&mut self, batch: I) -> EntitizeResult<()>
    where
        I: IntoIterator<Item = (String, Vec<FieldMapping>)>,
    {
        let descriptors: Vec<EntityTypeDescriptor> = batch
            .into_iter()
            .map(|(name, mappings)| self.batch_descriptor(name, mappings))
            .collect();
        for descriptor in &descriptors {
            descriptor.validate()?;
        }
        for descriptor in descriptors {
            self.install(descriptor, None);
        }
        Ok(())
    }

    /// Merges `behavior` into the shared behavior of `entity_type`.
    ///
    /// Visible immediately on all existing and future entities of the type.
    /// Fails with [`EntitizeError::UnknownType`] if the type is not registered.
    pub fn extend(&self, entity_type: &str, behavior: Behavior) -> EntitizeResult<()> {
        let (_, handle) = self.entry(entity_type)?;
        debug!(
            "Extending {} with methods {:?}",
            entity_type,
            behavior.names()
        );
        handle.merge(behavior);
        Ok(())
    }

    pub fn descriptor(&self, entity_type: &str) -> EntitizeResult<&EntityTypeDescriptor> {
        Ok(self.entry(entity_type)?.0)
    }

    /// Live handle to the type's shared behavior.
    pub fn behavior(&self, entity_type: &str) -> EntitizeResult<BehaviorHandle> {
        Ok(self.entry(entity_type)?.1.clone())
    }

    pub fn update_endpoint(&self, entity_type: &str) -> EntitizeResult<Option<&str>> {
        Ok(self.descriptor(entity_type)?.update_endpoint.as_deref())
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.types.contains_key(entity_type)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub(crate) fn entry(
        &self,
        entity_type: &str,
    ) -> EntitizeResult<(&EntityTypeDescriptor, &BehaviorHandle)> {
        self.types
            .get(entity_type)
            .map(|t| (&t.descriptor, &t.behavior))
            .ok_or_else(|| EntitizeError::UnknownType(entity_type.to_string()))
    }

    fn batch_descriptor(&self, name: String, mappings: Vec<FieldMapping>) -> EntityTypeDescriptor {
        let update_endpoint = self
            .types
            .get(&name)
            .and_then(|t| t.descriptor.update_endpoint.clone());
        EntityTypeDescriptor {
            entity_type: name,
            update_endpoint,
            mappings,
        }
    }

    fn install(&mut self, descriptor: EntityTypeDescriptor, behavior: Option<Behavior>) {
        info!(
            "Registered entity type {} ({} mappings)",
            descriptor.entity_type,
            descriptor.mappings.len()
        );
        match self.types.get_mut(&descriptor.entity_type) {
            Some(existing) => {
                if let Some(behavior) = behavior {
                    existing.behavior.replace(behavior);
                }
                existing.descriptor = descriptor;
            }
            None => {
                let name = descriptor.entity_type.clone();
                let behavior = BehaviorHandle::new(behavior.unwrap_or_default());
                self.types.insert(
                    name,
                    RegisteredType {
                        descriptor,
                        behavior,
                    },
                );
            }
        }
    }
}
