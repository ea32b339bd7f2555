use crate::behavior::BehaviorHandle;
use crate::error::{EntitizeError, EntitizeResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Key under which the type name appears in an entity's full JSON view.
pub const ENTITY_TYPE_KEY: &str = "entityType";

/// A materialized object: data plus the shared behavior of its type.
///
/// Fields hold either a plain JSON value or related entities. The behavior
/// handle is shared with the registry, so calls through [`Entity::call`]
/// always see the type's current method table.
#[derive(Debug, Clone)]
pub struct Entity {
    entity_type: String,
    fields: BTreeMap<String, FieldValue>,
    behavior: BehaviorHandle,
}

/// The value stored under one entity field.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A value copied from the plain object, mapped or not.
    Scalar(Value),
    /// A one-to-one navigation property; `None` is the absent related entity.
    One(Option<Box<Entity>>),
    /// A one-to-many navigation property, in source order.
    Many(Vec<Entity>),
}

impl PartialEq for Entity {
    /// Compares type and data. Behavior is attached by type, not by value.
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type && self.fields == other.fields
    }
}

impl Entity {
    pub(crate) fn new(entity_type: &str, behavior: BehaviorHandle) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            fields: BTreeMap::new(),
            behavior,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn behavior(&self) -> &BehaviorHandle {
        &self.behavior
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Names of all set fields, sorted.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns a scalar field. Navigation fields are reached through
    /// [`Entity::related`] and [`Entity::related_many`].
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name) {
            Some(FieldValue::Scalar(v)) => Some(v),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_i64())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    /// Sets a scalar field, replacing whatever was there.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields
            .insert(name.to_string(), FieldValue::Scalar(value.into()));
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// The related entity of a one-to-one field, if present.
    pub fn related(&self, name: &str) -> Option<&Entity> {
        match self.fields.get(name) {
            Some(FieldValue::One(Some(e))) => Some(e),
            _ => None,
        }
    }

    pub fn related_mut(&mut self, name: &str) -> Option<&mut Entity> {
        match self.fields.get_mut(name) {
            Some(FieldValue::One(Some(e))) => Some(e),
            _ => None,
        }
    }

    /// The related entities of a one-to-many field; empty if unset.
    pub fn related_many(&self, name: &str) -> &[Entity] {
        match self.fields.get(name) {
            Some(FieldValue::Many(items)) => items,
            _ => &[],
        }
    }

    pub fn related_many_mut(&mut self, name: &str) -> Option<&mut Vec<Entity>> {
        match self.fields.get_mut(name) {
            Some(FieldValue::Many(items)) => Some(items),
            _ => None,
        }
    }

    /// Sets or clears a one-to-one field.
    pub fn set_related(&mut self, name: &str, related: Option<Entity>) {
        self.fields
            .insert(name.to_string(), FieldValue::One(related.map(Box::new)));
    }

    /// Clears a one-to-one field. Saved as `null`.
    pub fn clear_related(&mut self, name: &str) {
        self.set_related(name, None);
    }

    /// Appends to a one-to-many field, turning any other value into a sequence.
    pub fn push_related(&mut self, name: &str, related: Entity) {
        match self.fields.get_mut(name) {
            Some(FieldValue::Many(items)) => items.push(related),
            _ => {
                self.fields
                    .insert(name.to_string(), FieldValue::Many(vec![related]));
            }
        }
    }

    pub(crate) fn insert(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// True if the type currently has a shared method named `method`.
    pub fn responds_to(&self, method: &str) -> bool {
        self.behavior.contains(method)
    }

    /// Calls a shared method of this entity's type.
    pub fn call(&self, method: &str, args: &[Value]) -> EntitizeResult<Value> {
        let f = self
            .behavior
            .lookup(method)
            .ok_or_else(|| EntitizeError::MethodNotFound {
                entity_type: self.entity_type.clone(),
                method: method.to_string(),
            })?;
        f(self, args)
    }

    /// Full JSON view of the entity: the type tag plus every field,
    /// including unmapped ones. This is for display, not for the wire;
    /// use [`Entity::dematerialize`] for that.
    pub fn to_value(&self) -> EntitizeResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(ENTITY_TYPE_KEY, &self.entity_type)?;
        for (name, value) in &self.fields {
            if name != ENTITY_TYPE_KEY {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}
