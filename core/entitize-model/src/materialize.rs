//! Plain object to entity graph.

use crate::entity::{Entity, FieldValue};
use crate::error::{EntitizeError, EntitizeResult};
use crate::mapping::FieldKind;
use crate::registry::Registry;
use serde_json::Value;
use tracing::debug;

/// Field name used in shape errors about the object passed in itself.
const ROOT_FIELD: &str = "(root)";

impl Registry {
    /// Converts a plain JSON object into an entity of `entity_type`,
    /// materializing related objects against their child types.
    ///
    /// Mapped fields are applied in declared order. Every remaining key of
    /// `plain` is then copied as a raw value. Keys named by a mapping are
    /// never overwritten by that copy, so navigation fields always hold
    /// entities.
    ///
    /// Does not touch the registry. On error nothing is returned and no
    /// partial graph escapes.
    pub fn materialize(&self, plain: &Value, entity_type: &str) -> EntitizeResult<Entity> {
        let (descriptor, behavior) = self.entry(entity_type)?;
        let source = plain
            .as_object()
            .ok_or_else(|| EntitizeError::shape(entity_type, ROOT_FIELD, "object", plain))?;

        let mut entity = Entity::new(entity_type, behavior.clone());

        for mapping in &descriptor.mappings {
            let name = mapping.prop_name.as_str();
            let value = source.get(name);

            match mapping.resolve(entity_type)? {
                FieldKind::Scalar => {
                    // absent stays unset
                    if let Some(v) = value {
                        entity.insert(name, FieldValue::Scalar(v.clone()));
                    }
                }
                FieldKind::OneToMany(child) => {
                    let items = match value {
                        None | Some(Value::Null) => Vec::new(),
                        Some(Value::Array(items)) => items
                            .iter()
                            .enumerate()
                            .map(|(i, item)| {
                                let field = format!("{name}[{i}]");
                                self.materialize_related(item, child, entity_type, &field)
                            })
                            .collect::<EntitizeResult<Vec<_>>>()?,
                        Some(other) => {
                            return Err(EntitizeError::shape(entity_type, name, "array", other));
                        }
                    };
                    entity.insert(name, FieldValue::Many(items));
                }
                FieldKind::OneToOne(child) => {
                    let related = match value {
                        None | Some(Value::Null) => None,
                        Some(item) => Some(Box::new(
                            self.materialize_related(item, child, entity_type, name)?,
                        )),
                    };
                    entity.insert(name, FieldValue::One(related));
                }
            }
        }

        for (name, value) in source {
            if !descriptor.is_mapped(name) {
                entity.insert(name, FieldValue::Scalar(value.clone()));
            }
        }

        debug!(
            "Materialized {} entity with {} fields",
            entity_type,
            entity.len()
        );
        Ok(entity)
    }

    fn materialize_related(
        &self,
        item: &Value,
        child_type: &str,
        parent_type: &str,
        field: &str,
    ) -> EntitizeResult<Entity> {
        if !item.is_object() {
            return Err(EntitizeError::shape(parent_type, field, "object", item));
        }
        self.materialize(item, child_type)
    }
}
