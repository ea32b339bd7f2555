//! Entity graph back to plain wire data.

use crate::entity::{Entity, FieldValue};
use crate::error::{json_kind, EntitizeError, EntitizeResult};
use crate::mapping::FieldKind;
use crate::registry::Registry;
use serde_json::{Map, Value};
use tracing::debug;

impl Entity {
    /// Projects the entity back onto its type's wire schema.
    ///
    /// The output has exactly one key per mapping, in a fresh value graph:
    /// - scalars are copied as-is, an unset scalar becomes `null`
    /// - one-to-many fields become arrays, an unset field becomes `[]`
    /// - one-to-one fields become the related object or `null`
    ///
    /// Unmapped fields are dropped. A cleared one-to-one relation is sent as
    /// `null`; there is no separate delete signal.
    pub fn dematerialize(&self, registry: &Registry) -> EntitizeResult<Value> {
        let entity_type = self.entity_type();
        let descriptor = registry.descriptor(entity_type)?;
        let mut out = Map::new();

        for mapping in &descriptor.mappings {
            let name = mapping.prop_name.as_str();
            let field = self.field(name);

            let value = match mapping.resolve(entity_type)? {
                FieldKind::Scalar => match field {
                    None => Value::Null,
                    Some(FieldValue::Scalar(v)) => v.clone(),
                    Some(other) => return Err(mismatch(entity_type, name, "value", other)),
                },
                FieldKind::OneToMany(_) => match field {
                    None | Some(FieldValue::Scalar(Value::Null)) => Value::Array(Vec::new()),
                    Some(FieldValue::Many(items)) => Value::Array(
                        items
                            .iter()
                            .map(|item| item.dematerialize(registry))
                            .collect::<EntitizeResult<Vec<_>>>()?,
                    ),
                    Some(other) => return Err(mismatch(entity_type, name, "entity list", other)),
                },
                FieldKind::OneToOne(_) => match field {
                    None | Some(FieldValue::One(None)) | Some(FieldValue::Scalar(Value::Null)) => {
                        Value::Null
                    }
                    Some(FieldValue::One(Some(related))) => related.dematerialize(registry)?,
                    Some(other) => return Err(mismatch(entity_type, name, "entity", other)),
                },
            };
            out.insert(name.to_string(), value);
        }

        debug!("Dematerialized {} entity ({} keys)", entity_type, out.len());
        Ok(Value::Object(out))
    }
}

fn mismatch(
    entity_type: &str,
    field: &str,
    expected: &'static str,
    found: &FieldValue,
) -> EntitizeError {
    EntitizeError::ShapeMismatch {
        entity_type: entity_type.to_string(),
        field: field.to_string(),
        expected,
        found: match found {
            FieldValue::Scalar(v) => json_kind(v),
            FieldValue::One(_) => "entity",
            FieldValue::Many(_) => "entity list",
        },
    }
}
