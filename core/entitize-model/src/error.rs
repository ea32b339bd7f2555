//! Error types for the entity model.

use thiserror::Error;

/// Result type for registry, materialize and dematerialize operations.
pub type EntitizeResult<T> = Result<T, EntitizeError>;

/// Errors raised by the entity model.
///
/// None of these are retried. A failed call leaves the registry exactly as
/// it was before the call.
#[derive(Debug, Error)]
pub enum EntitizeError {
    /// The type name is not registered.
    #[error("unknown entity type: {0}")]
    UnknownType(String),

    /// A source value does not have the shape its mapping requires.
    #[error("shape mismatch on {entity_type}.{field}: expected {expected}, found {found}")]
    ShapeMismatch {
        entity_type: String,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A mapping list was rejected at registration.
    #[error("invalid mapping {entity_type}.{field}: {reason}")]
    InvalidMapping {
        entity_type: String,
        field: String,
        reason: String,
    },

    /// No shared method with this name exists for the entity's type.
    #[error("entity type '{entity_type}' has no method '{method}'")]
    MethodNotFound { entity_type: String, method: String },

    /// A shared method returned an error.
    #[error("method '{method}' failed: {message}")]
    Method { method: String, message: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EntitizeError {
    /// Returns true if this is a registry lookup failure.
    pub fn is_lookup(&self) -> bool {
        matches!(self, EntitizeError::UnknownType(_))
    }

    /// Returns true if a source value had the wrong shape.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, EntitizeError::ShapeMismatch { .. })
    }

    pub(crate) fn shape(
        entity_type: &str,
        field: &str,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        EntitizeError::ShapeMismatch {
            entity_type: entity_type.to_string(),
            field: field.to_string(),
            expected,
            found: json_kind(value),
        }
    }
}

/// Short name of a JSON value's kind, used in shape mismatch messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
