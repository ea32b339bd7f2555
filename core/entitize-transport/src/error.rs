//! Transport error types.

use entitize_model::EntitizeError;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur while saving an entity.
///
/// [`SaveClient::save`](crate::SaveClient::save) only returns the pre-flight
/// kinds (`NoRuntime`, `Model`, `MissingEndpoint`, `InvalidEndpoint`,
/// `Serialization`).
/// `Http` and `Status` come from the request itself and are logged by the
/// background task; they are returned only by the awaited
/// [`SaveClient::send`](crate::SaveClient::send).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The entity could not be dematerialized.
    #[error("model error: {0}")]
    Model(#[from] EntitizeError),

    /// The entity's type has no update endpoint.
    #[error("entity type '{0}' has no update endpoint")]
    MissingEndpoint(String),

    /// The update endpoint could not be turned into a URL.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// `save` was called outside a Tokio runtime.
    #[error("no Tokio runtime to run the save request on")]
    NoRuntime,

    /// Invalid transport configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transport failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Returns true for failures worth another attempt: transport errors
    /// and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(_) => true,
            TransportError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
