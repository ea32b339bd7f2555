//! Save transport for Entitize.
//!
//! [`SaveClient::save`] dematerializes an entity, serializes it to JSON and
//! posts it to the update endpoint registered for its type, with
//! `Content-Type: application/json`. It is fire-and-forget: the response is
//! logged, failures are logged, nothing is surfaced to the caller.
//! [`SaveClient::send`] is the awaited variant for callers that want the
//! response.

mod client;
mod config;
mod error;

pub use client::SaveClient;
pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
