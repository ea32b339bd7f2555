//! HTTP save client.
//!
//! Posts the dematerialized entity as JSON to its type's update endpoint.

use crate::config::TransportConfig;
use crate::error::{TransportError, TransportResult};
use entitize_model::{Entity, Registry};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Sends entities to their registered update endpoints.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct SaveClient {
    config: TransportConfig,
    http: Client,
}

impl SaveClient {
    /// Creates a client with the configured timeout. A zero timeout is
    /// rejected since every request would fail immediately.
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        if config.timeout_secs == 0 {
            return Err(TransportError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Resolves an update endpoint against the configured base URL.
    pub fn resolve_endpoint(&self, endpoint: &str) -> TransportResult<Url> {
        let invalid = |reason: String| TransportError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Url::parse(endpoint).map_err(|e| invalid(e.to_string()));
        }

        let base = self
            .config
            .base_url
            .as_deref()
            .ok_or_else(|| invalid("relative endpoint and no base_url configured".to_string()))?;
        Url::parse(base)
            .and_then(|base| base.join(endpoint))
            .map_err(|e| invalid(e.to_string()))
    }

    /// URL the entity would be posted to.
    pub fn endpoint_for(&self, registry: &Registry, entity: &Entity) -> TransportResult<Url> {
        let endpoint = registry
            .update_endpoint(entity.entity_type())?
            .ok_or_else(|| TransportError::MissingEndpoint(entity.entity_type().to_string()))?;
        self.resolve_endpoint(endpoint)
    }

    /// Dematerializes `entity` and posts it in the background.
    ///
    /// Returns once the request is queued. The outcome is only logged:
    /// a non-2xx status or a transport failure never reaches the caller.
    /// Errors returned here are the ones found before anything is sent.
    /// The returned handle may be awaited or dropped.
    ///
    /// Needs a Tokio runtime to spawn on; without one it returns
    /// [`TransportError::NoRuntime`] and sends nothing.
    pub fn save(&self, registry: &Registry, entity: &Entity) -> TransportResult<JoinHandle<()>> {
        let runtime = Handle::try_current().map_err(|_| TransportError::NoRuntime)?;
        let (url, body) = self.prepare(registry, entity)?;
        let client = self.clone();
        let entity_type = entity.entity_type().to_string();

        Ok(runtime.spawn(async move {
            match client.post_json(url.clone(), body).await {
                Ok(response) => info!("Saved {} to {}: {}", entity_type, url, response),
                Err(e) => warn!("Failed to save {} to {}: {}", entity_type, url, e),
            }
        }))
    }

    /// Like [`SaveClient::save`] but waits for the response and returns it.
    pub async fn send(&self, registry: &Registry, entity: &Entity) -> TransportResult<String> {
        let (url, body) = self.prepare(registry, entity)?;
        self.post_json(url, body).await
    }

    /// Posts a JSON body, retrying transport errors and 5xx responses up to
    /// `max_retries` times. Returns the response body on 2xx.
    pub async fn post_json(&self, url: Url, body: String) -> TransportResult<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.post_once(url.clone(), body.clone()).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt <= self.config.max_retries => {
                    debug!("Attempt {} to {} failed, retrying: {}", attempt, url, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn post_once(&self, url: Url, body: String) -> TransportResult<String> {
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    fn prepare(&self, registry: &Registry, entity: &Entity) -> TransportResult<(Url, String)> {
        let payload = entity.dematerialize(registry)?;
        let url = self.endpoint_for(registry, entity)?;
        let body = serde_json::to_string(&payload)?;
        debug!("Prepared {} payload ({} bytes) for {}", entity.entity_type(), body.len(), url);
        Ok((url, body))
    }
}
