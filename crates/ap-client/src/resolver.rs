//! Project identity resolution
//!
//! Management endpoints are scoped by numeric project id, but hosts only
//! configure the public API key. The resolver looks the id up once against
//! the remote service and memoizes it for the lifetime of the client. There
//! is no TTL: if the remote mapping changes, the cached id stays stale until
//! process restart (known limitation).

use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use ap_core::config::ClientConfig;
use ap_core::error::{Error, Result};

use crate::models::Project;
use crate::transport::{HttpRequest, HttpTransport};

/// Lazily resolves and caches the project id bound to the configured API key
pub struct ProjectIdResolver {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    cached: Mutex<Option<i64>>,
}

impl ProjectIdResolver {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            transport,
            cached: Mutex::new(None),
        }
    }

    /// Resolve the project id, hitting the network at most on a cache miss
    ///
    /// Concurrent first calls may race and issue duplicate lookups; the
    /// lookup is a pure read keyed by a stable API key, so the duplicates are
    /// harmless and every winner writes the same value. The lock is never
    /// held across the network call. A failed resolution leaves the cache
    /// empty so the next call retries.
    pub async fn resolve(&self) -> Result<i64> {
        if let Some(id) = *self.cached.lock() {
            return Ok(id);
        }

        let api_key = self.config.api_key()?;

        let mut url = Url::parse(&format!("{}/api/public/projects/resolve", self.config.base_url))
            .map_err(|e| Error::Configuration(format!("invalid base URL: {}", e)))?;
        url.query_pairs_mut().append_pair("apiKey", api_key);

        let response = self
            .transport
            .execute(HttpRequest::get(String::from(url)))
            .await?;
        if response.status == 404 {
            return Err(Error::Resolution(format!(
                "remote service does not know API key '{}'",
                api_key
            )));
        }
        let response = response.error_for_status()?;

        let project: Option<Project> = response.json()?;
        let project = project.ok_or_else(|| {
            Error::Resolution(format!(
                "could not resolve a project id for API key '{}'",
                api_key
            ))
        })?;

        tracing::debug!(project_id = project.id, "resolved project id");
        *self.cached.lock() = Some(project.id);
        Ok(project.id)
    }
}
