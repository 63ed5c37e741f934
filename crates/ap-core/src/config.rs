//! Client configuration
//!
//! Holds the remote service coordinates and project credentials. The config
//! is built once by the host application and shared, immutable, between the
//! clients and the authorization middleware.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Base URL of the hosted auth-platform instance.
pub const DEFAULT_BASE_URL: &str = "https://auth-service-platform.onrender.com";

/// Configuration for all auth-platform clients.
///
/// `base_url` always has a value (defaulting to the hosted instance);
/// `api_key` and `project_secret` have no defaults and must be supplied by
/// the host for the endpoints that need them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the remote service, without a trailing slash
    pub base_url: String,
    /// Public project identifier, scopes public endpoints
    pub api_key: Option<String>,
    /// Private credential paired with the API key for management calls
    pub project_secret: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            project_secret: None,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at the hosted instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Reads `AUTH_CLIENT_BASE_URL`, `AUTH_CLIENT_API_KEY` and
    /// `AUTH_CLIENT_PROJECT_SECRET`. Unset variables leave the defaults in
    /// place.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("AUTH_CLIENT_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(key) = std::env::var("AUTH_CLIENT_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(secret) = std::env::var("AUTH_CLIENT_PROJECT_SECRET") {
            config.project_secret = Some(secret);
        }

        config
    }

    /// Override the base URL (trailing slashes are trimmed)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the project API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the project secret
    pub fn with_project_secret(mut self, project_secret: impl Into<String>) -> Self {
        self.project_secret = Some(project_secret.into());
        self
    }

    /// The API key, or a configuration error if it was never supplied
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::Configuration(
                "API key is not configured".to_string(),
            )),
        }
    }

    /// Both management credentials, or a configuration error
    ///
    /// Management endpoints authenticate with `X-API-Key`/`X-API-Secret`
    /// headers; callers must fail before any network I/O when either half is
    /// missing.
    pub fn management_credentials(&self) -> Result<(&str, &str)> {
        let api_key = self.api_key()?;
        match self.project_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok((api_key, secret)),
            _ => Err(Error::Configuration(
                "API key and project secret must both be configured for management APIs"
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_hosted_instance() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert!(config.project_secret.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .with_base_url("https://auth.example.com/")
            .with_api_key("proj_123")
            .with_project_secret("s3cret");

        assert_eq!(config.base_url, "https://auth.example.com");
        assert_eq!(config.api_key().unwrap(), "proj_123");
        assert!(config.management_credentials().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = ClientConfig::new();
        assert!(matches!(config.api_key(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let config = ClientConfig::new().with_api_key("proj_123");
        assert!(matches!(
            config.management_credentials(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_secret_is_configuration_error() {
        let config = ClientConfig::new()
            .with_api_key("proj_123")
            .with_project_secret("");
        assert!(matches!(
            config.management_credentials(),
            Err(Error::Configuration(_))
        ));
    }
}
