//! End-user API client
//!
//! Two groups of operations: public per-project calls keyed by the API key
//! (registration, login, password recovery) and self-service calls
//! authenticated with the end user's own bearer token. The client forwards
//! well-formed bodies and does no local validation beyond the fail-fast
//! credential checks.

use std::sync::Arc;

use ap_core::config::ClientConfig;
use ap_core::error::{Error, Result};

use crate::models::{
    ApiMessage, AuthResponse, ChangePasswordRequest, EndUser, ForgotPasswordRequest, LoginRequest,
    RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Client for public and self-service end-user endpoints
pub struct EndUserClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
}

impl EndUserClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// URL of a public per-project auth endpoint
    fn public_url(&self, action: &str) -> Result<String> {
        let api_key = self.config.api_key()?;
        Ok(format!(
            "{}/api/p/{}/auth/{}",
            self.config.base_url, api_key, action
        ))
    }

    fn me_url(&self, suffix: &str) -> String {
        format!("{}/api/eu/me{}", self.config.base_url, suffix)
    }

    fn checked_token<'t>(&self, token: &'t str) -> Result<&'t str> {
        if token.trim().is_empty() {
            return Err(Error::Argument(
                "end-user token cannot be empty".to_string(),
            ));
        }
        Ok(token)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(request).await?.error_for_status()
    }

    // -- Public operations --------------------------------------------------

    /// Register a new end user with the project
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiMessage> {
        let url = self.public_url("register")?;
        self.send(HttpRequest::post(url).json(request)?).await?.json()
    }

    /// Log an end user in, returning their session token
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        let url = self.public_url("login")?;
        self.send(HttpRequest::post(url).json(request)?).await?.json()
    }

    /// Start the password-recovery flow for an end user
    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<ApiMessage> {
        let url = self.public_url("forgot-password")?;
        self.send(HttpRequest::post(url).json(request)?).await?.json()
    }

    /// Complete the password-recovery flow with the emailed reset token
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<ApiMessage> {
        let url = self.public_url("reset-password")?;
        self.send(HttpRequest::post(url).json(request)?).await?.json()
    }

    // -- Self-service operations --------------------------------------------

    /// Fetch the profile of the token's owner
    pub async fn my_profile(&self, token: &str) -> Result<EndUser> {
        let token = self.checked_token(token)?;
        self.send(HttpRequest::get(self.me_url("")).bearer(token))
            .await?
            .json()
    }

    /// Update the profile of the token's owner
    pub async fn update_my_profile(
        &self,
        token: &str,
        update: &UpdateProfileRequest,
    ) -> Result<EndUser> {
        let token = self.checked_token(token)?;
        self.send(HttpRequest::put(self.me_url("")).json(update)?.bearer(token))
            .await?
            .json()
    }

    /// Change the password of the token's owner
    pub async fn change_my_password(
        &self,
        token: &str,
        change: &ChangePasswordRequest,
    ) -> Result<ApiMessage> {
        let token = self.checked_token(token)?;
        self.send(
            HttpRequest::put(self.me_url("/password"))
                .json(change)?
                .bearer(token),
        )
        .await?
        .json()
    }
}
