//! Remote token validation and the authorization pipeline
//!
//! The [`Authenticator`] is framework-agnostic: it takes the raw value of an
//! `Authorization` header and a [`Requirement`] and either produces an
//! [`AuthContext`] or a denial. The three denial causes stay distinguishable
//! by reason text and error kind:
//!
//! - missing/malformed header (no network call is made)
//! - token rejected by the remote service, or `valid == false`
//! - valid token without the required role/level

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use ap_core::config::ClientConfig;
use ap_core::error::{Error, Result};
use ap_client::models::TokenValidation;
use ap_client::transport::{HttpRequest, HttpTransport};

use crate::requirement::Requirement;

/// Identity attached to a request after a successful authorization
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject_id: String,
    pub email: String,
    pub roles: HashSet<String>,
    pub max_role_level: i32,
    /// The full validation result, for hosts that want the raw payload
    pub validation: TokenValidation,
}

impl From<TokenValidation> for AuthContext {
    fn from(validation: TokenValidation) -> Self {
        Self {
            subject_id: validation.user_id.clone(),
            email: validation.email.clone(),
            roles: validation.roles.clone(),
            max_role_level: validation.max_role_level,
            validation,
        }
    }
}

/// Pull the token out of an `Authorization` header value
///
/// Absent headers and non-Bearer schemes are denied without touching the
/// network.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str> {
    let header = header.ok_or_else(|| Error::Authentication {
        reason: "missing or invalid Authorization header".to_string(),
    })?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    token.ok_or_else(|| Error::Authentication {
        reason: "missing or invalid Authorization header".to_string(),
    })
}

/// Validates bearer tokens against the remote service and enforces
/// per-endpoint requirements
pub struct Authenticator {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
}

impl Authenticator {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Validate a token remotely
    ///
    /// The result lives for exactly one authorization check; nothing is
    /// cached.
    pub async fn validate_token(&self, token: &str) -> Result<TokenValidation> {
        let api_key = self.config.api_key()?;
        let url = format!(
            "{}/api/p/{}/auth/validate-token",
            self.config.base_url, api_key
        );

        let request = HttpRequest::post(url).json(&json!({ "token": token }))?;
        let response = match self.transport.execute(request).await?.error_for_status() {
            Ok(response) => response,
            // The validation endpoint rejecting the credential is an
            // authentication failure, not a service failure.
            Err(Error::RemoteService { status: 401 | 403, .. }) => {
                return Err(Error::Authentication {
                    reason: "token is invalid or expired".to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        // An empty or null body counts as an absent result, not a transport
        // defect.
        let validation: Option<TokenValidation> = if response.body.trim().is_empty() {
            None
        } else {
            response.json()?
        };
        match validation {
            Some(validation) if validation.valid => Ok(validation),
            _ => Err(Error::Authentication {
                reason: "token validation failed".to_string(),
            }),
        }
    }

    /// Run the full Extract → Validate → Authorize pipeline
    pub async fn authorize(
        &self,
        auth_header: Option<&str>,
        requirement: &Requirement,
    ) -> Result<AuthContext> {
        let token = extract_bearer_token(auth_header)?;
        let validation = self.validate_token(token).await?;
        // Role/level checks are only reachable with a confirmed-valid token.
        requirement.check(&validation)?;

        tracing::debug!(subject_id = %validation.user_id, "request authorized");
        Ok(AuthContext::from(validation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ap_client::transport::HttpResponse;

    /// Transport stub driven by a closure
    struct FnTransport<F>(F);

    #[async_trait]
    impl<F> HttpTransport for FnTransport<F>
    where
        F: Fn(HttpRequest) -> Result<HttpResponse> + Send + Sync,
    {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            (self.0)(request)
        }
    }

    fn authenticator(
        respond: impl Fn(HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Authenticator {
        let config = ClientConfig::new()
            .with_base_url("https://auth.example.com")
            .with_api_key("proj_123");
        Authenticator::new(config, Arc::new(FnTransport(respond)))
    }

    fn valid_body(roles: &[&str], level: i32) -> String {
        serde_json::json!({
            "valid": true,
            "userId": "42",
            "email": "user@example.com",
            "roles": roles,
            "maxRoleLevel": level,
        })
        .to_string()
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(extract_bearer_token(Some("bearer abc")).unwrap(), "abc");
        assert!(extract_bearer_token(Some("Basic abc")).is_err());
        assert!(extract_bearer_token(Some("Bearer   ")).is_err());
        assert!(extract_bearer_token(None).is_err());
    }

    #[tokio::test]
    async fn test_missing_header_denies_without_network_call() {
        let auth = authenticator(|_| panic!("no network call expected"));
        let err = auth
            .authorize(None, &Requirement::AnyValid)
            .await
            .unwrap_err();
        match err {
            Error::Authentication { reason } => {
                assert!(reason.contains("Authorization header"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_valid_token_with_matching_role_allows_and_populates_context() {
        let auth = authenticator(|req| {
            assert_eq!(
                req.url,
                "https://auth.example.com/api/p/proj_123/auth/validate-token"
            );
            assert_eq!(req.body, Some(serde_json::json!({ "token": "tok-1" })));
            Ok(HttpResponse::new(200, valid_body(&["admin"], 9)))
        });

        let context = auth
            .authorize(Some("Bearer tok-1"), &Requirement::role(["admin", "owner"]))
            .await
            .unwrap();
        assert_eq!(context.subject_id, "42");
        assert_eq!(context.email, "user@example.com");
        assert_eq!(context.max_role_level, 9);
    }

    #[tokio::test]
    async fn test_invalid_flag_is_authentication_failure() {
        let auth = authenticator(|_| Ok(HttpResponse::new(200, r#"{"valid": false}"#)));
        let err = auth
            .authorize(Some("Bearer tok-1"), &Requirement::role(["admin"]))
            .await
            .unwrap_err();
        match err {
            Error::Authentication { reason } => {
                assert_eq!(reason, "token validation failed")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_absent_result_is_validation_failure() {
        let auth = authenticator(|_| Ok(HttpResponse::new(200, "")));
        let err = auth
            .authorize(Some("Bearer tok-1"), &Requirement::AnyValid)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_remote_answer_reads_as_expired_token() {
        let auth = authenticator(|_| Ok(HttpResponse::new(401, "")));
        let err = auth
            .authorize(Some("Bearer tok-1"), &Requirement::AnyValid)
            .await
            .unwrap_err();
        match err {
            Error::Authentication { reason } => {
                // Must stay distinguishable from the valid == false case.
                assert_eq!(reason, "token is invalid or expired")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_from_validation_is_not_an_auth_failure() {
        let auth = authenticator(|_| Ok(HttpResponse::new(500, "boom")));
        let err = auth
            .authorize(Some("Bearer tok-1"), &Requirement::AnyValid)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteService { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_insufficient_role_is_authorization_failure() {
        let auth = authenticator(|_| Ok(HttpResponse::new(200, valid_body(&["editor"], 1))));
        let err = auth
            .authorize(Some("Bearer tok-1"), &Requirement::role(["admin", "owner"]))
            .await
            .unwrap_err();
        match err {
            Error::Authorization { reason } => {
                assert!(reason.contains("admin") && reason.contains("owner"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_level_boundary_is_inclusive() {
        let auth = authenticator(|_| Ok(HttpResponse::new(200, valid_body(&[], 5))));
        assert!(auth
            .authorize(Some("Bearer tok-1"), &Requirement::min_level(5))
            .await
            .is_ok());

        let auth = authenticator(|_| Ok(HttpResponse::new(200, valid_body(&[], 4))));
        assert!(matches!(
            auth.authorize(Some("Bearer tok-1"), &Requirement::min_level(5))
                .await,
            Err(Error::Authorization { .. })
        ));
    }
}
