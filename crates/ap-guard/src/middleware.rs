//! axum/tower integration
//!
//! [`AuthLayer`] wraps a route (or router) with the authorization pipeline.
//! On success the [`AuthContext`] is inserted into the request extensions so
//! handlers can read it with `Extension<AuthContext>`; on denial the request
//! is answered directly with a JSON error body and never reaches the inner
//! service.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tower::{Layer, Service};

use ap_core::error::Error;

use crate::authenticator::Authenticator;
use crate::requirement::Requirement;

/// Layer enforcing a [`Requirement`] on every request it wraps
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<Authenticator>,
    requirement: Arc<Requirement>,
}

impl AuthLayer {
    pub fn new(authenticator: Arc<Authenticator>, requirement: Requirement) -> Self {
        Self {
            authenticator,
            requirement: Arc::new(requirement),
        }
    }

    /// Require any valid token
    pub fn any_valid(authenticator: Arc<Authenticator>) -> Self {
        Self::new(authenticator, Requirement::AnyValid)
    }

    /// Require at least one of the given roles
    pub fn role(
        authenticator: Arc<Authenticator>,
        roles: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new(authenticator, Requirement::role(roles))
    }

    /// Require a minimum privilege level
    pub fn min_level(authenticator: Arc<Authenticator>, level: i32) -> Self {
        Self::new(authenticator, Requirement::min_level(level))
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            authenticator: Arc::clone(&self.authenticator),
            requirement: Arc::clone(&self.requirement),
        }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    authenticator: Arc<Authenticator>,
    requirement: Arc<Requirement>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let authenticator = Arc::clone(&self.authenticator);
        let requirement = Arc::clone(&self.requirement);

        Box::pin(async move {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            match authenticator
                .authorize(auth_header.as_deref(), &requirement)
                .await
            {
                Ok(context) => {
                    request.extensions_mut().insert(context);
                    inner.call(request).await
                }
                Err(err) => {
                    tracing::debug!(kind = err.kind(), "request denied");
                    Ok(deny_response(&err))
                }
            }
        })
    }
}

/// Map a pipeline error onto an HTTP response
///
/// Authentication failures answer 401, authorization failures 403, remote
/// trouble 502. The body keeps the machine-readable kind and the
/// human-readable reason.
fn deny_response(err: &Error) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Json(serde_json::json!({
        "error": err.kind(),
        "message": err.to_string(),
    }));
    (status, body).into_response()
}
