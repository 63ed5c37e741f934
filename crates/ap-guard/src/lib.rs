//! # ap-guard
//!
//! Request authorization for host applications.
//!
//! A protected call runs a straight-line pipeline: extract the bearer token
//! from the `Authorization` header, validate it against the remote service,
//! then evaluate the endpoint's declared [`Requirement`]. On success the
//! validated identity is attached to the request as an [`AuthContext`];
//! on failure the call is denied with a 401/403-distinguishable error.
//!
//! ## Features
//!
//! - Declarative per-endpoint requirements (role set, minimum level, or any
//!   valid token)
//! - Framework-agnostic [`Authenticator`] plus an axum/tower [`AuthLayer`]

pub mod authenticator;
pub mod middleware;
pub mod requirement;

pub use authenticator::{extract_bearer_token, AuthContext, Authenticator};
pub use middleware::{AuthLayer, AuthMiddleware};
pub use requirement::Requirement;
