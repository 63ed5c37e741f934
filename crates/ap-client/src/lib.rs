//! # ap-client
//!
//! Typed client for the auth-platform remote service.
//!
//! ## Features
//!
//! - `HttpTransport` trait with a reqwest-backed implementation
//! - Lazy, memoized project-id resolution from the configured API key
//! - Management client for project-scoped end-user and role administration
//! - End-user client for registration, login and self-service calls

pub mod endusers;
pub mod management;
pub mod models;
pub mod resolver;
pub mod transport;

pub use endusers::EndUserClient;
pub use management::ManagementClient;
pub use models::{
    ApiMessage, AuthResponse, ChangePasswordRequest, EndUser, ForgotPasswordRequest, LoginRequest,
    Project, ProjectRole, RegisterRequest, ResetPasswordRequest, RoleAssignment, RoleRequest,
    TokenValidation, UpdateEndUserRequest, UpdateProfileRequest,
};
pub use resolver::ProjectIdResolver;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};
