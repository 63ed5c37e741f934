//! Error taxonomy shared by all auth-platform client crates
//!
//! Every failure is raised synchronously to the immediate caller; nothing is
//! swallowed or retried. Authentication and authorization failures carry
//! distinguishable reasons so hosts can map them to 401 vs 403.

use thiserror::Error;

/// Standard Result type for auth-platform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all auth-platform client operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required credential is missing at call time; raised before any I/O
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller supplied an empty or invalid value; raised before any I/O
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// The request could not be authenticated (missing/malformed header, or
    /// the remote service rejected the token)
    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    /// The token is valid but the role/level requirement is unmet
    #[error("Authorization failed: {reason}")]
    Authorization { reason: String },

    /// The remote service answered with a non-2xx status
    #[error("Remote service error (status {status}): {body}")]
    RemoteService { status: u16, body: String },

    /// The remote call failed below the HTTP layer, or its body could not be
    /// decoded
    #[error("Transport error: {0}")]
    Transport(String),

    /// The project id could not be resolved for the configured API key
    #[error("Project resolution failed: {0}")]
    Resolution(String),
}

impl Error {
    /// HTTP status a host application should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Authentication { .. } => 401,
            Error::Authorization { .. } => 403,
            Error::Argument(_) => 400,
            Error::RemoteService { .. } | Error::Transport(_) => 502,
            Error::Configuration(_) | Error::Resolution(_) => 500,
        }
    }

    /// Stable machine-readable tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::Argument(_) => "invalid_argument",
            Error::Authentication { .. } => "authentication_failed",
            Error::Authorization { .. } => "authorization_failed",
            Error::RemoteService { .. } => "remote_service_error",
            Error::Transport(_) => "transport_error",
            Error::Resolution(_) => "resolution_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let authn = Error::Authentication {
            reason: "missing header".into(),
        };
        let authz = Error::Authorization {
            reason: "insufficient level".into(),
        };
        assert_eq!(authn.status_code(), 401);
        assert_eq!(authz.status_code(), 403);
        assert_eq!(
            Error::RemoteService {
                status: 500,
                body: String::new()
            }
            .status_code(),
            502
        );
        assert_eq!(Error::Configuration("x".into()).status_code(), 500);
    }

    #[test]
    fn test_kinds_distinguish_denial_causes() {
        let authn = Error::Authentication {
            reason: "token is invalid or expired".into(),
        };
        let authz = Error::Authorization {
            reason: "missing role".into(),
        };
        assert_ne!(authn.kind(), authz.kind());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = Error::Authentication {
            reason: "token validation failed".into(),
        };
        assert!(err.to_string().contains("token validation failed"));
    }
}
