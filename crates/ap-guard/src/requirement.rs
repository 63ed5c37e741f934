//! Authorization requirements
//!
//! A requirement is declared once per protected endpoint and evaluated by
//! the middleware after token validity has been confirmed.

use std::collections::HashSet;

use ap_core::error::{Error, Result};
use ap_client::models::TokenValidation;

/// What a protected endpoint demands beyond a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Token validity alone is sufficient
    AnyValid,
    /// The caller must hold at least one of these roles
    Role(HashSet<String>),
    /// The caller's strongest role must reach this level (inclusive)
    MinLevel(i32),
}

impl Requirement {
    /// Require any one of the given roles
    pub fn role(roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Requirement::Role(roles.into_iter().map(Into::into).collect())
    }

    /// Require a minimum privilege level
    pub fn min_level(level: i32) -> Self {
        Requirement::MinLevel(level)
    }

    /// Evaluate the requirement against an already-validated token
    ///
    /// Callers must only invoke this after `validation.valid` has been
    /// confirmed; the check itself does not re-examine the flag.
    pub fn check(&self, validation: &TokenValidation) -> Result<()> {
        match self {
            Requirement::AnyValid => Ok(()),
            Requirement::Role(allowed) => {
                // One matching role suffices.
                if allowed.iter().any(|role| validation.roles.contains(role)) {
                    Ok(())
                } else {
                    let mut names: Vec<&str> = allowed.iter().map(String::as_str).collect();
                    names.sort_unstable();
                    Err(Error::Authorization {
                        reason: format!(
                            "user does not have any of the required roles: {}",
                            names.join(", ")
                        ),
                    })
                }
            }
            Requirement::MinLevel(required) => {
                if validation.max_role_level >= *required {
                    Ok(())
                } else {
                    Err(Error::Authorization {
                        reason: format!(
                            "user does not have the required level (required {}, found {})",
                            required, validation.max_role_level
                        ),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(roles: &[&str], level: i32) -> TokenValidation {
        serde_json::from_value(serde_json::json!({
            "valid": true,
            "userId": "42",
            "email": "user@example.com",
            "roles": roles,
            "maxRoleLevel": level,
        }))
        .unwrap()
    }

    #[test]
    fn test_any_valid_always_passes() {
        assert!(Requirement::AnyValid.check(&validation(&[], 0)).is_ok());
    }

    #[test]
    fn test_single_matching_role_suffices() {
        let requirement = Requirement::role(["admin", "owner"]);
        assert!(requirement.check(&validation(&["owner"], 1)).is_ok());
    }

    #[test]
    fn test_role_denial_names_required_roles() {
        let requirement = Requirement::role(["admin", "owner"]);
        let err = requirement
            .check(&validation(&["editor"], 1))
            .unwrap_err();
        match err {
            Error::Authorization { reason } => {
                assert!(reason.contains("admin"));
                assert!(reason.contains("owner"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_min_level_boundary_is_inclusive() {
        let requirement = Requirement::min_level(5);
        assert!(requirement.check(&validation(&[], 4)).is_err());
        assert!(requirement.check(&validation(&[], 5)).is_ok());
        assert!(requirement.check(&validation(&[], 6)).is_ok());
    }
}
