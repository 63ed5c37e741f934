//! Management API client
//!
//! Administrative CRUD over a project's end users and roles, authenticated
//! with the `X-API-Key`/`X-API-Secret` header pair. Every operation resolves
//! the numeric project id first (memoized, see [`ProjectIdResolver`]) and
//! then issues exactly one HTTP call.
//!
//! Role-assignment mutations also forward the calling administrator's own
//! bearer token, so the remote service can record who made the change.

use std::sync::Arc;

use ap_core::config::ClientConfig;
use ap_core::error::{Error, Result};

use crate::models::{EndUser, ProjectRole, RoleAssignment, RoleRequest, UpdateEndUserRequest};
use crate::resolver::ProjectIdResolver;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Client for project-scoped management endpoints
pub struct ManagementClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    resolver: ProjectIdResolver,
}

impl ManagementClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let resolver = ProjectIdResolver::new(config.clone(), Arc::clone(&transport));
        Self {
            config,
            transport,
            resolver,
        }
    }

    /// The memoized project id this client operates on
    pub async fn project_id(&self) -> Result<i64> {
        self.resolver.resolve().await
    }

    fn url(&self, project_id: i64, suffix: &str) -> String {
        format!(
            "{}/api/projects/{}{}",
            self.config.base_url, project_id, suffix
        )
    }

    /// Attach management credentials, failing fast if either is missing
    fn with_auth(&self, request: HttpRequest) -> Result<HttpRequest> {
        let (api_key, secret) = self.config.management_credentials()?;
        Ok(request
            .header("X-API-Key", api_key)
            .header("X-API-Secret", secret))
    }

    /// Admin tokens are caller-supplied and must be checked before any I/O
    fn checked_admin_token<'t>(&self, token: &'t str) -> Result<&'t str> {
        if token.trim().is_empty() {
            return Err(Error::Argument(
                "admin token cannot be empty".to_string(),
            ));
        }
        Ok(token)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(request).await?.error_for_status()
    }

    // -- End users ----------------------------------------------------------

    /// List all end users of the project
    pub async fn list_end_users(&self) -> Result<Vec<EndUser>> {
        // Credentials are checked before the resolver gets a chance to
        // touch the network.
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let request = self.with_auth(HttpRequest::get(self.url(project_id, "/endusers")))?;
        self.send(request).await?.json()
    }

    /// Update profile fields of an end user
    pub async fn update_end_user(
        &self,
        end_user_id: i64,
        update: &UpdateEndUserRequest,
    ) -> Result<EndUser> {
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let url = self.url(project_id, &format!("/endusers/{}", end_user_id));
        let request = self.with_auth(HttpRequest::put(url).json(update)?)?;
        self.send(request).await?.json()
    }

    /// Lock an end user out of the project
    pub async fn lock_end_user(&self, end_user_id: i64) -> Result<()> {
        self.toggle_lock(end_user_id, "lock").await
    }

    /// Re-enable a locked end user
    pub async fn unlock_end_user(&self, end_user_id: i64) -> Result<()> {
        self.toggle_lock(end_user_id, "unlock").await
    }

    async fn toggle_lock(&self, end_user_id: i64, action: &str) -> Result<()> {
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let url = self.url(project_id, &format!("/endusers/{}/{}", end_user_id, action));
        let request = self.with_auth(HttpRequest::post(url))?;
        self.send(request).await?;
        tracing::debug!(end_user_id, action, "toggled end user availability");
        Ok(())
    }

    /// Replace an end user's role set wholesale
    pub async fn replace_end_user_roles(
        &self,
        admin_token: &str,
        end_user_id: i64,
        roles: &RoleAssignment,
    ) -> Result<EndUser> {
        self.mutate_roles(admin_token, end_user_id, roles, false).await
    }

    /// Append roles to an end user's existing set
    pub async fn append_end_user_roles(
        &self,
        admin_token: &str,
        end_user_id: i64,
        roles: &RoleAssignment,
    ) -> Result<EndUser> {
        self.mutate_roles(admin_token, end_user_id, roles, true).await
    }

    async fn mutate_roles(
        &self,
        admin_token: &str,
        end_user_id: i64,
        roles: &RoleAssignment,
        append: bool,
    ) -> Result<EndUser> {
        self.config.management_credentials()?;
        let admin_token = self.checked_admin_token(admin_token)?;
        let project_id = self.resolver.resolve().await?;
        let url = self.url(project_id, &format!("/endusers/{}/roles", end_user_id));
        let request = if append {
            HttpRequest::post(url)
        } else {
            HttpRequest::put(url)
        };
        let request = self.with_auth(request.json(roles)?)?.bearer(admin_token);
        self.send(request).await?.json()
    }

    /// Remove a single role from an end user
    pub async fn remove_end_user_role(
        &self,
        admin_token: &str,
        end_user_id: i64,
        role: &str,
    ) -> Result<EndUser> {
        self.config.management_credentials()?;
        let admin_token = self.checked_admin_token(admin_token)?;
        let project_id = self.resolver.resolve().await?;
        let url = self.url(project_id, &format!("/endusers/{}/roles/{}", end_user_id, role));
        let request = self.with_auth(HttpRequest::delete(url))?.bearer(admin_token);
        self.send(request).await?.json()
    }

    // -- Roles --------------------------------------------------------------

    /// List the project's role definitions
    pub async fn list_roles(&self) -> Result<Vec<ProjectRole>> {
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let request = self.with_auth(HttpRequest::get(self.url(project_id, "/roles")))?;
        self.send(request).await?.json()
    }

    /// Create a new role definition
    pub async fn create_role(&self, role: &RoleRequest) -> Result<ProjectRole> {
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let request = self.with_auth(HttpRequest::post(self.url(project_id, "/roles")).json(role)?)?;
        self.send(request).await?.json()
    }

    /// Update an existing role definition
    pub async fn update_role(&self, role_id: i64, role: &RoleRequest) -> Result<ProjectRole> {
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let url = self.url(project_id, &format!("/roles/{}", role_id));
        let request = self.with_auth(HttpRequest::put(url).json(role)?)?;
        self.send(request).await?.json()
    }

    /// Delete a role definition
    pub async fn delete_role(&self, role_id: i64) -> Result<()> {
        self.config.management_credentials()?;
        let project_id = self.resolver.resolve().await?;
        let url = self.url(project_id, &format!("/roles/{}", role_id));
        let request = self.with_auth(HttpRequest::delete(url))?;
        self.send(request).await?;
        Ok(())
    }
}
