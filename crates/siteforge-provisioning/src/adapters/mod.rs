//! Adapter traits for external systems.
//!
//! Every adapter exposes an explicit [`Availability`] capability check; the
//! orchestrator consults it up front and substitutes a deterministic
//! placeholder when a provider is not configured, instead of parsing error
//! strings after the fact. Adapters own no cross-step state; every call is
//! stateless from the orchestrator's perspective.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::AdapterResult;

pub use http::{
    HttpDatastoreProvisioner, HttpDeploymentService, HttpDomainConfigurator,
    HttpIdentityBootstrapper, ProviderConfig, WebhookNotificationService,
};

/// Whether a real provider backs an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// A real provider is configured; calls reach an external system.
    Configured,
    /// No provider configured; the orchestrator substitutes placeholders.
    Unconfigured,
}

impl Availability {
    /// Returns `true` for [`Availability::Configured`].
    #[must_use]
    pub fn is_configured(self) -> bool {
        self == Availability::Configured
    }
}

/// Handle to a provisioned datastore.
#[derive(Debug, Clone, Serialize)]
pub struct DatastoreHandle {
    /// Provider-side identifier, derived from the site domain.
    pub id: String,
    /// Connection reference handed to the deployed site.
    pub url: String,
}

/// Everything the deployment provider needs to deploy a site.
#[derive(Debug, Clone)]
pub struct DeploySpec {
    /// Site display name.
    pub site_name: String,
    /// Subdomain of the site.
    pub domain: String,
    /// Template identifier.
    pub template: String,
    /// Rendered environment configuration.
    pub env: BTreeMap<String, String>,
}

/// Result of a deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentInfo {
    /// Provider project the site lives in.
    pub project_id: String,
    /// Identifier of this particular deployment.
    pub deployment_id: String,
    /// URL the deployment serves on.
    pub url: String,
    /// Provider-reported state (e.g. "READY", "QUEUED").
    pub state: String,
}

/// One provider-side deployment history entry.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDeployment {
    pub id: String,
    pub state: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Credentials of a bootstrapped administrator account.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
    pub admin_url: String,
}

/// Provisions and destroys per-tenant datastores.
#[async_trait]
pub trait DatastoreProvisioner: Send + Sync {
    /// Capability check.
    fn availability(&self) -> Availability;

    /// Create a datastore for a site.
    async fn provision(&self, domain: &str) -> AdapterResult<DatastoreHandle>;

    /// Destroy a datastore. Callers probe [`Self::exists`] first so that
    /// destroying an already-absent datastore is never attempted blindly.
    async fn destroy(&self, handle: &DatastoreHandle) -> AdapterResult<()>;

    /// Whether the datastore still exists on the provider.
    async fn exists(&self, handle: &DatastoreHandle) -> AdapterResult<bool>;
}

/// Deploys site code to the target runtime.
#[async_trait]
pub trait DeploymentService: Send + Sync {
    /// Capability check.
    fn availability(&self) -> Availability;

    /// Create a project and deploy the site into it.
    async fn deploy(&self, spec: &DeploySpec) -> AdapterResult<DeploymentInfo>;

    /// Trigger a new deployment of an existing project.
    async fn redeploy(&self, project_id: &str) -> AdapterResult<DeploymentInfo>;

    /// Live deployment history for a project.
    async fn list_deployments(&self, project_id: &str) -> AdapterResult<Vec<ProviderDeployment>>;

    /// Delete a project and its deployments.
    async fn delete_project(&self, project_id: &str) -> AdapterResult<()>;

    /// Whether the project still exists on the provider.
    async fn project_exists(&self, project_id: &str) -> AdapterResult<bool>;
}

/// Attaches custom domains to deployed projects.
#[async_trait]
pub trait DomainConfigurator: Send + Sync {
    /// Capability check.
    fn availability(&self) -> Availability;

    /// Point a domain at a project.
    async fn attach(&self, project_id: &str, domain: &str) -> AdapterResult<()>;

    /// Remove a domain from a project.
    async fn detach(&self, project_id: &str, domain: &str) -> AdapterResult<()>;

    /// Whether the domain is currently attached.
    async fn is_attached(&self, project_id: &str, domain: &str) -> AdapterResult<bool>;
}

/// Creates the initial administrator account on a freshly deployed site.
#[async_trait]
pub trait IdentityBootstrapper: Send + Sync {
    /// Capability check.
    fn availability(&self) -> Availability;

    /// Create the admin account and return its credentials.
    async fn create_admin(
        &self,
        admin_url: &str,
        email: &str,
        site_name: &str,
    ) -> AdapterResult<AdminCredentials>;
}

/// Sends operational notifications to the client owner.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Capability check.
    fn availability(&self) -> Availability;

    /// Send the welcome message. Admin access details are included when an
    /// admin account was bootstrapped; the welcome is sent either way.
    async fn send_welcome(
        &self,
        email: &str,
        site_name: &str,
        admin: Option<&AdminCredentials>,
    ) -> AdapterResult<()>;
}

/// The full adapter set handed to the orchestrators.
#[derive(Clone)]
pub struct Adapters {
    pub datastore: std::sync::Arc<dyn DatastoreProvisioner>,
    pub deployment: std::sync::Arc<dyn DeploymentService>,
    pub domains: std::sync::Arc<dyn DomainConfigurator>,
    pub identity: std::sync::Arc<dyn IdentityBootstrapper>,
    pub notifications: std::sync::Arc<dyn NotificationService>,
}

/// Generate a random alphanumeric secret of the given length.
#[must_use]
pub fn generate_secret(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
