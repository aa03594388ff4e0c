//! The `ClientStore` trait: single writer of durable tenant state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreResult;
use crate::models::{Client, ClientStatus, Deployment};

/// Fields required to register a client at the end of a successful
/// provisioning run. Identifier, timestamps and status are assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub domain: String,
    pub template: String,
    pub contact_email: String,
    pub deployment_url: String,
    pub admin_url: String,
    pub datastore_url: String,
    pub project_id: Option<String>,
    pub plan: String,
    pub features: serde_json::Value,
}

/// Listing filter. All criteria are conjunctive; `search` matches name or
/// domain, case-insensitively.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientFilter {
    pub status: Option<ClientStatus>,
    pub template: Option<String>,
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ClientFilter {
    /// Resolved 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Resolved page size, clamped to 1..=100.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }

    /// Offset into the result set.
    #[must_use]
    pub fn offset(&self) -> u32 {
        (self.page() - 1) * self.per_page()
    }
}

/// One page of clients plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct ClientPage {
    pub clients: Vec<Client>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Aggregate platform counts for the stats endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformStats {
    pub total_clients: u64,
    pub active: u64,
    pub suspended: u64,
    pub failed: u64,
    pub deploying: u64,
    pub deleted: u64,
    pub total_deployments: u64,
}

/// Durable state for client sites and their deployment history.
///
/// Invariants enforced here rather than by callers:
/// - a domain is unique among non-deleted clients;
/// - status changes must be valid per [`ClientStatus::can_transition_to`].
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Register a client. Called exactly once per successful provisioning
    /// run; the new record starts in [`ClientStatus::Active`].
    async fn insert_client(&self, new: NewClient) -> StoreResult<Client>;

    /// Fetch a client by id, including archived ones.
    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>>;

    /// Fetch a non-deleted client by domain.
    async fn find_by_domain(&self, domain: &str) -> StoreResult<Option<Client>>;

    /// List clients matching a filter, paginated.
    async fn list_clients(&self, filter: &ClientFilter) -> StoreResult<ClientPage>;

    /// Persist mutable configuration fields (name, plan, features, contact
    /// email, deployment/admin URLs). Status is not written here.
    async fn update_client(&self, client: &Client) -> StoreResult<Client>;

    /// Move a client to a new lifecycle status, validating the transition.
    async fn set_status(&self, id: Uuid, next: ClientStatus) -> StoreResult<Client>;

    /// Suspend a client, recording the operator reason.
    async fn suspend(&self, id: Uuid, reason: &str) -> StoreResult<Client>;

    /// Reactivate a suspended client, clearing suspension metadata.
    async fn activate(&self, id: Uuid) -> StoreResult<Client>;

    /// Append a deployment history entry.
    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Deployment>;

    /// Deployment history for a client, newest first.
    async fn list_deployments(&self, client_id: Uuid) -> StoreResult<Vec<Deployment>>;

    /// Aggregate counts across the platform.
    async fn stats(&self) -> StoreResult<PlatformStats>;
}
