//! Client model: one provisioned tenant site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Lifecycle status of a client site.
///
/// Transitions are triggered only by the provisioning/deprovisioning
/// orchestrators or an explicit suspend/activate operation. The valid
/// transitions are encoded in [`ClientStatus::can_transition_to`]:
///
/// ```text
/// pending -> provisioning -> active
///            provisioning -> failed            (terminal)
/// active <-> suspended
/// active -> deploying -> active | failed       (redeploy)
/// active | suspended | failed -> deprovisioning -> deleted   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// Request accepted, pipeline not yet started.
    Pending,
    /// The provisioning pipeline is running.
    Provisioning,
    /// A redeploy is in flight.
    Deploying,
    /// Serving traffic.
    Active,
    /// Serving disabled without destroying resources.
    Suspended,
    /// A critical pipeline step failed. Terminal.
    Failed,
    /// The compensation walk is running.
    Deprovisioning,
    /// Resources released; record archived. Terminal.
    Deleted,
}

impl ClientStatus {
    /// Returns `true` if the lifecycle state machine permits moving to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: ClientStatus) -> bool {
        use ClientStatus::{
            Active, Deleted, Deploying, Deprovisioning, Failed, Pending, Provisioning, Suspended,
        };
        matches!(
            (self, next),
            (Pending, Provisioning)
                | (Provisioning, Active | Failed)
                | (Active, Suspended | Deploying | Deprovisioning)
                | (Suspended, Active | Deprovisioning)
                | (Deploying, Active | Failed)
                | (Failed, Deprovisioning)
                | (Deprovisioning, Deleted)
        )
    }

    /// Returns `true` for states with no outgoing transitions besides teardown.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ClientStatus::Deleted)
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClientStatus::Pending => "pending",
            ClientStatus::Provisioning => "provisioning",
            ClientStatus::Deploying => "deploying",
            ClientStatus::Active => "active",
            ClientStatus::Suspended => "suspended",
            ClientStatus::Failed => "failed",
            ClientStatus::Deprovisioning => "deprovisioning",
            ClientStatus::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ClientStatus::Pending),
            "provisioning" => Ok(ClientStatus::Provisioning),
            "deploying" => Ok(ClientStatus::Deploying),
            "active" => Ok(ClientStatus::Active),
            "suspended" => Ok(ClientStatus::Suspended),
            "failed" => Ok(ClientStatus::Failed),
            "deprovisioning" => Ok(ClientStatus::Deprovisioning),
            "deleted" => Ok(ClientStatus::Deleted),
            other => Err(format!("unknown client status: {other}")),
        }
    }
}

/// A provisioned client site.
///
/// Created exactly once, at the end of a successful provisioning run.
/// Mutated by redeploy/suspend/activate; archived by deprovisioning.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Client {
    /// Unique identifier.
    pub id: Uuid,

    /// Human-readable client name (e.g. "Acme").
    pub name: String,

    /// URL-safe subdomain, unique among non-deleted clients.
    pub domain: String,

    /// Template the site was provisioned from.
    pub template: String,

    /// Contact email of the client owner.
    pub contact_email: String,

    /// Public URL of the deployed site.
    pub deployment_url: String,

    /// URL of the site's admin interface.
    pub admin_url: String,

    /// Handle of the provisioned datastore (connection reference, not secrets).
    pub datastore_url: String,

    /// Deployment provider project identifier, when a real provider ran.
    pub project_id: Option<String>,

    /// Lifecycle status.
    pub status: ClientStatus,

    /// Plan tier (e.g. "starter", "business").
    pub plan: String,

    /// Effective feature flags (template defaults merged with overrides).
    pub features: serde_json::Value,

    /// Timestamp when the record was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,

    /// When the client was suspended. NULL means not suspended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<DateTime<Utc>>,

    /// Operator-facing reason for suspension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
}

impl Client {
    /// Returns `true` if this client is currently suspended.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.status == ClientStatus::Suspended
    }

    /// Returns `true` if this client has been deprovisioned.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.status == ClientStatus::Deleted
    }

    /// Uptime since the record was created, in whole seconds.
    ///
    /// Deployment platforms report per-instance uptime; the platform-level
    /// figure is the age of the tenant record.
    #[must_use]
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds().max(0)
    }
}
