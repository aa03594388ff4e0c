//! Deployment history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// What caused a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(type_name = "deployment_trigger", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeploymentTrigger {
    /// Initial deployment during provisioning.
    Provision,
    /// Operator-requested redeploy.
    Redeploy,
}

impl std::fmt::Display for DeploymentTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentTrigger::Provision => write!(f, "provision"),
            DeploymentTrigger::Redeploy => write!(f, "redeploy"),
        }
    }
}

/// One deployment of a client site. Append-only per client.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Deployment {
    /// Unique identifier.
    pub id: Uuid,

    /// Client this deployment belongs to.
    pub client_id: Uuid,

    /// Provider-reported state (e.g. "READY", "BUILDING", "ERROR", "MOCK").
    pub status: String,

    /// URL the deployment serves on.
    pub url: String,

    /// What triggered this deployment.
    pub trigger: DeploymentTrigger,

    /// Timestamp when the deployment was recorded.
    pub created_at: DateTime<Utc>,
}

impl Deployment {
    /// Build a new history entry for a client.
    #[must_use]
    pub fn new(
        client_id: Uuid,
        status: impl Into<String>,
        url: impl Into<String>,
        trigger: DeploymentTrigger,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            status: status.into(),
            url: url.into(),
            trigger,
            created_at: Utc::now(),
        }
    }
}
