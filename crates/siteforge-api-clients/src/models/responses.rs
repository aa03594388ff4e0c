//! Response bodies returned by the client management API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use siteforge_core::ClientId;
use siteforge_provisioning::adapters::ProviderDeployment;
use siteforge_provisioning::{DeploymentHistory, LogEntry, LogLevel, ProvisionOutcome};
use siteforge_store::{Client, ClientPage, Deployment, PlatformStats};

/// A client site as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ClientResponse {
    #[schema(value_type = uuid::Uuid)]
    pub id: ClientId,
    pub name: String,
    pub domain: String,
    pub template: String,
    pub contact_email: String,
    pub deployment_url: String,
    pub admin_url: String,
    pub datastore_url: String,
    pub status: String,
    pub plan: String,
    #[schema(value_type = Object)]
    pub features: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspended_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: ClientId::from_uuid(client.id),
            name: client.name,
            domain: client.domain,
            template: client.template,
            contact_email: client.contact_email,
            deployment_url: client.deployment_url,
            admin_url: client.admin_url,
            datastore_url: client.datastore_url,
            status: client.status.to_string(),
            plan: client.plan,
            features: client.features,
            created_at: client.created_at,
            updated_at: client.updated_at,
            suspended_at: client.suspended_at,
            suspension_reason: client.suspension_reason,
        }
    }
}

/// One audit log entry in a provisioning or deprovisioning response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LogEntryBody {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    pub message: String,
}

impl From<LogEntry> for LogEntryBody {
    fn from(entry: LogEntry) -> Self {
        let level = match entry.level {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Fallback => "fallback",
            LogLevel::Error => "error",
        };
        Self {
            timestamp: entry.timestamp,
            level: level.to_string(),
            step: entry.step.map(str::to_string),
            message: entry.message,
        }
    }
}

/// Body for `POST /clients` responses, success or failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<uuid::Uuid>)]
    pub client_id: Option<ClientId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datastore_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub log: Vec<LogEntryBody>,
}

impl From<ProvisionOutcome> for ProvisionResponse {
    fn from(outcome: ProvisionOutcome) -> Self {
        Self {
            success: outcome.success,
            client_id: outcome.client_id.map(ClientId::from_uuid),
            deployment_url: outcome.deployment_url,
            admin_url: outcome.admin_url,
            datastore_url: outcome.datastore_url,
            error: outcome.error.map(|e| e.to_string()),
            log: outcome.log.into_iter().map(LogEntryBody::from).collect(),
        }
    }
}

/// Body for `DELETE /clients/{id}` responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeprovisionResponse {
    pub success: bool,
    #[schema(value_type = uuid::Uuid)]
    pub client_id: ClientId,
    pub failed_steps: Vec<String>,
    pub log: Vec<LogEntryBody>,
}

/// Body for `GET /clients/{id}/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: i64,
    pub deployment_url: String,
}

/// One deployment history entry, from either the provider or local records.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentEntry {
    pub id: String,
    pub state: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ProviderDeployment> for DeploymentEntry {
    fn from(d: ProviderDeployment) -> Self {
        Self {
            id: d.id,
            state: d.state,
            url: d.url,
            trigger: None,
            created_at: d.created_at,
        }
    }
}

impl From<Deployment> for DeploymentEntry {
    fn from(d: Deployment) -> Self {
        Self {
            id: d.id.to_string(),
            state: d.status,
            url: d.url,
            trigger: Some(d.trigger.to_string()),
            created_at: Some(d.created_at),
        }
    }
}

/// Body for `GET /clients/{id}/deployments`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeploymentListResponse {
    /// "provider" when the entries are live, "recorded" otherwise.
    pub source: String,
    pub deployments: Vec<DeploymentEntry>,
}

impl From<DeploymentHistory> for DeploymentListResponse {
    fn from(history: DeploymentHistory) -> Self {
        match history {
            DeploymentHistory::Live(entries) => Self {
                source: "provider".to_string(),
                deployments: entries.into_iter().map(DeploymentEntry::from).collect(),
            },
            DeploymentHistory::Recorded(entries) => Self {
                source: "recorded".to_string(),
                deployments: entries.into_iter().map(DeploymentEntry::from).collect(),
            },
        }
    }
}

/// Body for `POST /clients/{id}/redeploy`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RedeployResponse {
    #[schema(value_type = uuid::Uuid)]
    pub deployment_id: siteforge_core::DeploymentId,
    pub deployment_url: String,
    pub state: String,
    /// True when the deployment provider is unconfigured and the result is a
    /// placeholder.
    pub mock: bool,
}

/// Body for `GET /clients`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClientListResponse {
    pub clients: Vec<ClientResponse>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl From<ClientPage> for ClientListResponse {
    fn from(page: ClientPage) -> Self {
        Self {
            clients: page.clients.into_iter().map(ClientResponse::from).collect(),
            total: page.total,
            page: page.page,
            per_page: page.per_page,
        }
    }
}

/// Body for `GET /stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_clients: u64,
    pub active: u64,
    pub suspended: u64,
    pub failed: u64,
    pub deploying: u64,
    pub deleted: u64,
    pub total_deployments: u64,
}

impl From<PlatformStats> for StatsResponse {
    fn from(stats: PlatformStats) -> Self {
        Self {
            total_clients: stats.total_clients,
            active: stats.active,
            suspended: stats.suspended,
            failed: stats.failed,
            deploying: stats.deploying,
            deleted: stats.deleted,
            total_deployments: stats.total_deployments,
        }
    }
}
