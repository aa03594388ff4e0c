//! HTTP-backed adapter implementations.
//!
//! Each adapter is constructed from an optional [`ProviderConfig`]; a `None`
//! config yields [`Availability::Unconfigured`] and every call returns
//! [`AdapterError::NotConfigured`]. The orchestrator never reaches that path
//! because it checks availability first, but the error keeps misuse loud.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::error::{AdapterError, AdapterResult};

use super::{
    AdminCredentials, Availability, DatastoreHandle, DatastoreProvisioner, DeploySpec,
    DeploymentInfo, DeploymentService, DomainConfigurator, IdentityBootstrapper,
    NotificationService, ProviderDeployment,
};

/// Connection details for one external provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// Bearer token for authentication.
    pub token: String,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

fn build_client(timeout: Duration) -> HttpClient {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

async fn check_status(response: reqwest::Response) -> AdapterResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(AdapterError::Provider {
        status: status.as_u16(),
        message,
    })
}

/// Datastore provisioner backed by a managed-database provider API.
pub struct HttpDatastoreProvisioner {
    config: Option<ProviderConfig>,
    http: HttpClient,
}

impl HttpDatastoreProvisioner {
    #[must_use]
    pub fn new(config: Option<ProviderConfig>, timeout: Duration) -> Self {
        Self {
            config,
            http: build_client(timeout),
        }
    }

    fn config(&self) -> AdapterResult<&ProviderConfig> {
        self.config.as_ref().ok_or(AdapterError::NotConfigured)
    }
}

#[derive(Deserialize)]
struct DatastoreResponse {
    id: String,
    url: String,
}

#[async_trait]
impl DatastoreProvisioner for HttpDatastoreProvisioner {
    fn availability(&self) -> Availability {
        if self.config.is_some() {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn provision(&self, domain: &str) -> AdapterResult<DatastoreHandle> {
        let config = self.config()?;
        let response = self
            .http
            .post(format!("{}/v1/databases", config.base_url))
            .bearer_auth(&config.token)
            .json(&json!({ "name": format!("db-{domain}") }))
            .send()
            .await?;
        let body: DatastoreResponse = check_status(response).await?.json().await?;
        Ok(DatastoreHandle {
            id: body.id,
            url: body.url,
        })
    }

    async fn destroy(&self, handle: &DatastoreHandle) -> AdapterResult<()> {
        let config = self.config()?;
        let response = self
            .http
            .delete(format!("{}/v1/databases/{}", config.base_url, handle.id))
            .bearer_auth(&config.token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn exists(&self, handle: &DatastoreHandle) -> AdapterResult<bool> {
        let config = self.config()?;
        let response = self
            .http
            .get(format!("{}/v1/databases/{}", config.base_url, handle.id))
            .bearer_auth(&config.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }
}

/// Deployment service backed by a hosting provider API.
pub struct HttpDeploymentService {
    config: Option<ProviderConfig>,
    http: HttpClient,
}

impl HttpDeploymentService {
    #[must_use]
    pub fn new(config: Option<ProviderConfig>, timeout: Duration) -> Self {
        Self {
            config,
            http: build_client(timeout),
        }
    }

    fn config(&self) -> AdapterResult<&ProviderConfig> {
        self.config.as_ref().ok_or(AdapterError::NotConfigured)
    }
}

#[derive(Deserialize)]
struct DeployResponse {
    project_id: String,
    deployment_id: String,
    url: String,
    state: String,
}

#[derive(Deserialize)]
struct ProviderDeploymentRow {
    id: String,
    state: String,
    url: String,
    created_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl DeploymentService for HttpDeploymentService {
    fn availability(&self) -> Availability {
        if self.config.is_some() {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn deploy(&self, spec: &DeploySpec) -> AdapterResult<DeploymentInfo> {
        let config = self.config()?;
        let response = self
            .http
            .post(format!("{}/v1/projects", config.base_url))
            .bearer_auth(&config.token)
            .json(&json!({
                "name": spec.domain,
                "site_name": spec.site_name,
                "template": spec.template,
                "env": spec.env,
            }))
            .send()
            .await?;
        let body: DeployResponse = check_status(response).await?.json().await?;
        Ok(DeploymentInfo {
            project_id: body.project_id,
            deployment_id: body.deployment_id,
            url: body.url,
            state: body.state,
        })
    }

    async fn redeploy(&self, project_id: &str) -> AdapterResult<DeploymentInfo> {
        let config = self.config()?;
        let response = self
            .http
            .post(format!(
                "{}/v1/projects/{project_id}/deployments",
                config.base_url
            ))
            .bearer_auth(&config.token)
            .send()
            .await?;
        let body: DeployResponse = check_status(response).await?.json().await?;
        Ok(DeploymentInfo {
            project_id: body.project_id,
            deployment_id: body.deployment_id,
            url: body.url,
            state: body.state,
        })
    }

    async fn list_deployments(&self, project_id: &str) -> AdapterResult<Vec<ProviderDeployment>> {
        let config = self.config()?;
        let response = self
            .http
            .get(format!(
                "{}/v1/projects/{project_id}/deployments",
                config.base_url
            ))
            .bearer_auth(&config.token)
            .send()
            .await?;
        let rows: Vec<ProviderDeploymentRow> = check_status(response).await?.json().await?;
        Ok(rows
            .into_iter()
            .map(|row| ProviderDeployment {
                id: row.id,
                state: row.state,
                url: row.url,
                created_at: row.created_at,
            })
            .collect())
    }

    async fn delete_project(&self, project_id: &str) -> AdapterResult<()> {
        let config = self.config()?;
        let response = self
            .http
            .delete(format!("{}/v1/projects/{project_id}", config.base_url))
            .bearer_auth(&config.token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn project_exists(&self, project_id: &str) -> AdapterResult<bool> {
        let config = self.config()?;
        let response = self
            .http
            .get(format!("{}/v1/projects/{project_id}", config.base_url))
            .bearer_auth(&config.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }
}

/// Domain configurator backed by the hosting provider's domain API.
pub struct HttpDomainConfigurator {
    config: Option<ProviderConfig>,
    http: HttpClient,
}

impl HttpDomainConfigurator {
    #[must_use]
    pub fn new(config: Option<ProviderConfig>, timeout: Duration) -> Self {
        Self {
            config,
            http: build_client(timeout),
        }
    }

    fn config(&self) -> AdapterResult<&ProviderConfig> {
        self.config.as_ref().ok_or(AdapterError::NotConfigured)
    }
}

#[async_trait]
impl DomainConfigurator for HttpDomainConfigurator {
    fn availability(&self) -> Availability {
        if self.config.is_some() {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn attach(&self, project_id: &str, domain: &str) -> AdapterResult<()> {
        let config = self.config()?;
        let response = self
            .http
            .post(format!(
                "{}/v1/projects/{project_id}/domains",
                config.base_url
            ))
            .bearer_auth(&config.token)
            .json(&json!({ "domain": domain }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn detach(&self, project_id: &str, domain: &str) -> AdapterResult<()> {
        let config = self.config()?;
        let response = self
            .http
            .delete(format!(
                "{}/v1/projects/{project_id}/domains/{domain}",
                config.base_url
            ))
            .bearer_auth(&config.token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn is_attached(&self, project_id: &str, domain: &str) -> AdapterResult<bool> {
        let config = self.config()?;
        let response = self
            .http
            .get(format!(
                "{}/v1/projects/{project_id}/domains/{domain}",
                config.base_url
            ))
            .bearer_auth(&config.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response).await?;
        Ok(true)
    }
}

/// Identity bootstrapper that drives the deployed site's own setup endpoint.
pub struct HttpIdentityBootstrapper {
    enabled: bool,
    http: HttpClient,
}

impl HttpIdentityBootstrapper {
    #[must_use]
    pub fn new(enabled: bool, timeout: Duration) -> Self {
        Self {
            enabled,
            http: build_client(timeout),
        }
    }
}

#[async_trait]
impl IdentityBootstrapper for HttpIdentityBootstrapper {
    fn availability(&self) -> Availability {
        if self.enabled {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn create_admin(
        &self,
        admin_url: &str,
        email: &str,
        site_name: &str,
    ) -> AdapterResult<AdminCredentials> {
        if !self.enabled {
            return Err(AdapterError::NotConfigured);
        }
        let password = super::generate_secret(20);
        let response = self
            .http
            .post(format!("{admin_url}/api/setup"))
            .json(&json!({
                "email": email,
                "password": password,
                "site_name": site_name,
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(AdminCredentials {
            email: email.to_string(),
            password,
            admin_url: admin_url.to_string(),
        })
    }
}

/// Notification service that posts to a webhook.
pub struct WebhookNotificationService {
    webhook_url: Option<String>,
    http: HttpClient,
}

impl WebhookNotificationService {
    #[must_use]
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> Self {
        Self {
            webhook_url,
            http: build_client(timeout),
        }
    }
}

#[async_trait]
impl NotificationService for WebhookNotificationService {
    fn availability(&self) -> Availability {
        if self.webhook_url.is_some() {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn send_welcome(
        &self,
        email: &str,
        site_name: &str,
        admin: Option<&AdminCredentials>,
    ) -> AdapterResult<()> {
        let url = self.webhook_url.as_ref().ok_or(AdapterError::NotConfigured)?;
        let response = self
            .http
            .post(url)
            .json(&json!({
                "to": email,
                "site_name": site_name,
                "admin_url": admin.map(|a| a.admin_url.clone()),
                "admin_email": admin.map(|a| a.email.clone()),
            }))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_config_trims_trailing_slash() {
        let config = ProviderConfig::new("https://api.example.com/", "token");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn test_unconfigured_adapters_report_unavailable() {
        let datastore = HttpDatastoreProvisioner::new(None, Duration::from_secs(5));
        assert_eq!(datastore.availability(), Availability::Unconfigured);

        let deployment = HttpDeploymentService::new(None, Duration::from_secs(5));
        assert_eq!(deployment.availability(), Availability::Unconfigured);

        let domains = HttpDomainConfigurator::new(None, Duration::from_secs(5));
        assert_eq!(domains.availability(), Availability::Unconfigured);

        let notifications = WebhookNotificationService::new(None, Duration::from_secs(5));
        assert_eq!(notifications.availability(), Availability::Unconfigured);
    }

    #[tokio::test]
    async fn test_unconfigured_call_returns_not_configured() {
        let datastore = HttpDatastoreProvisioner::new(None, Duration::from_secs(5));
        let err = datastore.provision("acme").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotConfigured));
    }
}
