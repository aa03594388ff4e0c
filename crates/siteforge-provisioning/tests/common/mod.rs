//! Shared mock adapters for orchestrator integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use siteforge_provisioning::adapters::{
    Adapters, AdminCredentials, Availability, DatastoreHandle, DatastoreProvisioner, DeploySpec,
    DeploymentInfo, DeploymentService, DomainConfigurator, IdentityBootstrapper,
    NotificationService, ProviderDeployment,
};
use siteforge_provisioning::error::{AdapterError, AdapterResult};
use siteforge_provisioning::ProvisioningConfig;
use siteforge_store::error::StoreResult;
use siteforge_store::{
    Client, ClientFilter, ClientPage, ClientStatus, ClientStore, Deployment, MemoryClientStore,
    NewClient, PlatformStats, StoreError,
};
use uuid::Uuid;

fn provider_error(message: &str) -> AdapterError {
    AdapterError::Provider {
        status: 500,
        message: message.to_string(),
    }
}

#[derive(Default)]
pub struct MockDatastore {
    pub configured: bool,
    pub fail_provision: bool,
    pub fail_destroy: bool,
    pub delay: Option<Duration>,
    pub provisioned: AtomicBool,
    pub provision_calls: AtomicUsize,
    pub destroy_calls: AtomicUsize,
}

impl MockDatastore {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DatastoreProvisioner for MockDatastore {
    fn availability(&self) -> Availability {
        if self.configured {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn provision(&self, domain: &str) -> AdapterResult<DatastoreHandle> {
        self.provision_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_provision {
            return Err(provider_error("datastore quota exceeded"));
        }
        self.provisioned.store(true, Ordering::SeqCst);
        Ok(DatastoreHandle {
            id: format!("db-{domain}"),
            url: format!("postgres://db.test/{domain}"),
        })
    }

    async fn destroy(&self, _handle: &DatastoreHandle) -> AdapterResult<()> {
        self.destroy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_destroy {
            return Err(provider_error("destroy failed"));
        }
        self.provisioned.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn exists(&self, _handle: &DatastoreHandle) -> AdapterResult<bool> {
        Ok(self.provisioned.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct MockDeployment {
    pub configured: bool,
    pub fail_deploy: bool,
    pub fail_redeploy: bool,
    /// URL deployments report; defaults to a connection-refused address so
    /// readiness probing fails fast.
    pub url: Option<String>,
    pub project_live: AtomicBool,
    pub deploy_calls: AtomicUsize,
    pub redeploy_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockDeployment {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| "http://127.0.0.1:9".to_string())
    }
}

#[async_trait]
impl DeploymentService for MockDeployment {
    fn availability(&self) -> Availability {
        if self.configured {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn deploy(&self, spec: &DeploySpec) -> AdapterResult<DeploymentInfo> {
        self.deploy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deploy {
            return Err(provider_error("build failed"));
        }
        self.project_live.store(true, Ordering::SeqCst);
        Ok(DeploymentInfo {
            project_id: format!("proj-{}", spec.domain),
            deployment_id: "dep-1".to_string(),
            url: self.url(),
            state: "READY".to_string(),
        })
    }

    async fn redeploy(&self, project_id: &str) -> AdapterResult<DeploymentInfo> {
        self.redeploy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_redeploy {
            return Err(provider_error("build failed"));
        }
        Ok(DeploymentInfo {
            project_id: project_id.to_string(),
            deployment_id: "dep-2".to_string(),
            url: self.url(),
            state: "READY".to_string(),
        })
    }

    async fn list_deployments(&self, _project_id: &str) -> AdapterResult<Vec<ProviderDeployment>> {
        Ok(vec![ProviderDeployment {
            id: "dep-1".to_string(),
            state: "READY".to_string(),
            url: "http://127.0.0.1:9".to_string(),
            created_at: None,
        }])
    }

    async fn delete_project(&self, _project_id: &str) -> AdapterResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.project_live.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn project_exists(&self, _project_id: &str) -> AdapterResult<bool> {
        Ok(self.project_live.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct MockDomains {
    pub configured: bool,
    pub fail_attach: bool,
    pub attached: AtomicBool,
    pub attach_calls: AtomicUsize,
    pub detach_calls: AtomicUsize,
}

impl MockDomains {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DomainConfigurator for MockDomains {
    fn availability(&self) -> Availability {
        if self.configured {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn attach(&self, _project_id: &str, _domain: &str) -> AdapterResult<()> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_attach {
            return Err(provider_error("dns zone unavailable"));
        }
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn detach(&self, _project_id: &str, _domain: &str) -> AdapterResult<()> {
        self.detach_calls.fetch_add(1, Ordering::SeqCst);
        self.attached.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn is_attached(&self, _project_id: &str, _domain: &str) -> AdapterResult<bool> {
        Ok(self.attached.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct MockIdentity {
    pub configured: bool,
    pub create_calls: AtomicUsize,
}

#[async_trait]
impl IdentityBootstrapper for MockIdentity {
    fn availability(&self) -> Availability {
        if self.configured {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn create_admin(
        &self,
        admin_url: &str,
        email: &str,
        _site_name: &str,
    ) -> AdapterResult<AdminCredentials> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Ok(AdminCredentials {
            email: email.to_string(),
            password: "s3cret".to_string(),
            admin_url: admin_url.to_string(),
        })
    }
}

#[derive(Default)]
pub struct MockNotifications {
    pub configured: bool,
    pub send_calls: AtomicUsize,
}

#[async_trait]
impl NotificationService for MockNotifications {
    fn availability(&self) -> Availability {
        if self.configured {
            Availability::Configured
        } else {
            Availability::Unconfigured
        }
    }

    async fn send_welcome(
        &self,
        _email: &str,
        _site_name: &str,
        _admin: Option<&AdminCredentials>,
    ) -> AdapterResult<()> {
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Bundle mocks into the adapter set the orchestrator takes.
pub fn adapters(
    datastore: Arc<MockDatastore>,
    deployment: Arc<MockDeployment>,
    domains: Arc<MockDomains>,
    identity: Arc<MockIdentity>,
    notifications: Arc<MockNotifications>,
) -> Adapters {
    Adapters {
        datastore,
        deployment,
        domains,
        identity,
        notifications,
    }
}

/// Adapter set with nothing configured.
pub fn unconfigured_adapters() -> Adapters {
    adapters(
        Arc::new(MockDatastore::default()),
        Arc::new(MockDeployment::default()),
        Arc::new(MockDomains::default()),
        Arc::new(MockIdentity::default()),
        Arc::new(MockNotifications::default()),
    )
}

/// Store wrapper whose deployment-history inserts always fail, for
/// exercising the partial-write path in register-client.
#[derive(Default)]
pub struct LostHistoryStore {
    inner: MemoryClientStore,
}

#[async_trait]
impl ClientStore for LostHistoryStore {
    async fn insert_client(&self, new: NewClient) -> StoreResult<Client> {
        self.inner.insert_client(new).await
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        self.inner.get_client(id).await
    }

    async fn find_by_domain(&self, domain: &str) -> StoreResult<Option<Client>> {
        self.inner.find_by_domain(domain).await
    }

    async fn list_clients(&self, filter: &ClientFilter) -> StoreResult<ClientPage> {
        self.inner.list_clients(filter).await
    }

    async fn update_client(&self, client: &Client) -> StoreResult<Client> {
        self.inner.update_client(client).await
    }

    async fn set_status(&self, id: Uuid, next: ClientStatus) -> StoreResult<Client> {
        self.inner.set_status(id, next).await
    }

    async fn suspend(&self, id: Uuid, reason: &str) -> StoreResult<Client> {
        self.inner.suspend(id, reason).await
    }

    async fn activate(&self, id: Uuid) -> StoreResult<Client> {
        self.inner.activate(id).await
    }

    async fn insert_deployment(&self, _deployment: Deployment) -> StoreResult<Deployment> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn list_deployments(&self, client_id: Uuid) -> StoreResult<Vec<Deployment>> {
        self.inner.list_deployments(client_id).await
    }

    async fn stats(&self) -> StoreResult<PlatformStats> {
        self.inner.stats().await
    }
}

/// Spawn a local HTTP server answering 200 on every path, for readiness
/// probes. Returns its base URL.
pub async fn spawn_ok_server() -> String {
    use axum::routing::get;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let app = axum::Router::new().route("/", get(|| async { "ok" }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

/// Config with readiness polling disabled so tests never wait on probes.
pub fn test_config() -> ProvisioningConfig {
    ProvisioningConfig {
        readiness_poll_interval_secs: 0,
        readiness_timeout_secs: 0,
        ..ProvisioningConfig::default()
    }
}
