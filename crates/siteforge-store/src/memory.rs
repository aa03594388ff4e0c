//! In-memory `ClientStore` implementation.
//!
//! Used by tests and by deployments without a configured database. Keeps the
//! same invariants as the Postgres store (domain uniqueness, status machine).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::{Client, ClientStatus, Deployment};
use crate::store::{ClientFilter, ClientPage, ClientStore, NewClient, PlatformStats};

/// In-process client store backed by `RwLock`ed maps.
#[derive(Default)]
pub struct MemoryClientStore {
    clients: RwLock<HashMap<Uuid, Client>>,
    deployments: RwLock<Vec<Deployment>>,
}

impl MemoryClientStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(client: &Client, filter: &ClientFilter) -> bool {
    if let Some(status) = filter.status {
        if client.status != status {
            return false;
        }
    }
    if let Some(template) = &filter.template {
        if &client.template != template {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !client.name.to_lowercase().contains(&needle)
            && !client.domain.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn insert_client(&self, new: NewClient) -> StoreResult<Client> {
        let mut clients = self.clients.write().await;
        if clients
            .values()
            .any(|c| c.domain == new.domain && c.status != ClientStatus::Deleted)
        {
            return Err(StoreError::DuplicateDomain(new.domain));
        }

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: new.name,
            domain: new.domain,
            template: new.template,
            contact_email: new.contact_email,
            deployment_url: new.deployment_url,
            admin_url: new.admin_url,
            datastore_url: new.datastore_url,
            project_id: new.project_id,
            status: ClientStatus::Active,
            plan: new.plan,
            features: new.features,
            created_at: now,
            updated_at: now,
            suspended_at: None,
            suspension_reason: None,
        };
        clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> StoreResult<Option<Client>> {
        Ok(self.clients.read().await.get(&id).cloned())
    }

    async fn find_by_domain(&self, domain: &str) -> StoreResult<Option<Client>> {
        Ok(self
            .clients
            .read()
            .await
            .values()
            .find(|c| c.domain == domain && c.status != ClientStatus::Deleted)
            .cloned())
    }

    async fn list_clients(&self, filter: &ClientFilter) -> StoreResult<ClientPage> {
        let clients = self.clients.read().await;
        let mut matched: Vec<Client> = clients
            .values()
            .filter(|c| matches_filter(c, filter))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page() as usize)
            .collect();

        Ok(ClientPage {
            clients: page,
            total,
            page: filter.page(),
            per_page: filter.per_page(),
        })
    }

    async fn update_client(&self, client: &Client) -> StoreResult<Client> {
        let mut clients = self.clients.write().await;
        let stored = clients
            .get_mut(&client.id)
            .ok_or(StoreError::ClientNotFound(client.id))?;
        stored.name = client.name.clone();
        stored.contact_email = client.contact_email.clone();
        stored.plan = client.plan.clone();
        stored.features = client.features.clone();
        stored.deployment_url = client.deployment_url.clone();
        stored.admin_url = client.admin_url.clone();
        stored.project_id = client.project_id.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn set_status(&self, id: Uuid, next: ClientStatus) -> StoreResult<Client> {
        let mut clients = self.clients.write().await;
        let stored = clients.get_mut(&id).ok_or(StoreError::ClientNotFound(id))?;
        if !stored.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: stored.status,
                to: next,
            });
        }
        stored.status = next;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn suspend(&self, id: Uuid, reason: &str) -> StoreResult<Client> {
        let mut clients = self.clients.write().await;
        let stored = clients.get_mut(&id).ok_or(StoreError::ClientNotFound(id))?;
        if !stored.status.can_transition_to(ClientStatus::Suspended) {
            return Err(StoreError::InvalidTransition {
                from: stored.status,
                to: ClientStatus::Suspended,
            });
        }
        stored.status = ClientStatus::Suspended;
        stored.suspended_at = Some(Utc::now());
        stored.suspension_reason = Some(reason.to_string());
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn activate(&self, id: Uuid) -> StoreResult<Client> {
        let mut clients = self.clients.write().await;
        let stored = clients.get_mut(&id).ok_or(StoreError::ClientNotFound(id))?;
        if !stored.status.can_transition_to(ClientStatus::Active) {
            return Err(StoreError::InvalidTransition {
                from: stored.status,
                to: ClientStatus::Active,
            });
        }
        stored.status = ClientStatus::Active;
        stored.suspended_at = None;
        stored.suspension_reason = None;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn insert_deployment(&self, deployment: Deployment) -> StoreResult<Deployment> {
        self.deployments.write().await.push(deployment.clone());
        Ok(deployment)
    }

    async fn list_deployments(&self, client_id: Uuid) -> StoreResult<Vec<Deployment>> {
        let mut rows: Vec<Deployment> = self
            .deployments
            .read()
            .await
            .iter()
            .filter(|d| d.client_id == client_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn stats(&self) -> StoreResult<PlatformStats> {
        let clients = self.clients.read().await;
        let mut stats = PlatformStats {
            total_clients: clients.len() as u64,
            total_deployments: self.deployments.read().await.len() as u64,
            ..Default::default()
        };
        for client in clients.values() {
            match client.status {
                ClientStatus::Active => stats.active += 1,
                ClientStatus::Suspended => stats.suspended += 1,
                ClientStatus::Failed => stats.failed += 1,
                ClientStatus::Deploying => stats.deploying += 1,
                ClientStatus::Deleted => stats.deleted += 1,
                _ => {}
            }
        }
        Ok(stats)
    }
}
