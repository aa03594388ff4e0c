//! Tenant teardown.
//!
//! Deprovisioning reuses the compensation walk: every compensable pipeline
//! step is released in reverse order, probing for existence first, so
//! running it twice is safe. The client record is archived to the terminal
//! `deleted` status rather than removed, which keeps the audit trail and
//! frees the domain for reuse.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use siteforge_store::{Client, ClientStatus, ClientStore};

use crate::adapters::{Adapters, DatastoreHandle};
use crate::audit::{AuditLog, LogEntry};
use crate::compensation::{compensate_step, ResourceRefs};
use crate::config::ProvisioningConfig;
use crate::error::ProvisionError;
use crate::locks::DomainLocks;
use crate::step::PIPELINE;

/// Result of a deprovisioning run.
#[derive(Debug)]
pub struct DeprovisionOutcome {
    /// Whether every resource was released. The record is archived either
    /// way; a `false` here means at least one external resource needs
    /// manual cleanup.
    pub success: bool,
    /// The client that was deprovisioned.
    pub client_id: Uuid,
    /// Steps whose resource could not be released.
    pub failed_steps: Vec<&'static str>,
    /// Full audit trail of the run.
    pub log: Vec<LogEntry>,
}

/// Tears tenants down, idempotently.
pub struct DeprovisioningOrchestrator {
    store: Arc<dyn ClientStore>,
    adapters: Adapters,
    config: ProvisioningConfig,
    locks: DomainLocks,
}

impl DeprovisioningOrchestrator {
    #[must_use]
    pub fn new(
        store: Arc<dyn ClientStore>,
        adapters: Adapters,
        config: ProvisioningConfig,
        locks: DomainLocks,
    ) -> Self {
        Self {
            store,
            adapters,
            config,
            locks,
        }
    }

    /// Release every external resource a client owns and archive its record.
    ///
    /// Safe to call repeatedly: resources already released are reported as
    /// already absent and the run still succeeds.
    pub async fn deprovision(&self, client_id: Uuid) -> Result<DeprovisionOutcome, ProvisionError> {
        let client = self
            .store
            .get_client(client_id)
            .await?
            .ok_or(ProvisionError::ClientNotFound(client_id))?;

        let Some(_guard) = self.locks.try_acquire(&client.domain) else {
            return Err(ProvisionError::Conflict(client.domain));
        };

        let already_deleted = client.status == ClientStatus::Deleted;
        if !already_deleted {
            self.store
                .set_status(client_id, ClientStatus::Deprovisioning)
                .await?;
        }

        let mut log = AuditLog::new();
        let refs = resource_refs(&self.config, &client);
        let mut failed_steps = Vec::new();

        for step in PIPELINE.iter().rev() {
            if !step.compensable {
                continue;
            }
            if !compensate_step(step.name, &refs, &self.adapters, &mut log).await {
                failed_steps.push(step.name.as_str());
            }
        }

        // Archive regardless of release failures so the domain frees up and
        // the record keeps the history; leftovers are in `failed_steps`.
        if !already_deleted {
            self.store
                .set_status(client_id, ClientStatus::Deleted)
                .await?;
        }

        let success = failed_steps.is_empty();
        if success {
            info!(client_id = %client_id, domain = %refs.domain, "client deprovisioned");
        } else {
            warn!(
                client_id = %client_id,
                domain = %refs.domain,
                failed_steps = ?failed_steps,
                "client archived with unreleased resources"
            );
        }

        Ok(DeprovisionOutcome {
            success,
            client_id,
            failed_steps,
            log: log.into_entries(),
        })
    }
}

/// Reconstruct the resource references for a registered client. The
/// datastore identifier follows the `db-{domain}` provisioning convention.
fn resource_refs(config: &ProvisioningConfig, client: &Client) -> ResourceRefs {
    ResourceRefs {
        domain: client.domain.clone(),
        site_domain: config.site_domain(&client.domain),
        datastore: Some(DatastoreHandle {
            id: format!("db-{}", client.domain),
            url: client.datastore_url.clone(),
        }),
        project_id: client.project_id.clone(),
    }
}
