//! Compensation: releasing external resources a run has allocated.
//!
//! Used in two places with the same semantics: a failed provisioning run
//! compensates the steps that completed before the failure, and a
//! deprovisioning run compensates everything a finished tenant owns. Both
//! walk [`PIPELINE`](crate::step::PIPELINE) in reverse, visiting only
//! compensable steps, and probe for existence before destroying so a second
//! walk over the same resources is a no-op.

use crate::adapters::{Adapters, DatastoreHandle};
use crate::audit::AuditLog;
use crate::step::StepName;
use tracing::warn;

/// References to the external resources a run has (or may have) allocated.
#[derive(Debug, Clone)]
pub struct ResourceRefs {
    /// Subdomain of the site.
    pub domain: String,
    /// Full serving domain attached to the deployment.
    pub site_domain: String,
    /// Datastore allocated in the provision-datastore step, if any.
    pub datastore: Option<DatastoreHandle>,
    /// Provider project created in the deploy step, if any.
    pub project_id: Option<String>,
}

/// Release the resource behind one compensable step.
///
/// Returns `true` when the resource is gone afterwards, whether it was
/// destroyed just now or was already absent. An unconfigured adapter means
/// nothing real was ever allocated, so the resource counts as absent.
pub async fn compensate_step(
    step: StepName,
    refs: &ResourceRefs,
    adapters: &Adapters,
    log: &mut AuditLog,
) -> bool {
    match step {
        StepName::ProvisionDatastore => compensate_datastore(refs, adapters, log).await,
        StepName::Deploy => compensate_deployment(refs, adapters, log).await,
        StepName::ConfigureDomain => compensate_domain(refs, adapters, log).await,
        _ => true,
    }
}

async fn compensate_datastore(
    refs: &ResourceRefs,
    adapters: &Adapters,
    log: &mut AuditLog,
) -> bool {
    let step = StepName::ProvisionDatastore;
    if !adapters.datastore.availability().is_configured() {
        log.info(step, "datastore provider not configured, nothing to release");
        return true;
    }
    let Some(handle) = &refs.datastore else {
        log.info(step, "no datastore allocated, nothing to release");
        return true;
    };
    match adapters.datastore.exists(handle).await {
        Ok(false) => {
            log.info(step, format!("datastore '{}' already absent", handle.id));
            true
        }
        Ok(true) => match adapters.datastore.destroy(handle).await {
            Ok(()) => {
                log.info(step, format!("datastore '{}' destroyed", handle.id));
                true
            }
            Err(err) => {
                warn!(datastore = %handle.id, error = %err, "datastore teardown failed");
                log.error(step, format!("failed to destroy datastore '{}': {err}", handle.id));
                false
            }
        },
        Err(err) => {
            warn!(datastore = %handle.id, error = %err, "datastore probe failed");
            log.error(step, format!("failed to probe datastore '{}': {err}", handle.id));
            false
        }
    }
}

async fn compensate_deployment(
    refs: &ResourceRefs,
    adapters: &Adapters,
    log: &mut AuditLog,
) -> bool {
    let step = StepName::Deploy;
    if !adapters.deployment.availability().is_configured() {
        log.info(step, "deployment provider not configured, nothing to release");
        return true;
    }
    let Some(project_id) = &refs.project_id else {
        log.info(step, "no project created, nothing to release");
        return true;
    };
    match adapters.deployment.project_exists(project_id).await {
        Ok(false) => {
            log.info(step, format!("project '{project_id}' already absent"));
            true
        }
        Ok(true) => match adapters.deployment.delete_project(project_id).await {
            Ok(()) => {
                log.info(step, format!("project '{project_id}' deleted"));
                true
            }
            Err(err) => {
                warn!(project = %project_id, error = %err, "project teardown failed");
                log.error(step, format!("failed to delete project '{project_id}': {err}"));
                false
            }
        },
        Err(err) => {
            warn!(project = %project_id, error = %err, "project probe failed");
            log.error(step, format!("failed to probe project '{project_id}': {err}"));
            false
        }
    }
}

async fn compensate_domain(refs: &ResourceRefs, adapters: &Adapters, log: &mut AuditLog) -> bool {
    let step = StepName::ConfigureDomain;
    if !adapters.domains.availability().is_configured() {
        log.info(step, "domain provider not configured, nothing to release");
        return true;
    }
    let Some(project_id) = &refs.project_id else {
        log.info(step, "no project created, no domain to detach");
        return true;
    };
    match adapters
        .domains
        .is_attached(project_id, &refs.site_domain)
        .await
    {
        Ok(false) => {
            log.info(
                step,
                format!("domain '{}' already detached", refs.site_domain),
            );
            true
        }
        Ok(true) => match adapters
            .domains
            .detach(project_id, &refs.site_domain)
            .await
        {
            Ok(()) => {
                log.info(step, format!("domain '{}' detached", refs.site_domain));
                true
            }
            Err(err) => {
                warn!(domain = %refs.site_domain, error = %err, "domain detach failed");
                log.error(
                    step,
                    format!("failed to detach domain '{}': {err}", refs.site_domain),
                );
                false
            }
        },
        Err(err) => {
            warn!(domain = %refs.site_domain, error = %err, "domain probe failed");
            log.error(
                step,
                format!("failed to probe domain '{}': {err}", refs.site_domain),
            );
            false
        }
    }
}
