//! The provisioning orchestrator.
//!
//! Runs [`PIPELINE`](crate::step::PIPELINE) in order against a single
//! request. Every external effect goes through the adapter traits, every
//! step outcome lands in the run's [`AuditLog`], and the only durable write
//! is the final register-client step, so an aborted run never leaves a
//! half-registered tenant behind. When a critical step fails (or the run is
//! cancelled between steps), the completed compensable steps are walked in
//! reverse to release what was already allocated.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use siteforge_store::{
    Client, ClientStatus, ClientStore, Deployment, DeploymentTrigger, NewClient, StoreError,
};

use crate::adapters::{
    Adapters, AdminCredentials, DatastoreHandle, DeploySpec, ProviderDeployment,
};
use crate::audit::{AuditLog, LogEntry, LogLevel};
use crate::compensation::{compensate_step, ResourceRefs};
use crate::config::ProvisioningConfig;
use crate::error::{AdapterResult, ProvisionError};
use crate::locks::{DomainGuard, DomainLocks};
use crate::readiness::ReadinessProbe;
use crate::request::{ProvisionRequest, RequestValidator};
use crate::step::{StepName, PIPELINE};
use crate::template::{Template, TemplateResolver};

/// Result of a provisioning run, returned to the caller in full whether or
/// not the run succeeded. The log always covers exactly the steps that ran.
#[derive(Debug)]
pub struct ProvisionOutcome {
    /// Whether the tenant was registered.
    pub success: bool,
    /// Identifier of the registered client, on success.
    pub client_id: Option<Uuid>,
    /// URL the site serves on (real or placeholder).
    pub deployment_url: Option<String>,
    /// Admin interface URL.
    pub admin_url: Option<String>,
    /// Datastore connection reference.
    pub datastore_url: Option<String>,
    /// Why the run failed, on failure.
    pub error: Option<ProvisionError>,
    /// Full audit trail of the run.
    pub log: Vec<LogEntry>,
}

/// Result of a redeploy of an existing client.
#[derive(Debug)]
pub struct RedeployOutcome {
    /// The recorded history entry.
    pub deployment: Deployment,
    /// Whether the deployment provider was unconfigured and the result is a
    /// placeholder.
    pub mock: bool,
}

/// Deployment history for a client: live from the provider when one is
/// configured, otherwise the locally recorded rows.
#[derive(Debug)]
pub enum DeploymentHistory {
    Live(Vec<ProviderDeployment>),
    Recorded(Vec<Deployment>),
}

/// Mutable state of one provisioning run.
struct RunContext {
    request: ProvisionRequest,
    site_domain: String,
    template: Option<Template>,
    plan: Option<String>,
    datastore: Option<DatastoreHandle>,
    env: BTreeMap<String, String>,
    deployment_url: Option<String>,
    project_id: Option<String>,
    deploy_state: String,
    admin_url: Option<String>,
    completed: Vec<StepName>,
    _guard: Option<DomainGuard>,
}

impl RunContext {
    fn new(request: ProvisionRequest, site_domain: String) -> Self {
        Self {
            request,
            site_domain,
            template: None,
            plan: None,
            datastore: None,
            env: BTreeMap::new(),
            deployment_url: None,
            project_id: None,
            deploy_state: String::new(),
            admin_url: None,
            completed: Vec::new(),
            _guard: None,
        }
    }

    fn resources(&self) -> ResourceRefs {
        ResourceRefs {
            domain: self.request.domain.clone(),
            site_domain: self.site_domain.clone(),
            datastore: self.datastore.clone(),
            project_id: self.project_id.clone(),
        }
    }
}

/// Orchestrates provisioning runs and redeployments.
pub struct ProvisioningOrchestrator {
    store: Arc<dyn ClientStore>,
    adapters: Adapters,
    templates: TemplateResolver,
    config: ProvisioningConfig,
    locks: DomainLocks,
    readiness: ReadinessProbe,
}

impl ProvisioningOrchestrator {
    #[must_use]
    pub fn new(
        store: Arc<dyn ClientStore>,
        adapters: Adapters,
        templates: TemplateResolver,
        config: ProvisioningConfig,
    ) -> Self {
        let readiness = ReadinessProbe::new(
            config.readiness_poll_interval(),
            config.readiness_timeout(),
        );
        Self {
            store,
            adapters,
            templates,
            config,
            locks: DomainLocks::new(),
            readiness,
        }
    }

    /// The template catalog this orchestrator provisions from.
    #[must_use]
    pub fn templates(&self) -> &TemplateResolver {
        &self.templates
    }

    /// Handle to the domain lock registry, shared with the deprovisioner so
    /// a provision and a deprovision of the same domain cannot interleave.
    #[must_use]
    pub fn locks(&self) -> DomainLocks {
        self.locks.clone()
    }

    /// Run the full pipeline for one request.
    ///
    /// Cancellation is honoured between steps: a step that has started runs
    /// to completion, then the completed compensable steps are released.
    pub async fn provision(
        &self,
        request: ProvisionRequest,
        cancel: CancellationToken,
    ) -> ProvisionOutcome {
        let site_domain = self.config.site_domain(&request.domain);
        let mut ctx = RunContext::new(request, site_domain);
        let mut log = AuditLog::new();

        let result = self.run(&mut ctx, &mut log, &cancel).await;

        match result {
            Ok(client) => {
                if log.has_fallback() {
                    warn!(
                        client_id = %client.id,
                        domain = %client.domain,
                        "client provisioned with placeholder backing services"
                    );
                } else {
                    info!(client_id = %client.id, domain = %client.domain, "client provisioned");
                }
                ProvisionOutcome {
                    success: true,
                    client_id: Some(client.id),
                    deployment_url: Some(client.deployment_url),
                    admin_url: Some(client.admin_url),
                    datastore_url: Some(client.datastore_url),
                    error: None,
                    log: log.into_entries(),
                }
            }
            Err(err) => {
                warn!(domain = %ctx.request.domain, error = %err, "provisioning failed");
                log.push(LogLevel::Error, None, err.to_string());
                self.compensate_completed(&ctx, &mut log).await;
                ProvisionOutcome {
                    success: false,
                    client_id: None,
                    deployment_url: ctx.deployment_url.clone(),
                    admin_url: ctx.admin_url.clone(),
                    datastore_url: ctx.datastore.as_ref().map(|d| d.url.clone()),
                    error: Some(err),
                    log: log.into_entries(),
                }
            }
        }
    }

    async fn run(
        &self,
        ctx: &mut RunContext,
        log: &mut AuditLog,
        cancel: &CancellationToken,
    ) -> Result<Client, ProvisionError> {
        let started = start_step(log, StepName::Validate);
        self.step_validate(ctx, log).await?;
        finish_step(log, StepName::Validate, started);
        ctx.completed.push(StepName::Validate);

        check_cancelled(cancel, StepName::ResolveTemplate)?;
        let started = start_step(log, StepName::ResolveTemplate);
        self.step_resolve_template(ctx, log)?;
        finish_step(log, StepName::ResolveTemplate, started);
        ctx.completed.push(StepName::ResolveTemplate);

        // The lock covers every step that allocates external resources.
        check_cancelled(cancel, StepName::ProvisionDatastore)?;
        match self.locks.try_acquire(&ctx.request.domain) {
            Some(guard) => ctx._guard = Some(guard),
            None => return Err(ProvisionError::Conflict(ctx.request.domain.clone())),
        }

        let started = start_step(log, StepName::ProvisionDatastore);
        self.step_provision_datastore(ctx, log).await?;
        finish_step(log, StepName::ProvisionDatastore, started);
        ctx.completed.push(StepName::ProvisionDatastore);

        check_cancelled(cancel, StepName::RenderEnvironment)?;
        let started = start_step(log, StepName::RenderEnvironment);
        self.step_render_environment(ctx, log)?;
        finish_step(log, StepName::RenderEnvironment, started);
        ctx.completed.push(StepName::RenderEnvironment);

        check_cancelled(cancel, StepName::Deploy)?;
        let started = start_step(log, StepName::Deploy);
        self.step_deploy(ctx, log).await?;
        finish_step(log, StepName::Deploy, started);
        ctx.completed.push(StepName::Deploy);

        check_cancelled(cancel, StepName::ConfigureDomain)?;
        let started = start_step(log, StepName::ConfigureDomain);
        let attached = self.step_configure_domain(ctx, log).await;
        finish_step(log, StepName::ConfigureDomain, started);
        if attached {
            ctx.completed.push(StepName::ConfigureDomain);
        }

        check_cancelled(cancel, StepName::BootstrapAdmin)?;
        let started = start_step(log, StepName::BootstrapAdmin);
        self.step_bootstrap_admin(ctx, log).await;
        finish_step(log, StepName::BootstrapAdmin, started);
        ctx.completed.push(StepName::BootstrapAdmin);

        check_cancelled(cancel, StepName::RegisterClient)?;
        let started = start_step(log, StepName::RegisterClient);
        let client = self.step_register_client(ctx, log).await?;
        finish_step(log, StepName::RegisterClient, started);
        ctx.completed.push(StepName::RegisterClient);
        Ok(client)
    }

    async fn step_validate(
        &self,
        ctx: &RunContext,
        log: &mut AuditLog,
    ) -> Result<(), ProvisionError> {
        let step = StepName::Validate;
        let report = RequestValidator::validate(&ctx.request, &self.templates);
        if !report.is_valid() {
            for field_error in &report.errors {
                log.error(step, field_error.to_string());
            }
            return Err(ProvisionError::Validation(report.errors));
        }

        // Domain uniqueness among live clients. A second check happens at
        // register time under the store's own constraint; this one fails the
        // obvious case before anything is allocated.
        if self
            .store
            .find_by_domain(&ctx.request.domain)
            .await?
            .is_some()
        {
            log.error(
                step,
                format!("domain '{}' is already taken", ctx.request.domain),
            );
            return Err(ProvisionError::Conflict(ctx.request.domain.clone()));
        }

        log.info(step, "request validated");
        Ok(())
    }

    fn step_resolve_template(
        &self,
        ctx: &mut RunContext,
        log: &mut AuditLog,
    ) -> Result<(), ProvisionError> {
        let step = StepName::ResolveTemplate;
        let Some(template) = self.templates.resolve(&ctx.request.template) else {
            // Validation already checked existence; this only trips if the
            // catalog changed under us mid-run.
            log.error(step, format!("template '{}' vanished", ctx.request.template));
            return Err(ProvisionError::CriticalStep {
                step: step.as_str(),
                reason: format!("unknown template '{}'", ctx.request.template),
            });
        };
        let plan = ctx
            .request
            .plan
            .clone()
            .unwrap_or_else(|| template.default_plan.clone());
        log.info(
            step,
            format!("resolved template '{}' with plan '{plan}'", template.id),
        );
        ctx.template = Some(template.clone());
        ctx.plan = Some(plan);
        Ok(())
    }

    async fn step_provision_datastore(
        &self,
        ctx: &mut RunContext,
        log: &mut AuditLog,
    ) -> Result<(), ProvisionError> {
        let step = StepName::ProvisionDatastore;
        if self.adapters.datastore.availability().is_configured() {
            let handle = self
                .adapter_call(step, self.adapters.datastore.provision(&ctx.request.domain))
                .await?;
            log.info(step, format!("datastore '{}' provisioned", handle.id));
            ctx.datastore = Some(handle);
        } else {
            let handle = DatastoreHandle {
                id: format!("db-{}", ctx.request.domain),
                url: format!(
                    "postgres://db-{}-mock.{}/app",
                    ctx.request.domain, self.config.base_domain
                ),
            };
            log.fallback(
                step,
                format!(
                    "datastore provider not configured, using placeholder '{}'",
                    handle.url
                ),
            );
            ctx.datastore = Some(handle);
        }
        Ok(())
    }

    fn step_render_environment(
        &self,
        ctx: &mut RunContext,
        log: &mut AuditLog,
    ) -> Result<(), ProvisionError> {
        let step = StepName::RenderEnvironment;
        let (Some(template), Some(datastore)) = (&ctx.template, &ctx.datastore) else {
            return Err(ProvisionError::CriticalStep {
                step: step.as_str(),
                reason: "pipeline state incomplete".to_string(),
            });
        };
        let overrides: BTreeMap<String, bool> = ctx
            .request
            .features
            .clone()
            .unwrap_or_default()
            .into_iter()
            .collect();
        ctx.env = crate::env_config::render_environment(
            &self.config,
            &ctx.request.name,
            &ctx.request.domain,
            template,
            &overrides,
            &datastore.url,
        );
        log.info(step, format!("rendered {} environment entries", ctx.env.len()));
        Ok(())
    }

    async fn step_deploy(
        &self,
        ctx: &mut RunContext,
        log: &mut AuditLog,
    ) -> Result<(), ProvisionError> {
        let step = StepName::Deploy;
        if self.adapters.deployment.availability().is_configured() {
            let template = ctx
                .template
                .as_ref()
                .map(|t| t.id.clone())
                .unwrap_or_default();
            let spec = DeploySpec {
                site_name: ctx.request.name.clone(),
                domain: ctx.request.domain.clone(),
                template,
                env: ctx.env.clone(),
            };
            let deployment = self
                .adapter_call(step, self.adapters.deployment.deploy(&spec))
                .await?;
            log.info(
                step,
                format!(
                    "deployed project '{}' at {}",
                    deployment.project_id, deployment.url
                ),
            );
            ctx.deployment_url = Some(deployment.url);
            ctx.project_id = Some(deployment.project_id);
            ctx.deploy_state = deployment.state;
        } else {
            let url = self.config.placeholder_url(&ctx.request.domain);
            log.fallback(
                step,
                format!("deployment provider not configured, using placeholder '{url}'"),
            );
            ctx.deployment_url = Some(url);
            ctx.deploy_state = "MOCK".to_string();
        }
        Ok(())
    }

    /// Returns whether the domain was actually attached, so compensation
    /// only detaches what this run attached.
    async fn step_configure_domain(&self, ctx: &mut RunContext, log: &mut AuditLog) -> bool {
        let step = StepName::ConfigureDomain;
        if !self.adapters.domains.availability().is_configured() {
            log.fallback(
                step,
                format!(
                    "domain provider not configured, '{}' not attached",
                    ctx.site_domain
                ),
            );
            return false;
        }
        let Some(project_id) = ctx.project_id.clone() else {
            log.warning(step, "no provider project to attach the domain to");
            return false;
        };
        match self
            .adapter_call_soft(self.adapters.domains.attach(&project_id, &ctx.site_domain))
            .await
        {
            Ok(()) => {
                log.info(step, format!("domain '{}' attached", ctx.site_domain));
                true
            }
            Err(reason) => {
                // Non-critical: the site serves on the provider URL either way.
                log.warning(
                    step,
                    format!("failed to attach domain '{}': {reason}", ctx.site_domain),
                );
                false
            }
        }
    }

    async fn step_bootstrap_admin(&self, ctx: &mut RunContext, log: &mut AuditLog) {
        let step = StepName::BootstrapAdmin;
        let deployment_url = ctx.deployment_url.clone().unwrap_or_default();
        let admin_url = format!("{}/admin", deployment_url.trim_end_matches('/'));
        ctx.admin_url = Some(admin_url.clone());

        let credentials = self.bootstrap_admin_account(ctx, log, &admin_url).await;

        // The welcome goes out whether or not an admin exists; without one it
        // points the owner at first-time setup.
        if self.adapters.notifications.availability().is_configured() {
            match self
                .adapter_call_soft(self.adapters.notifications.send_welcome(
                    &ctx.request.contact_email,
                    &ctx.request.name,
                    credentials.as_ref(),
                ))
                .await
            {
                Ok(()) => log.info(step, "welcome notification sent"),
                Err(reason) => log.warning(
                    step,
                    format!("failed to send welcome notification: {reason}"),
                ),
            }
        } else {
            log.fallback(step, "notification service not configured, welcome skipped");
        }
    }

    async fn bootstrap_admin_account(
        &self,
        ctx: &RunContext,
        log: &mut AuditLog,
        admin_url: &str,
    ) -> Option<AdminCredentials> {
        let step = StepName::BootstrapAdmin;
        if !self.adapters.identity.availability().is_configured() {
            log.fallback(step, "identity bootstrap not configured, no admin created");
            return None;
        }

        // Placeholder deployments serve nothing; probing them is pointless.
        if ctx.deploy_state != "MOCK" {
            let deployment_url = ctx.deployment_url.clone().unwrap_or_default();
            let probe_url = format!(
                "{}{}",
                deployment_url.trim_end_matches('/'),
                self.config.readiness_path
            );
            if !self.readiness.wait_ready(&probe_url).await {
                log.warning(
                    step,
                    format!(
                        "site not ready after {}s, admin bootstrap skipped",
                        self.config.readiness_timeout_secs
                    ),
                );
                return None;
            }
        }

        match self
            .adapter_call_soft(self.adapters.identity.create_admin(
                admin_url,
                &ctx.request.contact_email,
                &ctx.request.name,
            ))
            .await
        {
            Ok(credentials) => {
                log.info(
                    step,
                    format!("admin account created for {}", credentials.email),
                );
                Some(credentials)
            }
            Err(reason) => {
                // Non-critical: the owner can run first-time setup manually.
                log.warning(step, format!("failed to bootstrap admin: {reason}"));
                None
            }
        }
    }

    async fn step_register_client(
        &self,
        ctx: &mut RunContext,
        log: &mut AuditLog,
    ) -> Result<Client, ProvisionError> {
        let step = StepName::RegisterClient;
        let (Some(template), Some(datastore)) = (&ctx.template, &ctx.datastore) else {
            return Err(ProvisionError::CriticalStep {
                step: step.as_str(),
                reason: "pipeline state incomplete".to_string(),
            });
        };
        let features = template.effective_features(ctx.request.features.as_ref());
        let new = NewClient {
            name: ctx.request.name.clone(),
            domain: ctx.request.domain.clone(),
            template: template.id.clone(),
            contact_email: ctx.request.contact_email.clone(),
            deployment_url: ctx.deployment_url.clone().unwrap_or_default(),
            admin_url: ctx.admin_url.clone().unwrap_or_default(),
            datastore_url: datastore.url.clone(),
            project_id: ctx.project_id.clone(),
            plan: ctx
                .plan
                .clone()
                .unwrap_or_else(|| template.default_plan.clone()),
            features: serde_json::to_value(&features).unwrap_or(serde_json::Value::Null),
        };

        let client = match self.store.insert_client(new).await {
            Ok(client) => client,
            Err(StoreError::DuplicateDomain(domain)) => {
                log.error(step, format!("domain '{domain}' is already taken"));
                return Err(ProvisionError::Conflict(domain));
            }
            Err(err) => {
                log.error(step, format!("failed to register client: {err}"));
                return Err(ProvisionError::Store(err));
            }
        };

        // The client row is durable at this point; a lost history entry must
        // not fail the run and leave an orphaned record behind.
        if let Err(err) = self
            .store
            .insert_deployment(Deployment::new(
                client.id,
                ctx.deploy_state.clone(),
                client.deployment_url.clone(),
                DeploymentTrigger::Provision,
            ))
            .await
        {
            log.warning(step, format!("failed to record initial deployment: {err}"));
            warn!(client_id = %client.id, error = %err, "initial deployment entry not recorded");
        }

        log.info(step, format!("client '{}' registered", client.id));
        Ok(client)
    }

    async fn compensate_completed(&self, ctx: &RunContext, log: &mut AuditLog) {
        let refs = ctx.resources();
        for step in PIPELINE.iter().rev() {
            if step.compensable && ctx.completed.contains(&step.name) {
                compensate_step(step.name, &refs, &self.adapters, log).await;
            }
        }
    }

    /// Run one adapter call under the per-call budget; failure or timeout
    /// aborts the pipeline as a critical step failure.
    async fn adapter_call<T>(
        &self,
        step: StepName,
        fut: impl Future<Output = AdapterResult<T>>,
    ) -> Result<T, ProvisionError> {
        match tokio::time::timeout(self.config.adapter_timeout(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(ProvisionError::CriticalStep {
                step: step.as_str(),
                reason: err.to_string(),
            }),
            Err(_) => Err(ProvisionError::CriticalStep {
                step: step.as_str(),
                reason: format!("timed out after {}s", self.config.adapter_timeout_secs),
            }),
        }
    }

    /// Same budget, but the failure stays a string for the caller to log.
    async fn adapter_call_soft<T>(
        &self,
        fut: impl Future<Output = AdapterResult<T>>,
    ) -> Result<T, String> {
        match tokio::time::timeout(self.config.adapter_timeout(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err(format!(
                "timed out after {}s",
                self.config.adapter_timeout_secs
            )),
        }
    }

    /// Trigger a new deployment of an existing client.
    pub async fn redeploy(&self, client_id: Uuid) -> Result<RedeployOutcome, ProvisionError> {
        let client = self
            .store
            .get_client(client_id)
            .await?
            .ok_or(ProvisionError::ClientNotFound(client_id))?;

        self.store
            .set_status(client_id, ClientStatus::Deploying)
            .await?;

        let (status, url, mock) = if self.adapters.deployment.availability().is_configured() {
            match &client.project_id {
                Some(project_id) => {
                    match self
                        .adapter_call_soft(self.adapters.deployment.redeploy(project_id))
                        .await
                    {
                        Ok(info) => (info.state, info.url, false),
                        Err(reason) => {
                            warn!(client_id = %client_id, reason, "redeploy failed");
                            self.store
                                .set_status(client_id, ClientStatus::Failed)
                                .await?;
                            return Err(ProvisionError::CriticalStep {
                                step: StepName::Deploy.as_str(),
                                reason,
                            });
                        }
                    }
                }
                // Registered before a real provider existed; refresh the mock.
                None => ("MOCK".to_string(), client.deployment_url.clone(), true),
            }
        } else {
            ("MOCK".to_string(), client.deployment_url.clone(), true)
        };

        let deployment = self
            .store
            .insert_deployment(Deployment::new(
                client_id,
                status,
                url,
                DeploymentTrigger::Redeploy,
            ))
            .await?;

        self.store
            .set_status(client_id, ClientStatus::Active)
            .await?;

        info!(client_id = %client_id, mock, "client redeployed");
        Ok(RedeployOutcome { deployment, mock })
    }

    /// Deployment history for a client: live provider data when available,
    /// otherwise the recorded rows.
    pub async fn deployment_history(
        &self,
        client_id: Uuid,
    ) -> Result<DeploymentHistory, ProvisionError> {
        let client = self
            .store
            .get_client(client_id)
            .await?
            .ok_or(ProvisionError::ClientNotFound(client_id))?;

        if self.adapters.deployment.availability().is_configured() {
            if let Some(project_id) = &client.project_id {
                if let Ok(live) = self
                    .adapter_call_soft(self.adapters.deployment.list_deployments(project_id))
                    .await
                {
                    return Ok(DeploymentHistory::Live(live));
                }
                // Provider unreachable; fall through to the recorded rows.
            }
        }
        let recorded = self.store.list_deployments(client_id).await?;
        Ok(DeploymentHistory::Recorded(recorded))
    }
}

fn start_step(log: &mut AuditLog, step: StepName) -> std::time::Instant {
    log.info(step, "starting");
    std::time::Instant::now()
}

fn finish_step(log: &mut AuditLog, step: StepName, started: std::time::Instant) {
    log.info(
        step,
        format!("completed in {}ms", started.elapsed().as_millis()),
    );
}

fn check_cancelled(cancel: &CancellationToken, next: StepName) -> Result<(), ProvisionError> {
    if cancel.is_cancelled() {
        return Err(ProvisionError::Cancelled {
            next_step: next.as_str(),
        });
    }
    Ok(())
}
