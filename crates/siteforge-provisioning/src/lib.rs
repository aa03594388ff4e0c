//! Provisioning and deprovisioning orchestration for siteforge.
//!
//! The [`ProvisioningOrchestrator`] runs the ordered step pipeline that turns
//! a [`ProvisionRequest`] into a live client site: datastore, environment
//! configuration, deployment, custom domain, initial administrator, and the
//! single durable write that registers the tenant. The
//! [`DeprovisioningOrchestrator`] walks the same pipeline in reverse to tear
//! a tenant down, idempotently.
//!
//! External systems are reached only through the adapter traits in
//! [`adapters`]; every adapter reports its [`adapters::Availability`] so the
//! orchestrator can substitute deterministic placeholders in environments
//! where a real provider is not configured.

pub mod adapters;
pub mod audit;
pub mod compensation;
pub mod config;
pub mod deprovision;
pub mod env_config;
pub mod error;
pub mod locks;
pub mod orchestrator;
pub mod readiness;
pub mod request;
pub mod step;
pub mod template;

pub use audit::{AuditLog, LogEntry, LogLevel};
pub use config::ProvisioningConfig;
pub use deprovision::{DeprovisionOutcome, DeprovisioningOrchestrator};
pub use error::{FieldError, ProvisionError};
pub use orchestrator::{
    DeploymentHistory, ProvisionOutcome, ProvisioningOrchestrator, RedeployOutcome,
};
pub use request::{ProvisionRequest, RequestValidator, ValidationReport};
pub use step::{Step, StepName, PIPELINE};
pub use template::{Template, TemplateResolver};
