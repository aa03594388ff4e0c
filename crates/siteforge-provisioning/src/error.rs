//! Error types for provisioning workflows.

use thiserror::Error;

/// One violated field in a provisioning request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    /// Request field name.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl FieldError {
    /// Build a field error.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors a provisioning or deprovisioning run can surface to callers.
///
/// Individual adapter failures never escape the orchestrator; they are
/// converted to log entries at the step boundary and only these aggregate
/// variants cross the component boundary.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The request was malformed. No side effects occurred.
    #[error("Validation failed: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),

    /// A critical pipeline step failed; the pipeline aborted.
    #[error("Step '{step}' failed: {reason}")]
    CriticalStep {
        step: &'static str,
        reason: String,
    },

    /// Another run holds the lock for this domain.
    #[error("Domain already provisioning: {0}")]
    Conflict(String),

    /// The run was cancelled between steps.
    #[error("Provisioning cancelled before step '{next_step}'")]
    Cancelled { next_step: &'static str },

    /// Referenced client does not exist.
    #[error("Client {0} not found")]
    ClientNotFound(uuid::Uuid),

    /// Durable state failure outside the step pipeline.
    #[error("Store error: {0}")]
    Store(#[from] siteforge_store::StoreError),
}

/// Errors returned by adapter implementations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The adapter has no provider configuration.
    ///
    /// Callers should consult `availability()` first; this exists so an
    /// unconfigured adapter fails loudly if called anyway.
    #[error("Provider not configured")]
    NotConfigured,

    /// Transport-level failure talking to the provider.
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Provider returned {status}: {message}")]
    Provider { status: u16, message: String },
}

/// Result type for adapter calls.
pub type AdapterResult<T> = std::result::Result<T, AdapterError>;
