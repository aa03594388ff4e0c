//! Orchestrator configuration.
//!
//! Passed in at construction; the orchestrator never reads process-global
//! state, which keeps the workflow testable.

use std::time::Duration;

/// Configuration for provisioning runs.
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    /// Base domain client sites are served under (e.g. "siteforge.app").
    pub base_domain: String,

    /// Path polled on the deployed site to decide readiness.
    pub readiness_path: String,

    /// Interval between readiness polls (seconds).
    pub readiness_poll_interval_secs: u64,

    /// Maximum total time to wait for readiness (seconds).
    pub readiness_timeout_secs: u64,

    /// Per-call budget for external adapter calls (seconds).
    pub adapter_timeout_secs: u64,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            base_domain: "siteforge.app".to_string(),
            readiness_path: "/".to_string(),
            readiness_poll_interval_secs: 2,
            readiness_timeout_secs: 60,
            adapter_timeout_secs: 30,
        }
    }
}

impl ProvisioningConfig {
    /// Readiness poll interval as a [`Duration`].
    #[must_use]
    pub fn readiness_poll_interval(&self) -> Duration {
        Duration::from_secs(self.readiness_poll_interval_secs)
    }

    /// Readiness poll deadline as a [`Duration`].
    #[must_use]
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    /// Per-adapter-call timeout as a [`Duration`].
    #[must_use]
    pub fn adapter_timeout(&self) -> Duration {
        Duration::from_secs(self.adapter_timeout_secs)
    }

    /// Full serving domain for a client subdomain.
    #[must_use]
    pub fn site_domain(&self, subdomain: &str) -> String {
        format!("{subdomain}.{}", self.base_domain)
    }

    /// Deterministic placeholder URL used when the deployment provider is
    /// not configured.
    #[must_use]
    pub fn placeholder_url(&self, subdomain: &str) -> String {
        format!("https://{subdomain}-mock.{}", self.base_domain)
    }
}
