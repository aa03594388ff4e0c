//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: a present-but-invalid value aborts startup with a
//! clear message. Absent provider credentials are not an error; the matching
//! adapter simply reports itself unconfigured and the pipeline falls back to
//! placeholders.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use siteforge_provisioning::adapters::ProviderConfig;
use siteforge_provisioning::ProvisioningConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{url_var} is set but {token_var} is missing")]
    MissingToken {
        url_var: &'static str,
        token_var: &'static str,
    },
}

/// Runtime configuration for the control-plane server.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,

    /// Postgres connection string. When unset the server runs on the
    /// in-memory store and loses all state on restart.
    pub database_url: Option<String>,

    pub base_domain: String,
    pub readiness_path: String,
    pub readiness_poll_interval_secs: u64,
    pub readiness_timeout_secs: u64,
    pub adapter_timeout_secs: u64,

    pub datastore_api: Option<ProviderConfig>,
    pub deploy_api: Option<ProviderConfig>,
    pub domains_api: Option<ProviderConfig>,
    pub identity_bootstrap_enabled: bool,
    pub welcome_webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parsed("PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            database_url: optional("DATABASE_URL"),
            base_domain: optional("BASE_DOMAIN").unwrap_or_else(|| "siteforge.app".to_string()),
            readiness_path: optional("READINESS_PATH").unwrap_or_else(|| "/".to_string()),
            readiness_poll_interval_secs: parsed("READINESS_POLL_INTERVAL_SECS", 2)?,
            readiness_timeout_secs: parsed("READINESS_TIMEOUT_SECS", 60)?,
            adapter_timeout_secs: parsed("ADAPTER_TIMEOUT_SECS", 30)?,
            datastore_api: provider("DATASTORE_API_URL", "DATASTORE_API_TOKEN")?,
            deploy_api: provider("DEPLOY_API_URL", "DEPLOY_API_TOKEN")?,
            domains_api: provider("DOMAINS_API_URL", "DOMAINS_API_TOKEN")?,
            identity_bootstrap_enabled: parsed("IDENTITY_BOOTSTRAP_ENABLED", false)?,
            welcome_webhook_url: optional("WELCOME_WEBHOOK_URL"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pipeline tuning knobs passed through to the orchestrators.
    pub fn provisioning(&self) -> ProvisioningConfig {
        ProvisioningConfig {
            base_domain: self.base_domain.clone(),
            readiness_path: self.readiness_path.clone(),
            readiness_poll_interval_secs: self.readiness_poll_interval_secs,
            readiness_timeout_secs: self.readiness_timeout_secs,
            adapter_timeout_secs: self.adapter_timeout_secs,
        }
    }
}

fn optional(var: &'static str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(var) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// A provider is configured only when both its URL and token are present.
/// A URL without a token is treated as a misconfiguration rather than
/// silently running unauthenticated.
fn provider(
    url_var: &'static str,
    token_var: &'static str,
) -> Result<Option<ProviderConfig>, ConfigError> {
    match (optional(url_var), optional(token_var)) {
        (Some(url), Some(token)) => Ok(Some(ProviderConfig::new(url, token))),
        (Some(_), None) => Err(ConfigError::MissingToken { url_var, token_var }),
        (None, _) => Ok(None),
    }
}
