//! Append-only audit log for provisioning runs.
//!
//! The log is the sole source of truth for "what happened" during a run and
//! is returned to the caller whether or not the run succeeded. `Fallback` is
//! a distinct level so that "ran with a placeholder backing service" can be
//! alerted on even though the run as a whole reports success.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::step::StepName;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Normal progress.
    Info,
    /// A non-critical step failed; the pipeline continued.
    Warning,
    /// A placeholder was substituted for an unconfigured provider.
    Fallback,
    /// A critical step failed; the pipeline aborted.
    Error,
}

/// One audit log entry, one per step outcome.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: LogLevel,
    /// Pipeline step the entry belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<&'static str>,
    /// Human-readable message.
    pub message: String,
}

/// Append-only log owned by a single orchestrator run.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<LogEntry>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, level: LogLevel, step: Option<StepName>, message: impl Into<String>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            level,
            step: step.map(StepName::as_str),
            message: message.into(),
        });
    }

    /// Append an info entry for a step.
    pub fn info(&mut self, step: StepName, message: impl Into<String>) {
        self.push(LogLevel::Info, Some(step), message);
    }

    /// Append a warning entry for a step.
    pub fn warning(&mut self, step: StepName, message: impl Into<String>) {
        self.push(LogLevel::Warning, Some(step), message);
    }

    /// Append a fallback entry for a step.
    pub fn fallback(&mut self, step: StepName, message: impl Into<String>) {
        self.push(LogLevel::Fallback, Some(step), message);
    }

    /// Append an error entry for a step.
    pub fn error(&mut self, step: StepName, message: impl Into<String>) {
        self.push(LogLevel::Error, Some(step), message);
    }

    /// Read access to the entries.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Consume the log, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    /// Whether any entry was recorded at [`LogLevel::Fallback`].
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_append_only_and_ordered() {
        let mut log = AuditLog::new();
        log.info(StepName::Validate, "starting");
        log.warning(StepName::ConfigureDomain, "dns provider refused");
        log.error(StepName::Deploy, "build failed");

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].step, Some("validate"));
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[2].level, LogLevel::Error);
    }

    #[test]
    fn test_fallback_is_distinct_from_success_and_failure() {
        let mut log = AuditLog::new();
        log.info(StepName::ProvisionDatastore, "starting");
        assert!(!log.has_fallback());

        log.fallback(StepName::ProvisionDatastore, "placeholder datastore substituted");
        assert!(log.has_fallback());
    }

    #[test]
    fn test_entry_serializes_level_lowercase() {
        let mut log = AuditLog::new();
        log.fallback(StepName::Deploy, "mock deployment");
        let json = serde_json::to_string(&log.entries()[0]).unwrap();
        assert!(json.contains("\"level\":\"fallback\""));
        assert!(json.contains("\"step\":\"deploy\""));
    }
}
