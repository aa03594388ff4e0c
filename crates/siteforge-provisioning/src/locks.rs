//! Per-domain exclusive locks.
//!
//! Two concurrent provisioning runs for the same domain must not both reach
//! the adapters; the loser fails fast before any side effect. The guard
//! releases on drop, so the lock is released on every exit path, including
//! panics.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Registry of domains with an in-flight provisioning or deprovisioning run.
#[derive(Debug, Clone, Default)]
pub struct DomainLocks {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl DomainLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, HashSet<String>> {
        // A poisoned lock only means another run panicked while holding the
        // mutex; the set itself is still consistent.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Try to acquire the exclusive lock for a domain.
    ///
    /// Returns `None` when another run already holds it.
    #[must_use]
    pub fn try_acquire(&self, domain: &str) -> Option<DomainGuard> {
        let mut held = self.locked();
        if !held.insert(domain.to_string()) {
            return None;
        }
        Some(DomainGuard {
            domain: domain.to_string(),
            locks: Arc::clone(&self.inner),
        })
    }

    /// Whether a domain is currently locked.
    #[must_use]
    pub fn is_locked(&self, domain: &str) -> bool {
        self.locked().contains(domain)
    }
}

/// RAII guard for a domain lock.
#[derive(Debug)]
pub struct DomainGuard {
    domain: String,
    locks: Arc<Mutex<HashSet<String>>>,
}

impl Drop for DomainGuard {
    fn drop(&mut self) {
        let mut held = match self.locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        held.remove(&self.domain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_and_release() {
        let locks = DomainLocks::new();
        {
            let _guard = locks.try_acquire("acme-test").unwrap();
            assert!(locks.is_locked("acme-test"));
        }
        assert!(!locks.is_locked("acme-test"));
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let locks = DomainLocks::new();
        let _guard = locks.try_acquire("acme-test").unwrap();
        assert!(locks.try_acquire("acme-test").is_none());
    }

    #[test]
    fn test_different_domains_do_not_contend() {
        let locks = DomainLocks::new();
        let _a = locks.try_acquire("acme-test").unwrap();
        assert!(locks.try_acquire("other-shop").is_some());
    }

    #[test]
    fn test_reacquire_after_release() {
        let locks = DomainLocks::new();
        drop(locks.try_acquire("acme-test").unwrap());
        assert!(locks.try_acquire("acme-test").is_some());
    }
}
