//! In-process keyed mutex
//!
//! The engine never serializes calls itself. Callers that manage related
//! entities (siblings under one parent, for example) take a lock on a shared
//! key before invoking an orchestrator and hold the guard for the whole call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of per-key async mutexes
#[derive(Debug, Clone, Default)]
pub struct KeyedLock {
    locks: Registry,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `key` is free and take it
    pub async fn lock(&self, key: impl Into<String>) -> KeyedLockGuard {
        let key = key.into();
        let mutex = {
            let mut locks = lock_registry(&self.locks);
            prune(&mut locks);
            Arc::clone(locks.entry(key.clone()).or_default())
        };

        tracing::trace!(key = %key, "Waiting for keyed lock");
        let guard = mutex.lock_owned().await;
        tracing::trace!(key = %key, "Acquired keyed lock");

        KeyedLockGuard {
            key,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        }
    }

    /// Take `key` only if nobody holds it
    pub fn try_lock(&self, key: impl Into<String>) -> Option<KeyedLockGuard> {
        let key = key.into();
        let mut locks = lock_registry(&self.locks);
        prune(&mut locks);
        let mutex = Arc::clone(locks.entry(key.clone()).or_default());
        let guard = mutex.try_lock_owned().ok()?;
        drop(locks);

        Some(KeyedLockGuard {
            key,
            locks: Arc::clone(&self.locks),
            guard: Some(guard),
        })
    }

    pub fn is_locked(&self, key: &str) -> bool {
        lock_registry(&self.locks)
            .get(key)
            .is_some_and(|m| m.try_lock().is_err())
    }

    /// Number of keys currently held or waited on
    pub fn len(&self) -> usize {
        let mut locks = lock_registry(&self.locks);
        prune(&mut locks);
        locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop entries nobody holds or waits on
///
/// Holders and waiters each keep a clone of the entry's `Arc`, and new
/// clones are only taken under the registry lock, so a count of one means
/// the entry is unused.
fn prune(locks: &mut HashMap<String, Arc<AsyncMutex<()>>>) {
    locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
}

fn lock_registry(locks: &Registry) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
    // the map stays consistent even if a holder panicked
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Held key; released on drop, whichever way the caller exits
#[derive(Debug)]
pub struct KeyedLockGuard {
    key: String,
    locks: Registry,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        let mut locks = lock_registry(&self.locks);
        self.guard.take();
        // a waiter that gives up later is cleaned up by `prune`
        if locks
            .get(&self.key)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            locks.remove(&self.key);
        }
        tracing::trace!(key = %self.key, "Released keyed lock");
    }
}
