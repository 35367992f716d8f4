//! Fails-safe key-value adapter.
//!
//! [`KvStore`] is the only path from the repositories to persistent storage.
//! Backends report failures as [`StoreError`]s; the adapter absorbs them:
//! a failed read is an absent value, a failed write is
//! [`WriteStatus::Dropped`]. Nothing panics or returns an error across this
//! boundary. Values are opaque strings; encoding lives in [`crate::codec`].

use std::fmt;
use std::sync::{Arc, Mutex};

use diecast_shared::error::MarketError;

use crate::error::{Result, StoreError};
use crate::memory::MemoryBackend;

/// A synchronous string-to-string store.
pub trait KvBackend: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Outcome of a write through [`KvStore`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Stored,
    Dropped,
}

impl WriteStatus {
    pub fn is_stored(self) -> bool {
        self == Self::Stored
    }

    /// Map a dropped write to [`MarketError::StorageUnavailable`].
    pub fn or_unavailable(self) -> std::result::Result<(), MarketError> {
        match self {
            Self::Stored => Ok(()),
            Self::Dropped => Err(MarketError::StorageUnavailable),
        }
    }

    /// `Dropped` if any of the two writes was dropped.
    pub fn and(self, other: WriteStatus) -> WriteStatus {
        if self.is_stored() && other.is_stored() {
            Self::Stored
        } else {
            Self::Dropped
        }
    }
}

/// Shared handle to the session's backend. Cloning is cheap.
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<Mutex<dyn KvBackend>>,
}

impl KvStore {
    pub fn new<B: KvBackend + 'static>(backend: B) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    /// Unbounded, non-persistent store.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let Ok(guard) = self.backend.lock() else {
            tracing::warn!(key, error = %StoreError::Poisoned, "store read skipped");
            return None;
        };
        match guard.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "store read failed, treating as absent");
                None
            }
        }
    }

    pub fn set(&self, key: &str, value: &str) -> WriteStatus {
        let Ok(mut guard) = self.backend.lock() else {
            tracing::warn!(key, error = %StoreError::Poisoned, "store write dropped");
            return WriteStatus::Dropped;
        };
        match guard.set(key, value) {
            Ok(()) => WriteStatus::Stored,
            Err(e) => {
                tracing::warn!(key, bytes = value.len(), error = %e, "store write dropped");
                WriteStatus::Dropped
            }
        }
    }

    pub fn remove(&self, key: &str) -> WriteStatus {
        let Ok(mut guard) = self.backend.lock() else {
            tracing::warn!(key, error = %StoreError::Poisoned, "store remove dropped");
            return WriteStatus::Dropped;
        };
        match guard.remove(key) {
            Ok(()) => WriteStatus::Stored,
            Err(e) => {
                tracing::warn!(key, error = %e, "store remove dropped");
                WriteStatus::Dropped
            }
        }
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let Ok(guard) = self.backend.lock() else {
            return Vec::new();
        };
        guard.keys_with_prefix(prefix).unwrap_or_else(|e| {
            tracing::warn!(prefix, error = %e, "store key scan failed");
            Vec::new()
        })
    }
}

impl fmt::Debug for KvStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvStore").finish_non_exhaustive()
    }
}
