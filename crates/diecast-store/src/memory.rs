use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, StoreError};
use crate::kv::KvBackend;

/// In-memory backend for tests and ephemeral sessions.
///
/// Clones share the same entries, so a test can keep a handle for inspecting
/// raw values or tightening the quota after the store has been handed out.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl Inner {
    fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses writes growing it past `quota` bytes (keys + values).
    pub fn with_quota(quota: usize) -> Self {
        let backend = Self::new();
        backend.set_quota(Some(quota));
        backend
    }

    pub fn set_quota(&self, quota: Option<usize>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.quota = quota;
        }
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.inner
            .lock()
            .map(|inner| inner.entries.clone())
            .unwrap_or_default()
    }

    pub fn used_bytes(&self) -> usize {
        self.inner.lock().map(|i| i.used_bytes()).unwrap_or(0)
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(quota) = inner.quota {
            let previous = inner.entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = inner.used_bytes() - previous + key.len() + value.len();
            if needed > quota {
                return Err(StoreError::QuotaExceeded { needed, quota });
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        inner.entries.remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let inner = self.inner.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(inner
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_counts_keys_and_values() {
        let mut backend = MemoryBackend::with_quota(10);
        backend.set("ab", "cdef").unwrap();
        assert_eq!(backend.used_bytes(), 6);

        let err = backend.set("gh", "ijklm").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 13, quota: 10 }));

        // Overwriting an entry only counts the difference.
        backend.set("ab", "cdefghij").unwrap();
        assert_eq!(backend.used_bytes(), 10);
    }

    #[test]
    fn prefix_scan() {
        let mut backend = MemoryBackend::new();
        backend.set("photo_1_0", "a").unwrap();
        backend.set("photo_1_1", "b").unwrap();
        backend.set("user", "c").unwrap();
        assert_eq!(
            backend.keys_with_prefix("photo_").unwrap(),
            vec!["photo_1_0".to_string(), "photo_1_1".to_string()]
        );
    }

    #[test]
    fn clones_observe_writes() {
        let mut backend = MemoryBackend::new();
        let observer = backend.clone();
        backend.set("k", "v").unwrap();
        assert_eq!(observer.snapshot().get("k").map(String::as_str), Some("v"));
    }
}
