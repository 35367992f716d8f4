//! Client configuration loaded from environment variables.
//!
//! Every setting has a default, so a session can start with no configuration.

use std::path::PathBuf;

use diecast_shared::constants::DEFAULT_STORE_QUOTA;

/// Address shared listing links point at when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://t.me/HotWheelsEliteBot";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory holding the SQLite store.
    /// Env: `DIECAST_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Byte capacity of the key-value store; `None` is unlimited.
    /// Env: `DIECAST_STORE_QUOTA` (`0` disables the limit)
    /// Default: 5 MiB
    pub store_quota: Option<usize>,

    /// Base address for shareable listing links.
    /// Env: `DIECAST_BASE_URL`
    pub base_url: String,

    /// Keep everything in memory for this session only.
    /// Env: `DIECAST_IN_MEMORY` (true/1)
    /// Default: `false`
    pub in_memory: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            store_quota: Some(DEFAULT_STORE_QUOTA),
            base_url: DEFAULT_BASE_URL.to_string(),
            in_memory: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = var("DIECAST_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Some(val) = var("DIECAST_STORE_QUOTA") {
            match val.trim().parse::<usize>() {
                Ok(0) => config.store_quota = None,
                Ok(n) => config.store_quota = Some(n),
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid DIECAST_STORE_QUOTA, using default");
                }
            }
        }

        if let Some(url) = var("DIECAST_BASE_URL") {
            if url.trim().is_empty() {
                tracing::warn!("Empty DIECAST_BASE_URL, using default");
            } else {
                config.base_url = url.trim().to_string();
            }
        }

        if let Some(val) = var("DIECAST_IN_MEMORY") {
            config.in_memory = val == "true" || val == "1";
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.store_quota, Some(5 * 1024 * 1024));
        assert!(!config.in_memory);
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DIECAST_DATA_DIR", "/tmp/diecast"),
            ("DIECAST_STORE_QUOTA", "1024"),
            ("DIECAST_BASE_URL", " https://market.example/app "),
            ("DIECAST_IN_MEMORY", "1"),
        ]));
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/diecast")));
        assert_eq!(config.store_quota, Some(1024));
        assert_eq!(config.base_url, "https://market.example/app");
        assert!(config.in_memory);
    }

    #[test]
    fn test_zero_quota_disables_limit() {
        let config = ClientConfig::from_lookup(lookup(&[("DIECAST_STORE_QUOTA", "0")]));
        assert_eq!(config.store_quota, None);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("DIECAST_STORE_QUOTA", "lots"),
            ("DIECAST_BASE_URL", "   "),
            ("DIECAST_IN_MEMORY", "yes please"),
        ]));
        assert_eq!(config, ClientConfig::default());
    }
}
