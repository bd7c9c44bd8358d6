//! # Configuration
//!
//! A small string key/value store with dotted keys (`http.port`,
//! `auth.jwt.secret`). Applications seed defaults, then layer environment
//! overrides on top:
//!
//! ```rust
//! use roost_core::RoostConfig;
//!
//! let mut config = RoostConfig::new();
//! config.set("http.port", "3000");
//! config.load_env_from("ROOST__", [("ROOST__HTTP__PORT".to_string(), "8080".to_string())]);
//!
//! let snapshot = config.snapshot();
//! assert_eq!(snapshot.get_u16("http.port"), Some(8080));
//! ```
//!
//! `ROOST__HTTP__PORT` becomes `http.port`: the prefix is stripped, the rest
//! is lowercased and `__` turns into `.`.

use std::collections::HashMap;
use std::time::Duration;

/// Environment prefix read by [`RoostConfig::load_env`].
pub const ENV_PREFIX: &str = "ROOST__";

#[derive(Debug, Default)]
pub struct RoostConfig {
    values: HashMap<String, String>,
}

impl RoostConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set `key` only when nothing is configured for it yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Apply overrides from the process environment.
    pub fn load_env(&mut self) -> usize {
        self.load_env_from(ENV_PREFIX, std::env::vars())
    }

    /// Apply overrides from any `(name, value)` source. Returns how many keys were set.
    pub fn load_env_from<I>(&mut self, prefix: &str, vars: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                if normalized.is_empty() {
                    continue;
                }
                self.values.insert(normalized, value);
                applied += 1;
            }
        }
        applied
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::new(self.values.clone())
    }
}

/// Immutable copy of the configuration with typed getters.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    map: HashMap<String, String>,
}

impl ConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.trim().parse::<u16>().ok())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)
            .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(true),
                "false" | "0" | "no" | "off" => Some(false),
                _ => None,
            })
    }

    /// Milliseconds stored under `key`.
    pub fn get_millis(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_millis)
    }

    /// Comma separated list, empty items dropped.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
