use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use roost_auth::JwtOptions;
use roost_core::{ConfigSnapshot, RoostConfig};
use roost_store::RetryPolicy;

/// Everything the server reads from configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub jwt: JwtOptions,
    pub guest_secret: String,
    /// Directory of `<role>.json` grant files. The built-in tables are used
    /// when unset.
    pub roles_dir: Option<PathBuf>,
    pub index_retry: RetryPolicy,
    /// Refuse a check-in while the room still has an open stay.
    pub exclusive_open: bool,
    pub dedup_window: Duration,
}

impl Settings {
    /// Defaults overlaid with `ROOST__*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = default_config();
        let applied = config.load_env();
        tracing::debug!(applied, "Loaded environment overrides");
        Self::from_config(&config.snapshot())
    }

    pub fn from_config(config: &ConfigSnapshot) -> Result<Self> {
        let retry = RetryPolicy::default();
        Ok(Self {
            host: config
                .get_string("http.host")
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: config.get_u16("http.port").unwrap_or(3030),
            jwt: JwtOptions {
                secret: required(config, "auth.jwt.secret")?,
                issuer: config.get_string("auth.jwt.issuer").filter(|s| !s.is_empty()),
                audience: config.get_list("auth.jwt.audience"),
            },
            guest_secret: required(config, "auth.guest.secret")?,
            roles_dir: config
                .get_string("rbac.roles_dir")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            index_retry: RetryPolicy {
                attempts: match config.get_u64("store.index_retry.attempts") {
                    Some(n) => u32::try_from(n)
                        .map_err(|_| anyhow!("store.index_retry.attempts is out of range: {n}"))?,
                    None => retry.attempts,
                },
                base_delay: config
                    .get_millis("store.index_retry.base_delay_ms")
                    .unwrap_or(retry.base_delay),
                max_delay: config
                    .get_millis("store.index_retry.max_delay_ms")
                    .unwrap_or(retry.max_delay),
            },
            exclusive_open: config.get_bool("stays.exclusive_open").unwrap_or(false),
            dedup_window: Duration::from_secs(
                config.get_u64("queue.dedup_window_secs").unwrap_or(300),
            ),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn default_config() -> RoostConfig {
    let mut config = RoostConfig::new();
    config.set_default("http.host", "127.0.0.1");
    config.set_default("http.port", "3030");
    config.set_default("stays.exclusive_open", "false");
    config.set_default("queue.dedup_window_secs", "300");
    config
}

fn required(config: &ConfigSnapshot, key: &str) -> Result<String> {
    config
        .get_string(key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("{key} is not configured"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn environment_overrides_defaults() {
        let mut config = default_config();
        config.load_env_from(
            "ROOST__",
            env(&[
                ("ROOST__HTTP__PORT", "8080"),
                ("ROOST__AUTH__JWT__SECRET", "s3cret"),
                ("ROOST__AUTH__JWT__AUDIENCE", "web, mobile"),
                ("ROOST__AUTH__GUEST__SECRET", "guest"),
                ("ROOST__STAYS__EXCLUSIVE_OPEN", "true"),
                ("ROOST__STORE__INDEX_RETRY__ATTEMPTS", "5"),
            ]),
        );

        let settings = Settings::from_config(&config.snapshot()).unwrap();
        assert_eq!(settings.addr(), "127.0.0.1:8080");
        assert_eq!(settings.jwt.secret, "s3cret");
        assert_eq!(settings.jwt.audience, vec!["web", "mobile"]);
        assert!(settings.jwt.issuer.is_none());
        assert!(settings.exclusive_open);
        assert_eq!(settings.index_retry.attempts, 5);
        assert_eq!(settings.index_retry.base_delay, RetryPolicy::default().base_delay);
        assert_eq!(settings.dedup_window, Duration::from_secs(300));
        assert!(settings.roles_dir.is_none());
    }

    #[test]
    fn oversized_retry_attempts_are_refused() {
        let mut config = default_config();
        config.set("auth.jwt.secret", "s3cret");
        config.set("auth.guest.secret", "guest");
        config.set("store.index_retry.attempts", (u64::from(u32::MAX) + 1).to_string());

        let err = Settings::from_config(&config.snapshot()).unwrap_err();
        assert!(err.to_string().contains("store.index_retry.attempts"));
    }

    #[test]
    fn secrets_are_required() {
        let err = Settings::from_config(&default_config().snapshot()).unwrap_err();
        assert!(err.to_string().contains("auth.jwt.secret"));
    }
}
