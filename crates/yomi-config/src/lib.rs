use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::lookup::LookupConfig;
use self::resolver::ResolverConfig;
use self::stream::StreamConfig;

pub mod lookup;
pub mod resolver;
pub mod stream;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stream: StreamConfig,
    pub lookup: LookupConfig,
    pub resolver: ResolverConfig,
}

impl Config {
    /// Defaults overridden by `YOMI_*` environment variables
    pub fn new() -> Self {
        let mut config = Self::default();
        config.apply_env_with(|key| env::var(key).ok());
        config
    }

    /// Load a JSON profile, then apply environment overrides.
    /// Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading config from {}", path.display());
        let data = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&data)?;
        config.apply_env_with(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn apply_env_with<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = get("YOMI_HOST") {
            self.stream.host = host;
        }
        if let Some(port) = get("YOMI_PORT").and_then(|v| v.parse().ok()) {
            self.stream.port = port;
        }
        if let Some(delay) = get("YOMI_RECONNECT_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.stream.reconnect_delay_ms = delay;
        }
        if let Some(prefer) = get("YOMI_PREFER_REMOTE").and_then(|v| parse_bool(&v)) {
            self.lookup.prefer_remote = prefer;
        }
        if let Some(url) = get("YOMI_REMOTE_URL") {
            self.lookup.remote_url = url;
        }
        if let Some(path) = get("YOMI_SQLITE_PATH").filter(|p| !p.is_empty()) {
            self.lookup.sqlite_path = Some(path);
        }
        if let Some(workers) = get("YOMI_WORKERS").and_then(|v| v.parse().ok()) {
            self.resolver.workers = workers;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.port == 0 {
            return Err(ConfigError::Invalid {
                field: "stream.port",
                reason: "must be non-zero".to_string(),
            });
        }
        if self.resolver.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "resolver.workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.resolver.preload_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "resolver.preload_workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.resolver.good_enough_len == 0 {
            return Err(ConfigError::Invalid {
                field: "resolver.good_enough_len",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.stream.port, 80);
        assert_eq!(config.stream.reconnect_delay_ms, 5000);
        assert_eq!(config.stream.stop_timeout_ms, 1000);
        assert!(!config.lookup.prefer_remote);
        assert_eq!(config.resolver.throttle_ms, 80);
        assert_eq!(config.resolver.good_enough_len, 5);
        assert_eq!(config.resolver.preload_max_len, 10);
        assert_eq!(config.resolver.workers, 8);
        assert_eq!(config.resolver.preload_workers, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("YOMI_HOST", "192.168.1.20"),
            ("YOMI_PORT", "9000"),
            ("YOMI_PREFER_REMOTE", "yes"),
            ("YOMI_WORKERS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.stream.host, "192.168.1.20");
        assert_eq!(config.stream.port, 9000);
        assert!(config.lookup.prefer_remote);
        // unparsable values keep the default
        assert_eq!(config.resolver.workers, ResolverConfig::default().workers);
    }

    #[test]
    fn test_load_partial_profile() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "stream": {{ "host": "10.0.0.5", "port": 7000 }}, "resolver": {{ "throttle_ms": 10 }} }}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.stream.host, "10.0.0.5");
        assert_eq!(config.stream.port, 7000);
        assert_eq!(config.stream.reconnect_delay_ms, 5000);
        assert_eq!(config.resolver.throttle_ms, 10);
        assert_eq!(config.resolver.good_enough_len, 5);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = Config::default();
        config.stream.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "stream.port", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_preload_workers() {
        let mut config = Config::default();
        config.resolver.preload_workers = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "resolver.preload_workers", .. })
        ));
    }
}
