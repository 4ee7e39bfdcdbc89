//! Server configuration.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. `todo.toml` (or the file passed with `--config`), if it exists
//! 3. `TODO_API_*` environment variables (a `.env` file is honoured)
//! 4. command-line flags
//!
//! # Configuration File Format
//!
//! ```toml
//! host = "127.0.0.1"
//! port = 8080
//! db_path = ".todo/todo.db"
//! dev_mode = false
//! log_level = "info"
//! log_json = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::TodoError;

pub const ENV_HOST: &str = "TODO_API_HOST";
pub const ENV_PORT: &str = "TODO_API_PORT";
pub const ENV_DB_PATH: &str = "TODO_API_DB_PATH";
pub const ENV_DEV: &str = "TODO_API_DEV";
pub const ENV_LOG_LEVEL: &str = "TODO_API_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "TODO_API_LOG_JSON";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Permissive CORS and bind on all interfaces.
    #[serde(default)]
    pub dev_mode: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".todo/todo.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            dev_mode: false,
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, TodoError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TodoError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TodoError> {
        let content = std::fs::read_to_string(path).map_err(|source| TodoError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| TodoError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse server config")
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, TodoError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply `TODO_API_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), TodoError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| TodoError::InvalidEnv {
                key: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(db_path) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(dev) = lookup(ENV_DEV) {
            self.dev_mode = parse_bool(ENV_DEV, &dev)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(json) = lookup(ENV_LOG_JSON) {
            self.log_json = parse_bool(ENV_LOG_JSON, &json)?;
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), TodoError> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Host the listener binds to. Dev mode always listens on every interface.
    pub fn bind_host(&self) -> &str {
        if self.dev_mode { "0.0.0.0" } else { &self.host }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host(), self.port)
    }

    /// Returns a list of problems; empty means the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.host.trim().is_empty() {
            problems.push("host must not be empty".to_string());
        }
        if self.db_path.as_os_str().is_empty() {
            problems.push("db_path must not be empty".to_string());
        }
        if tracing_subscriber::EnvFilter::try_new(&self.log_level).is_err() {
            problems.push(format!("log_level '{}' is not a valid filter", self.log_level));
        }
        problems
    }

    /// Fail with every validation problem at once.
    pub fn ensure_valid(&self) -> Result<(), TodoError> {
        let problems = self.validate();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(TodoError::InvalidConfig(problems))
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize server config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from(".todo/todo.db"));
        assert!(!config.dev_mode);
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() {
        let config = ServerConfig::parse("port = 9000\ndev_mode = true\n").unwrap();
        assert_eq!(config.port, 9000);
        assert!(config.dev_mode);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.db_path, PathBuf::from(".todo/todo.db"));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(ServerConfig::parse("port = \"eighty\"").is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.toml");
        std::fs::write(&path, "port = [").unwrap();

        let err = ServerConfig::load(&path).unwrap_err();
        assert!(matches!(err, TodoError::ConfigParse { .. }));
        assert!(err.to_string().contains("todo.toml"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ServerConfig {
            port: 3000,
            log_json: true,
            ..ServerConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(ServerConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env(env(&[
                ("TODO_API_HOST", "10.0.0.1"),
                ("TODO_API_PORT", "9090"),
                ("TODO_API_DB_PATH", "/var/lib/todo.db"),
                ("TODO_API_DEV", "yes"),
                ("TODO_API_LOG_LEVEL", "debug"),
                ("TODO_API_LOG_JSON", "1"),
            ]))
            .unwrap();

        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/todo.db"));
        assert!(config.dev_mode);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    fn test_env_rejects_bad_port() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_env(env(&[("TODO_API_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, TodoError::InvalidEnv { ref key, .. } if key == "TODO_API_PORT"));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_env_rejects_bad_bool() {
        let mut config = ServerConfig::default();
        assert!(config.apply_env(env(&[("TODO_API_DEV", "maybe")])).is_err());
    }

    #[test]
    fn test_bind_addr_respects_dev_mode() {
        let mut config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        config.dev_mode = true;
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_validate_collects_problems() {
        let config = ServerConfig {
            host: " ".to_string(),
            db_path: PathBuf::new(),
            log_level: "todo_api=loud".to_string(),
            ..ServerConfig::default()
        };
        let problems = config.validate();
        assert_eq!(problems.len(), 3, "{problems:?}");
        assert!(matches!(
            config.ensure_valid(),
            Err(TodoError::InvalidConfig(p)) if p.len() == 3
        ));
    }
}
