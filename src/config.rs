//! Runtime configuration, read from the environment.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

use crate::db::SqliteStore;
use crate::store::{MemoryStore, ObjectStore};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error("failed to load .env: {0}")]
    DotEnv(#[source] dotenvy::Error),

    #[error("failed to open store: {0}")]
    Store(#[source] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Memory,
    Sqlite,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub db_path: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            storage: StorageKind::Memory,
            db_path: PathBuf::from("lodging.db"),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(host) = lookup("LODGING_API_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("LODGING_API_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                var: "LODGING_API_PORT",
                reason: format!("not a port number: {}", port),
            })?;
        }
        if let Some(storage) = lookup("LODGING_STORAGE") {
            config.storage = match storage.to_lowercase().as_str() {
                "memory" => StorageKind::Memory,
                "sqlite" | "db" => StorageKind::Sqlite,
                other => {
                    return Err(ConfigError::InvalidValue {
                        var: "LODGING_STORAGE",
                        reason: format!("expected memory or sqlite, got {}", other),
                    })
                }
            };
        }
        if let Some(path) = lookup("LODGING_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = lookup("LODGING_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("LODGING_LOG_FORMAT") {
            config.logging.format = format;
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                var: "LODGING_API_HOST",
                reason: format!("not an IP address: {}", self.host),
            })
    }

    pub fn init_logging(&self) {
        self.logging.init();
    }

    pub fn open_store(&self) -> Result<Arc<dyn ObjectStore>, ConfigError> {
        match self.storage {
            StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageKind::Sqlite => {
                let store = SqliteStore::open(&self.db_path).map_err(ConfigError::Store)?;
                Ok(Arc::new(store))
            }
        }
    }
}

/// A missing `.env` is fine; a malformed one is not.
fn check_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match loaded {
        Ok(_) => Ok(()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConfigError::DotEnv(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.bind_addr().unwrap().port(), 5000);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = AppConfig::from_lookup(lookup(&[
            ("LODGING_API_HOST", "127.0.0.1"),
            ("LODGING_API_PORT", "8080"),
            ("LODGING_STORAGE", "SQLite"),
            ("LODGING_DB_PATH", "/tmp/x.db"),
            ("LODGING_LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = AppConfig::from_lookup(lookup(&[("LODGING_API_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("LODGING_API_PORT"));

        let err = AppConfig::from_lookup(lookup(&[("LODGING_STORAGE", "redis")])).unwrap_err();
        assert!(err.to_string().contains("LODGING_STORAGE"));
    }

    #[test]
    fn test_dotenv_missing_file_is_ignored_but_bad_file_is_not() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "no .env");
        assert!(check_dotenv::<()>(Err(dotenvy::Error::Io(missing))).is_ok());

        let malformed = dotenvy::Error::LineParse("LODGING_API_PORT 5000".to_string(), 16);
        let err = check_dotenv::<()>(Err(malformed)).unwrap_err();
        assert!(matches!(err, ConfigError::DotEnv(_)));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked");
        assert!(check_dotenv::<()>(Err(dotenvy::Error::Io(denied))).is_err());
    }

    #[test]
    fn test_malformed_dotenv_file_is_reported() {
        let path = std::env::temp_dir().join(format!("lodging-{}.env", uuid::Uuid::new_v4()));
        std::fs::write(&path, "LODGING_API_PORT 5000\n").unwrap();

        let result = check_dotenv(dotenvy::from_path(&path));
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(ConfigError::DotEnv(_))));
    }

    #[test]
    fn test_open_memory_store() {
        let store = AppConfig::default().open_store().unwrap();
        assert_eq!(store.count(crate::entities::EntityKind::Region).unwrap(), 0);
    }
}
