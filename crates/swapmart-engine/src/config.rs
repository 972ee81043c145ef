//! Engine configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! Binaries call `dotenv::dotenv()` first so a local `.env` file is honored.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use swapmart_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use swapmart_db::DbConfig;

/// Marketplace engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection
    pub connect_timeout_secs: u64,

    /// Page size used when a caller passes `limit = 0`
    pub default_page_size: u32,

    /// Largest `limit` a caller may request
    pub max_page_size: u32,

    /// Default `tracing` filter; `RUST_LOG` overrides it
    pub log_filter: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            database_path: PathBuf::from("./swapmart.db"),
            max_connections: 5,
            connect_timeout_secs: 30,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            log_filter: "info".to_string(),
        }
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,

            connect_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,

            default_page_size: parse_or(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?,

            max_page_size: parse_or(&lookup, "MAX_PAGE_SIZE", defaults.max_page_size)?,

            log_filter: lookup("LOG_FILTER").unwrap_or(defaults.log_filter),
        };

        if config.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_PATH".to_string()));
        }
        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.max_page_size == 0 {
            return Err(ConfigError::InvalidValue("MAX_PAGE_SIZE".to_string()));
        }
        if config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            return Err(ConfigError::InvalidValue("DEFAULT_PAGE_SIZE".to_string()));
        }

        Ok(config)
    }

    /// Pool configuration for [`swapmart_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MarketConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MarketConfig::default());
        assert_eq!(config.database_path, PathBuf::from("./swapmart.db"));
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = MarketConfig::from_lookup(lookup(&[
            ("DATABASE_PATH", "/tmp/market.db"),
            ("DB_MAX_CONNECTIONS", "8"),
            ("DEFAULT_PAGE_SIZE", " 10 "),
            ("LOG_FILTER", "debug,sqlx=warn"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/market.db"));
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.log_filter, "debug,sqlx=warn");

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        let err = MarketConfig::from_lookup(lookup(&[("DB_MAX_CONNECTIONS", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name) if name == "DB_MAX_CONNECTIONS"));

        let err = MarketConfig::from_lookup(lookup(&[("DEFAULT_PAGE_SIZE", "500")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name) if name == "DEFAULT_PAGE_SIZE"));

        let err = MarketConfig::from_lookup(lookup(&[("DATABASE_PATH", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
