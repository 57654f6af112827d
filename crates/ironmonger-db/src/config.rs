//! Store configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                          | Default             |
//! |-----------------------------------|---------------------|
//! | `IRONMONGER_DB_PATH`              | `./ironmonger.db`   |
//! | `IRONMONGER_MAX_CONNECTIONS`      | `5`                 |
//! | `IRONMONGER_LOW_STOCK_THRESHOLD`  | `10` (units)        |

use std::env;
use std::path::PathBuf;

use ironmonger_core::{Quantity, DEFAULT_LOW_STOCK_THRESHOLD};
use serde::{Deserialize, Serialize};

use crate::pool::DbConfig;

pub const DEFAULT_DB_PATH: &str = "./ironmonger.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Runtime configuration of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Pool size.
    pub max_connections: u32,

    /// Products under this stock (and above zero) are reported as low.
    pub low_stock_threshold: Quantity,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let database_path = lookup("IRONMONGER_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections = match lookup("IRONMONGER_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("IRONMONGER_MAX_CONNECTIONS".to_string()))?,
            None => defaults.max_connections,
        };

        let low_stock_threshold = match lookup("IRONMONGER_LOW_STOCK_THRESHOLD") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .and_then(Quantity::checked_from_units)
                .ok_or_else(|| {
                    ConfigError::InvalidValue("IRONMONGER_LOW_STOCK_THRESHOLD".to_string())
                })?,
            None => defaults.low_stock_threshold,
        };

        Ok(StoreConfig {
            database_path,
            max_connections,
            low_stock_threshold,
        })
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .low_stock_threshold(self.low_stock_threshold)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.low_stock_threshold, Quantity::from_units(10));
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("IRONMONGER_DB_PATH", "/var/lib/shop.db"),
            ("IRONMONGER_MAX_CONNECTIONS", "8"),
            ("IRONMONGER_LOW_STOCK_THRESHOLD", "3"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/shop.db"));
        assert_eq!(config.db_config().max_connections, 8);
        assert_eq!(config.low_stock_threshold, Quantity::from_units(3));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[("IRONMONGER_MAX_CONNECTIONS", "zero")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(StoreConfig::from_lookup(lookup(&[("IRONMONGER_MAX_CONNECTIONS", "0")])).is_err());
        assert!(
            StoreConfig::from_lookup(lookup(&[("IRONMONGER_LOW_STOCK_THRESHOLD", "-1")])).is_err()
        );
    }

    #[test]
    fn test_threshold_too_large() {
        let result = StoreConfig::from_lookup(lookup(&[(
            "IRONMONGER_LOW_STOCK_THRESHOLD",
            "9223372036854775807",
        )]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue(key)) if key == "IRONMONGER_LOW_STOCK_THRESHOLD"
        ));

        // Largest whole-unit threshold that still fits.
        let max_units = (i64::MAX / 1000).to_string();
        let config = StoreConfig::from_lookup(lookup(&[(
            "IRONMONGER_LOW_STOCK_THRESHOLD",
            max_units.as_str(),
        )]))
        .unwrap();
        assert_eq!(config.low_stock_threshold, Quantity::from_units(i64::MAX / 1000));
    }
}
