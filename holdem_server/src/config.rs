//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use holdem_table::{Chips, TableConfig};
use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
};

/// Bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 6969));

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<SocketAddr>,
    pub max_seats: Option<usize>,
    pub small_blind: Option<Chips>,
    pub big_blind: Option<Chips>,
    pub seed: Option<u64>,
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// The hosted table
    pub table: TableConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_lookup(
        overrides: CliOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = TableConfig::default();

        let bind = match overrides.bind {
            Some(bind) => bind,
            None => match parse_env(&lookup, "SERVER_BIND")? {
                Some(bind) => bind,
                None => DEFAULT_BIND,
            },
        };

        let table = TableConfig {
            max_seats: overrides
                .max_seats
                .map_or_else(|| parse_env_or(&lookup, "TABLE_MAX_SEATS", defaults.max_seats), Ok)?,
            small_blind: overrides.small_blind.map_or_else(
                || parse_env_or(&lookup, "TABLE_SMALL_BLIND", defaults.small_blind),
                Ok,
            )?,
            big_blind: overrides
                .big_blind
                .map_or_else(|| parse_env_or(&lookup, "TABLE_BIG_BLIND", defaults.big_blind), Ok)?,
            seed: match overrides.seed {
                Some(seed) => Some(seed),
                None => parse_env(&lookup, "TABLE_SEED")?,
            },
            tick_ms: parse_env_or(&lookup, "TABLE_TICK_MS", defaults.tick_ms)?,
            auto_start: parse_env_or(&lookup, "TABLE_AUTO_START", defaults.auto_start)?,
            ..defaults
        };

        Ok(ServerConfig { bind, table })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate blinds
        if self.table.small_blind <= 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_SMALL_BLIND".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.table.big_blind < self.table.small_blind {
            return Err(ConfigError::Invalid {
                var: "TABLE_BIG_BLIND".to_string(),
                reason: format!(
                    "Must not be less than small blind ({})",
                    self.table.small_blind
                ),
            });
        }

        if self.table.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                var: "TABLE_TICK_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.table.validate().map_err(|reason| ConfigError::Invalid {
            var: "TABLE_MAX_SEATS".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    Unparsable { var: String, value: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse a variable if it is set.
fn parse_env<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparsable {
                var: key.to_string(),
                value,
            }),
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    Ok(parse_env(lookup, key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)], overrides: CliOverrides) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(overrides, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[], CliOverrides::default()).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.bind.to_string(), "127.0.0.1:6969");
        assert_eq!(config.table.max_seats, 9);
        assert_eq!(config.table.small_blind, 5);
        assert_eq!(config.table.big_blind, 10);
        assert_eq!(config.table.seed, None);
        assert!(config.table.auto_start);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_environment_values() {
        let config = load(
            &[
                ("SERVER_BIND", "0.0.0.0:7000"),
                ("TABLE_MAX_SEATS", "6"),
                ("TABLE_SMALL_BLIND", "25"),
                ("TABLE_BIG_BLIND", "50"),
                ("TABLE_SEED", "42"),
                ("TABLE_TICK_MS", "250"),
                ("TABLE_AUTO_START", "false"),
            ],
            CliOverrides::default(),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 7000);
        assert_eq!(config.table.max_seats, 6);
        assert_eq!(config.table.small_blind, 25);
        assert_eq!(config.table.big_blind, 50);
        assert_eq!(config.table.seed, Some(42));
        assert_eq!(config.table.tick_ms, 250);
        assert!(!config.table.auto_start);
    }

    #[test]
    fn test_cli_overrides_environment() {
        let overrides = CliOverrides {
            bind: Some("127.0.0.1:9000".parse().unwrap()),
            big_blind: Some(40),
            seed: Some(1),
            ..Default::default()
        };
        let config = load(&[("TABLE_BIG_BLIND", "50"), ("TABLE_SEED", "42")], overrides).unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.table.big_blind, 40);
        assert_eq!(config.table.seed, Some(1));
    }

    #[test]
    fn test_unparsable_variable() {
        let err = load(&[("TABLE_MAX_SEATS", "nine")], CliOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Unparsable { ref var, .. } if var == "TABLE_MAX_SEATS"));
        assert!(err.to_string().contains("nine"));
    }

    #[test]
    fn test_config_validation_blind_zero() {
        let config = load(&[("TABLE_SMALL_BLIND", "0")], CliOverrides::default()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TABLE_SMALL_BLIND"));
    }

    #[test]
    fn test_config_validation_big_blind_too_small() {
        let config = load(
            &[("TABLE_SMALL_BLIND", "20"), ("TABLE_BIG_BLIND", "10")],
            CliOverrides::default(),
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "TABLE_BIG_BLIND"));
    }

    #[test]
    fn test_config_validation_seat_count() {
        let config = load(&[("TABLE_MAX_SEATS", "30")], CliOverrides::default()).unwrap();
        assert!(config.validate().is_err());
    }
}
