//! Table configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::game::{
    constants::{DEFAULT_MAX_SEATS, MAX_SEATS, MIN_BUY_IN_BIG_BLINDS},
    entities::Chips,
};

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name, used in logs
    pub name: String,

    /// Seats at the table (default: 9, at most 23)
    pub max_seats: usize,

    /// Small blind. Zero together with `big_blind` leaves blinds unset until
    /// a player sets them.
    pub small_blind: Chips,

    /// Big blind
    pub big_blind: Chips,

    /// Interval between ticks that drive auto-play and auto-start
    pub tick_ms: u64,

    /// Start the next hand on a tick whenever enough players are ready
    pub auto_start: bool,

    /// Refuse blind changes while anyone is seated
    pub lock_blinds_when_seated: bool,

    /// Deck seed for reproducible tables. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Settled hands kept in memory
    pub history_len: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "Main Table".to_string(),
            max_seats: DEFAULT_MAX_SEATS,
            small_blind: 5,
            big_blind: 10,
            tick_ms: 1000,
            auto_start: true,
            lock_blinds_when_seated: false,
            seed: None,
            history_len: 50,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Table name must not be empty".to_string());
        }

        if self.max_seats < 2 || self.max_seats > MAX_SEATS {
            return Err(format!("Max seats must be between 2 and {MAX_SEATS}"));
        }

        let blinds_unset = self.small_blind == 0 && self.big_blind == 0;
        if !blinds_unset {
            if self.small_blind <= 0 || self.big_blind <= 0 {
                return Err("Blinds must be positive".to_string());
            }
            if self.big_blind < self.small_blind {
                return Err("Big blind must not be less than small blind".to_string());
            }
        }

        if self.tick_ms == 0 {
            return Err("Tick interval must be positive".to_string());
        }

        if self.history_len == 0 {
            return Err("History length must be positive".to_string());
        }

        Ok(())
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Minimum buy-in in chips
    #[must_use]
    pub fn min_buy_in_chips(&self) -> Chips {
        self.big_blind.saturating_mul(MIN_BUY_IN_BIG_BLINDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(TableConfig::default().validate().is_ok());
        assert_eq!(TableConfig::default().min_buy_in_chips(), 1000);
    }

    #[test]
    fn test_seat_bounds() {
        let mut config = TableConfig {
            max_seats: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        config.max_seats = 23;
        assert!(config.validate().is_ok());
        config.max_seats = 24;
        assert!(config.validate().unwrap_err().contains("between 2 and 23"));
    }

    #[test]
    fn test_blind_rules() {
        let unset = TableConfig {
            small_blind: 0,
            big_blind: 0,
            ..Default::default()
        };
        assert!(unset.validate().is_ok());

        let negative = TableConfig {
            small_blind: -5,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let inverted = TableConfig {
            small_blind: 20,
            big_blind: 10,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let straddle_free = TableConfig {
            small_blind: 10,
            big_blind: 10,
            ..Default::default()
        };
        assert!(straddle_free.validate().is_ok());
    }

    #[test]
    fn test_tick_and_history() {
        let config = TableConfig {
            tick_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            history_len: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(
            TableConfig::default().tick_interval(),
            Duration::from_millis(1000)
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let config = TableConfig {
            seed: Some(42),
            ..Default::default()
        };
        let bytes = bincode::serde::encode_to_vec(&config, bincode::config::standard()).unwrap();
        let (decoded, _): (TableConfig, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).unwrap();
        assert_eq!(decoded, config);
    }
}
