//! Tuning values for the harvester.
//!
//! Deserialized from the `economy` section of `salvage-config.yaml`. Every
//! field has a default, so an absent section yields the stock game.

use chrono::TimeDelta;
use serde::Deserialize;

use crate::error::EconomyError;

/// Harvester tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Minimum time between two harvests by the same player, in milliseconds.
    /// Zero disables the gate.
    #[serde(default = "default_harvest_cooldown_ms")]
    pub harvest_cooldown_ms: u64,

    /// Smallest quantity a harvest can yield.
    #[serde(default = "default_harvest_min_quantity")]
    pub harvest_min_quantity: u64,

    /// Largest quantity a harvest can yield (inclusive).
    #[serde(default = "default_harvest_max_quantity")]
    pub harvest_max_quantity: u64,

    /// Resource tier the harvester draws from.
    #[serde(default = "default_harvest_tier")]
    pub harvest_tier: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            harvest_cooldown_ms: default_harvest_cooldown_ms(),
            harvest_min_quantity: default_harvest_min_quantity(),
            harvest_max_quantity: default_harvest_max_quantity(),
            harvest_tier: default_harvest_tier(),
        }
    }
}

impl EconomyConfig {
    /// The cooldown as a [`TimeDelta`].
    pub fn harvest_cooldown(&self) -> TimeDelta {
        i64::try_from(self.harvest_cooldown_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Reject tuning values the harvester cannot honour.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InvalidConfig`] if the quantity range is empty
    /// or starts at zero.
    pub fn validate(&self) -> Result<(), EconomyError> {
        if self.harvest_min_quantity == 0 {
            return Err(EconomyError::InvalidConfig(
                "harvest_min_quantity must be at least 1".to_owned(),
            ));
        }
        if self.harvest_min_quantity > self.harvest_max_quantity {
            return Err(EconomyError::InvalidConfig(format!(
                "harvest_min_quantity ({}) exceeds harvest_max_quantity ({})",
                self.harvest_min_quantity, self.harvest_max_quantity
            )));
        }
        Ok(())
    }
}

const fn default_harvest_cooldown_ms() -> u64 {
    5000
}

const fn default_harvest_min_quantity() -> u64 {
    1
}

const fn default_harvest_max_quantity() -> u64 {
    5
}

const fn default_harvest_tier() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_game() {
        let config = EconomyConfig::default();
        assert_eq!(config.harvest_cooldown_ms, 5000);
        assert_eq!(config.harvest_min_quantity, 1);
        assert_eq!(config.harvest_max_quantity, 5);
        assert_eq!(config.harvest_tier, 1);
        assert_eq!(config.harvest_cooldown(), TimeDelta::seconds(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Result<EconomyConfig, _> = serde_yml::from_str("harvest_cooldown_ms: 60000\n");
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.harvest_cooldown(), TimeDelta::minutes(1));
        assert_eq!(config.harvest_max_quantity, 5);
    }

    #[test]
    fn rejects_inverted_range() {
        let config = EconomyConfig {
            harvest_min_quantity: 6,
            ..EconomyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_minimum() {
        let config = EconomyConfig {
            harvest_min_quantity: 0,
            ..EconomyConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
