//! Application configuration.
//!
//! Defaults are defined in code; a TOML file and `PREDARB_`-prefixed
//! environment variables are merged on top via figment.

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub matching: MatchingConfig,
    pub arbitrage: ArbitrageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Deadline applied to each catalog-source call.
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Minimum combined score for an event-level match.
    pub event_threshold: f64,
    /// Minimum combined score for a market-level text match.
    pub market_threshold: f64,
    /// Width of the bounded scoring worker pool.
    pub workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Minimum profit fraction below the $1 payout for a combination to
    /// count as an opportunity (0.01 = 1%).
    pub min_profit: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/predarb".to_string(),
                max_connections: 10,
            },
            sync: SyncConfig {
                fetch_timeout_secs: 60,
            },
            matching: MatchingConfig {
                event_threshold: 0.5,
                market_threshold: 0.6,
                workers: 8,
            },
            arbitrage: ArbitrageConfig {
                min_profit: Decimal::new(1, 2),
            },
        }
    }
}

impl AppConfig {
    /// Loads configuration by layering a TOML file and environment variables
    /// over the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value fails to
    /// deserialize.
    pub fn load(path: &str) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PREDARB_").split("__"))
            .extract()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = AppConfig::default();

        assert!((config.matching.event_threshold - 0.5).abs() < f64::EPSILON);
        assert!((config.matching.market_threshold - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.matching.workers, 8);
        assert_eq!(config.arbitrage.min_profit, dec!(0.01));
        assert_eq!(config.sync.fetch_timeout_secs, 60);
    }

    #[test]
    fn load_falls_back_to_defaults_without_a_file() {
        let config = AppConfig::load("config/does-not-exist.toml").unwrap();
        assert_eq!(config.database.max_connections, 10);
    }
}
