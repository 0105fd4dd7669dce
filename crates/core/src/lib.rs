//! Core catalog model for the prediction-market arbitrage scanner.
//!
//! This crate defines the canonical shapes that both exchange catalogs are
//! normalized into, the derived records produced by matching and detection
//! runs, the async store traits that make persistence swappable, and the
//! figment-based application configuration.
//!
//! # Modules
//!
//! - [`types`]: exchanges, outcomes, markets, and events
//! - [`matches`]: cross-exchange match records (market- and event-level)
//! - [`opportunity`]: detected arbitrage opportunities
//! - [`traits`]: async store traits (catalog, matches, opportunities)
//! - [`config`]: application configuration and loader

pub mod config;
pub mod matches;
pub mod opportunity;
pub mod traits;
pub mod types;

pub use config::{AppConfig, ArbitrageConfig, DatabaseConfig, MatchingConfig, SyncConfig};
pub use matches::{EventMatch, MarketMatch};
pub use opportunity::{ArbitrageKind, ArbitrageOpportunity, Position};
pub use traits::{CatalogStore, MatchStore, OpportunityStore};
pub use types::{Event, Exchange, Market, Outcome};
