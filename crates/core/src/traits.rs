//! Async store traits.
//!
//! The matching and detection engines only ever talk to persistence through
//! these traits, so the storage engine is swappable (Postgres in production,
//! in-memory in tests and for snapshot runs).

use anyhow::Result;
use async_trait::async_trait;

use crate::matches::{EventMatch, MarketMatch};
use crate::opportunity::ArbitrageOpportunity;
use crate::types::{Event, Exchange, Market};

/// Storage for the normalized market/event catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts or updates markets keyed by `(exchange, external_id)`.
    /// Returns the number of rows written.
    async fn upsert_markets(&self, markets: &[Market]) -> Result<u64>;

    /// Inserts or updates events keyed by `(exchange, external_id)`.
    /// Returns the number of rows written.
    async fn upsert_events(&self, events: &[Event]) -> Result<u64>;

    /// Returns all active markets for one venue.
    async fn active_markets(&self, exchange: Exchange) -> Result<Vec<Market>>;

    /// Returns all active events for one venue.
    async fn active_events(&self, exchange: Exchange) -> Result<Vec<Event>>;
}

/// Storage for cross-exchange match records.
///
/// Upserts are keyed by the (kalshi, polymarket) identity pair so repeated
/// matching runs converge instead of duplicating. Updates must leave the
/// human-owned `is_verified` / `verified_at` fields untouched.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Inserts or updates a market-level match.
    async fn upsert_market_match(&self, m: &MarketMatch) -> Result<()>;

    /// Inserts or updates an event-level match.
    async fn upsert_event_match(&self, m: &EventMatch) -> Result<()>;

    /// Returns market matches whose both linked markets are active.
    async fn active_market_matches(&self) -> Result<Vec<MarketMatch>>;
}

/// Storage for detected arbitrage opportunities.
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    /// Replaces the active snapshot: flips every previously active row
    /// inactive, then inserts the new batch as active. Implementations should
    /// make the two phases atomic where the engine supports it, so a reader
    /// never observes an empty active set mid-run. Returns the number of rows
    /// inserted.
    async fn replace_active(&self, opportunities: &[ArbitrageOpportunity]) -> Result<u64>;

    /// Returns the currently active snapshot.
    async fn active_opportunities(&self) -> Result<Vec<ArbitrageOpportunity>>;
}
