//! Catalog ingestion.
//!
//! Maps exchange-native payloads into the canonical catalog model. All venue
//! quirks stop at this boundary: Kalshi cent prices become probabilities,
//! Polymarket's sometimes-JSON-encoded outcome arrays become structured
//! lists, and records without a usable identifier are skipped and counted
//! rather than failing a sync.
//!
//! The real HTTP clients are external collaborators; this crate defines the
//! catalog-source traits they implement and ships a snapshot-file
//! implementation for offline runs and tests.
//!
//! # Modules
//!
//! - [`raw`]: exchange-native record shapes
//! - [`normalize`]: raw -> canonical mapping
//! - [`source`]: catalog-source traits, filters, snapshot sources
//! - [`sync`]: the two-exchange sync service

pub mod normalize;
pub mod raw;
pub mod source;
pub mod sync;

pub use normalize::{normalize_kalshi, normalize_polymarket, NormalizedBatch};
pub use raw::{
    MaybeEncoded, RawKalshiEvent, RawKalshiMarket, RawPolymarketEvent, RawPolymarketMarket,
    RawPolymarketToken,
};
pub use source::{CatalogFilters, KalshiCatalog, KalshiSnapshot, PolymarketCatalog, PolymarketSnapshot};
pub use sync::{ExchangeSyncReport, IngestError, SyncReport, SyncService};
