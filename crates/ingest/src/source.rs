//! Catalog-source boundary.
//!
//! One trait per exchange: the real HTTP clients (pagination, auth, rate
//! limits) live outside this repository and implement these traits. The
//! snapshot sources read a JSON file of raw events, which is enough for
//! offline runs and tests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use predarb_core::Event;

use crate::raw::{RawKalshiEvent, RawPolymarketEvent};

/// Client-side catalog filters.
///
/// The venues support these unevenly, so they are applied after
/// normalization regardless of what the source already filtered.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilters {
    /// Keep events whose end date is at or after this instant.
    pub close_after: Option<DateTime<Utc>>,
    /// Keep events whose end date is at or before this instant.
    pub close_before: Option<DateTime<Utc>>,
    /// Minimum aggregated event volume.
    pub volume_min: Option<Decimal>,
    /// Maximum aggregated event volume.
    pub volume_max: Option<Decimal>,
    /// Minimum aggregated event liquidity.
    pub liquidity_min: Option<Decimal>,
    /// Maximum aggregated event liquidity.
    pub liquidity_max: Option<Decimal>,
}

impl CatalogFilters {
    /// Returns true if the event passes every configured filter.
    ///
    /// Date filters only apply to events that carry an end date.
    #[must_use]
    pub fn accepts(&self, event: &Event) -> bool {
        if let (Some(after), Some(end)) = (self.close_after, event.end_date) {
            if end < after {
                return false;
            }
        }
        if let (Some(before), Some(end)) = (self.close_before, event.end_date) {
            if end > before {
                return false;
            }
        }
        if let Some(min) = self.volume_min {
            if event.volume < min {
                return false;
            }
        }
        if let Some(max) = self.volume_max {
            if event.volume > max {
                return false;
            }
        }
        if let Some(min) = self.liquidity_min {
            if event.liquidity < min {
                return false;
            }
        }
        if let Some(max) = self.liquidity_max {
            if event.liquidity > max {
                return false;
            }
        }
        true
    }
}

/// Source of raw Kalshi events.
#[async_trait]
pub trait KalshiCatalog: Send + Sync {
    /// Fetches raw events with their nested markets.
    async fn fetch_events(&self, filters: &CatalogFilters) -> Result<Vec<RawKalshiEvent>>;
}

/// Source of raw Polymarket events.
#[async_trait]
pub trait PolymarketCatalog: Send + Sync {
    /// Fetches raw events with their nested markets.
    async fn fetch_events(&self, filters: &CatalogFilters) -> Result<Vec<RawPolymarketEvent>>;
}

// =============================================================================
// Snapshot Sources
// =============================================================================

/// Kalshi catalog backed by a JSON snapshot file (an array of raw events).
#[derive(Debug, Clone)]
pub struct KalshiSnapshot {
    path: PathBuf,
}

impl KalshiSnapshot {
    /// Creates a snapshot source reading the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl KalshiCatalog for KalshiSnapshot {
    async fn fetch_events(&self, _filters: &CatalogFilters) -> Result<Vec<RawKalshiEvent>> {
        let payload = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading kalshi snapshot {}", self.path.display()))?;
        serde_json::from_str(&payload)
            .with_context(|| format!("parsing kalshi snapshot {}", self.path.display()))
    }
}

/// Polymarket catalog backed by a JSON snapshot file (an array of raw events).
#[derive(Debug, Clone)]
pub struct PolymarketSnapshot {
    path: PathBuf,
}

impl PolymarketSnapshot {
    /// Creates a snapshot source reading the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PolymarketCatalog for PolymarketSnapshot {
    async fn fetch_events(&self, _filters: &CatalogFilters) -> Result<Vec<RawPolymarketEvent>> {
        let payload = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading polymarket snapshot {}", self.path.display()))?;
        serde_json::from_str(&payload)
            .with_context(|| format!("parsing polymarket snapshot {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predarb_core::Exchange;
    use rust_decimal_macros::dec;

    fn event(volume: Decimal, end_date: Option<DateTime<Utc>>) -> Event {
        Event {
            exchange: Exchange::Kalshi,
            external_id: "KX".to_string(),
            title: "T".to_string(),
            description: String::new(),
            category: String::new(),
            url: String::new(),
            volume,
            volume_24h: Decimal::ZERO,
            liquidity: dec!(10),
            open_interest: Decimal::ZERO,
            is_active: true,
            mutually_exclusive: false,
            end_date,
        }
    }

    #[test]
    fn default_filters_accept_everything() {
        let filters = CatalogFilters::default();
        assert!(filters.accepts(&event(Decimal::ZERO, None)));
    }

    #[test]
    fn volume_bounds_are_enforced() {
        let filters = CatalogFilters {
            volume_min: Some(dec!(100)),
            volume_max: Some(dec!(1000)),
            ..CatalogFilters::default()
        };

        assert!(!filters.accepts(&event(dec!(50), None)));
        assert!(filters.accepts(&event(dec!(500), None)));
        assert!(!filters.accepts(&event(dec!(5000), None)));
    }

    #[test]
    fn date_filters_only_apply_when_end_date_known() {
        let now = Utc::now();
        let filters = CatalogFilters {
            close_after: Some(now),
            ..CatalogFilters::default()
        };

        // Ended before the cutoff: rejected
        assert!(!filters.accepts(&event(Decimal::ZERO, Some(now - chrono::Duration::days(1)))));
        // Ends after the cutoff: accepted
        assert!(filters.accepts(&event(Decimal::ZERO, Some(now + chrono::Duration::days(1)))));
        // Unknown end date: accepted
        assert!(filters.accepts(&event(Decimal::ZERO, None)));
    }
}
