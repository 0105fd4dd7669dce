//! Two-exchange catalog sync.
//!
//! The two venue syncs run concurrently and fail independently: a Kalshi
//! outage never blocks the Polymarket sync. Every collaborator call runs
//! under an explicit deadline, since a stuck catalog fetch has no other way
//! to time out.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use predarb_core::{CatalogStore, Exchange, SyncConfig};

use crate::normalize::{normalize_kalshi, normalize_polymarket, NormalizedBatch};
use crate::source::{CatalogFilters, KalshiCatalog, PolymarketCatalog};

/// Errors from one exchange's sync.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The catalog source did not answer within the deadline.
    #[error("{exchange} catalog fetch timed out after {timeout_secs}s")]
    FetchTimeout {
        /// Venue whose fetch timed out.
        exchange: Exchange,
        /// The deadline that was exceeded.
        timeout_secs: u64,
    },

    /// The catalog source failed.
    #[error("{exchange} catalog fetch failed: {source}")]
    Fetch {
        /// Venue whose fetch failed.
        exchange: Exchange,
        /// Underlying source error.
        #[source]
        source: anyhow::Error,
    },

    /// Persisting the normalized batch failed.
    #[error("store write failed: {0}")]
    Store(#[source] anyhow::Error),
}

/// Counts from one exchange's completed sync.
#[derive(Debug, Clone, Default)]
pub struct ExchangeSyncReport {
    /// Events written.
    pub events: u64,
    /// Markets written.
    pub markets: u64,
    /// Raw records skipped for missing identifiers.
    pub skipped: usize,
}

/// Combined result of a two-exchange sync run.
///
/// Each side carries its own outcome; one venue failing leaves the other's
/// counts intact.
#[derive(Debug)]
pub struct SyncReport {
    /// Kalshi outcome.
    pub kalshi: Result<ExchangeSyncReport, IngestError>,
    /// Polymarket outcome.
    pub polymarket: Result<ExchangeSyncReport, IngestError>,
}

impl SyncReport {
    /// Returns true when both exchanges synced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.kalshi.is_ok() && self.polymarket.is_ok()
    }
}

/// Syncs both exchange catalogs into the store.
pub struct SyncService {
    kalshi: Arc<dyn KalshiCatalog>,
    polymarket: Arc<dyn PolymarketCatalog>,
    store: Arc<dyn CatalogStore>,
    config: SyncConfig,
}

impl SyncService {
    /// Creates a sync service over the given sources and store.
    #[must_use]
    pub fn new(
        kalshi: Arc<dyn KalshiCatalog>,
        polymarket: Arc<dyn PolymarketCatalog>,
        store: Arc<dyn CatalogStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            kalshi,
            polymarket,
            store,
            config,
        }
    }

    /// Syncs both exchanges concurrently.
    pub async fn sync_all(&self, filters: &CatalogFilters) -> SyncReport {
        let (kalshi, polymarket) =
            tokio::join!(self.sync_kalshi(filters), self.sync_polymarket(filters));

        if let Err(ref err) = kalshi {
            error!(error = %err, "kalshi sync failed");
        }
        if let Err(ref err) = polymarket {
            error!(error = %err, "polymarket sync failed");
        }

        SyncReport { kalshi, polymarket }
    }

    /// Syncs the Kalshi catalog.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] when the fetch times out or fails, or the
    /// store rejects the batch.
    pub async fn sync_kalshi(
        &self,
        filters: &CatalogFilters,
    ) -> Result<ExchangeSyncReport, IngestError> {
        let raw = self
            .fetch_with_deadline(Exchange::Kalshi, self.kalshi.fetch_events(filters))
            .await?;

        let mut batch = normalize_kalshi(&raw);
        batch.apply_filters(filters);
        self.persist(Exchange::Kalshi, batch).await
    }

    /// Syncs the Polymarket catalog.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] when the fetch times out or fails, or the
    /// store rejects the batch.
    pub async fn sync_polymarket(
        &self,
        filters: &CatalogFilters,
    ) -> Result<ExchangeSyncReport, IngestError> {
        let raw = self
            .fetch_with_deadline(Exchange::Polymarket, self.polymarket.fetch_events(filters))
            .await?;

        let mut batch = normalize_polymarket(&raw);
        batch.apply_filters(filters);
        self.persist(Exchange::Polymarket, batch).await
    }

    async fn fetch_with_deadline<T>(
        &self,
        exchange: Exchange,
        fetch: impl std::future::Future<Output = anyhow::Result<Vec<T>>>,
    ) -> Result<Vec<T>, IngestError> {
        let timeout_secs = self.config.fetch_timeout_secs;
        tokio::time::timeout(Duration::from_secs(timeout_secs), fetch)
            .await
            .map_err(|_| IngestError::FetchTimeout {
                exchange,
                timeout_secs,
            })?
            .map_err(|source| IngestError::Fetch { exchange, source })
    }

    async fn persist(
        &self,
        exchange: Exchange,
        batch: NormalizedBatch,
    ) -> Result<ExchangeSyncReport, IngestError> {
        let events = self
            .store
            .upsert_events(&batch.events)
            .await
            .map_err(IngestError::Store)?;
        let markets = self
            .store
            .upsert_markets(&batch.markets)
            .await
            .map_err(IngestError::Store)?;

        info!(
            exchange = %exchange,
            events,
            markets,
            skipped = batch.skipped,
            "catalog sync complete"
        );

        Ok(ExchangeSyncReport {
            events,
            markets,
            skipped: batch.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{RawKalshiEvent, RawKalshiMarket, RawPolymarketEvent, RawPolymarketMarket};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use predarb_data::MemoryStore;

    struct FixedKalshi(Vec<RawKalshiEvent>);

    #[async_trait]
    impl KalshiCatalog for FixedKalshi {
        async fn fetch_events(&self, _: &CatalogFilters) -> anyhow::Result<Vec<RawKalshiEvent>> {
            Ok(self.0.clone())
        }
    }

    struct FailingKalshi;

    #[async_trait]
    impl KalshiCatalog for FailingKalshi {
        async fn fetch_events(&self, _: &CatalogFilters) -> anyhow::Result<Vec<RawKalshiEvent>> {
            Err(anyhow!("connection refused"))
        }
    }

    struct StuckKalshi;

    #[async_trait]
    impl KalshiCatalog for StuckKalshi {
        async fn fetch_events(&self, _: &CatalogFilters) -> anyhow::Result<Vec<RawKalshiEvent>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    struct FixedPolymarket(Vec<RawPolymarketEvent>);

    #[async_trait]
    impl PolymarketCatalog for FixedPolymarket {
        async fn fetch_events(
            &self,
            _: &CatalogFilters,
        ) -> anyhow::Result<Vec<RawPolymarketEvent>> {
            Ok(self.0.clone())
        }
    }

    fn kalshi_events() -> Vec<RawKalshiEvent> {
        vec![RawKalshiEvent {
            event_ticker: "KXFED".to_string(),
            title: "Fed decision".to_string(),
            markets: vec![RawKalshiMarket {
                ticker: "KXFED-25DEC".to_string(),
                status: "active".to_string(),
                ..RawKalshiMarket::default()
            }],
            ..RawKalshiEvent::default()
        }]
    }

    fn polymarket_events() -> Vec<RawPolymarketEvent> {
        vec![RawPolymarketEvent {
            id: "9001".to_string(),
            slug: "fed-decision".to_string(),
            title: "Fed decision".to_string(),
            markets: vec![RawPolymarketMarket {
                condition_id: "0xfed".to_string(),
                ..RawPolymarketMarket::default()
            }],
            ..RawPolymarketEvent::default()
        }]
    }

    fn service(kalshi: impl KalshiCatalog + 'static, store: Arc<MemoryStore>) -> SyncService {
        SyncService::new(
            Arc::new(kalshi),
            Arc::new(FixedPolymarket(polymarket_events())),
            store,
            SyncConfig {
                fetch_timeout_secs: 1,
            },
        )
    }

    // ==================== Sync Tests ====================

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_all_writes_both_catalogs() {
        let store = Arc::new(MemoryStore::new());
        let service = service(FixedKalshi(kalshi_events()), Arc::clone(&store));

        let report = service.sync_all(&CatalogFilters::default()).await;

        assert!(report.is_complete());
        let kalshi = report.kalshi.unwrap();
        assert_eq!(kalshi.events, 1);
        assert_eq!(kalshi.markets, 1);
        assert_eq!(
            store.active_markets(Exchange::Kalshi).await.unwrap().len(),
            1
        );
        assert_eq!(
            store
                .active_markets(Exchange::Polymarket)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_venue_failing_does_not_block_the_other() {
        let store = Arc::new(MemoryStore::new());
        let service = service(FailingKalshi, Arc::clone(&store));

        let report = service.sync_all(&CatalogFilters::default()).await;

        assert!(!report.is_complete());
        assert!(matches!(report.kalshi, Err(IngestError::Fetch { .. })));
        assert!(report.polymarket.is_ok());
        assert_eq!(
            store
                .active_markets(Exchange::Polymarket)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stuck_fetch_hits_the_deadline() {
        let store = Arc::new(MemoryStore::new());
        let service = service(StuckKalshi, Arc::clone(&store));

        let report = service.sync_all(&CatalogFilters::default()).await;

        assert!(matches!(
            report.kalshi,
            Err(IngestError::FetchTimeout {
                exchange: Exchange::Kalshi,
                timeout_secs: 1
            })
        ));
        assert!(report.polymarket.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn repeated_sync_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let service = service(FixedKalshi(kalshi_events()), Arc::clone(&store));

        service.sync_all(&CatalogFilters::default()).await;
        service.sync_all(&CatalogFilters::default()).await;

        assert_eq!(
            store.active_markets(Exchange::Kalshi).await.unwrap().len(),
            1
        );
        assert_eq!(
            store.active_events(Exchange::Kalshi).await.unwrap().len(),
            1
        );
    }
}
