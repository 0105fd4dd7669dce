//! Full-catalog arbitrage scan.
//!
//! Iterates every active market on each exchange for single-market
//! opportunities, then every match whose both linked markets are active for
//! cross-exchange opportunities, merges and ranks the findings, and replaces
//! the persisted active snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use predarb_core::{
    ArbitrageOpportunity, CatalogStore, Exchange, Market, MatchStore, OpportunityStore,
};

use crate::detector::{ArbitrageDetector, DetectorConfig};

/// Counts from one detection run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Active Kalshi markets scanned.
    pub kalshi_markets: usize,
    /// Active Polymarket markets scanned.
    pub polymarket_markets: usize,
    /// Matches with both sides active scanned.
    pub matches: usize,
    /// Single-market opportunities found on Kalshi.
    pub kalshi_single: usize,
    /// Single-market opportunities found on Polymarket.
    pub polymarket_single: usize,
    /// Cross-exchange opportunities found.
    pub cross_exchange: usize,
    /// Opportunities written as the new active snapshot.
    pub written: u64,
}

impl ScanReport {
    /// Total opportunities found in this run.
    #[must_use]
    pub fn total_found(&self) -> usize {
        self.kalshi_single + self.polymarket_single + self.cross_exchange
    }
}

/// Scans the stored catalog and persists a fresh opportunity snapshot.
pub struct ArbitrageScanner {
    detector: ArbitrageDetector,
    catalog: Arc<dyn CatalogStore>,
    matches: Arc<dyn MatchStore>,
    opportunities: Arc<dyn OpportunityStore>,
}

impl ArbitrageScanner {
    /// Creates a scanner over the given stores.
    #[must_use]
    pub fn new(
        config: DetectorConfig,
        catalog: Arc<dyn CatalogStore>,
        matches: Arc<dyn MatchStore>,
        opportunities: Arc<dyn OpportunityStore>,
    ) -> Self {
        Self {
            detector: ArbitrageDetector::with_config(config),
            catalog,
            matches,
            opportunities,
        }
    }

    /// Runs one full detection pass.
    ///
    /// Findings are sorted by profit percentage descending before being
    /// written; the write replaces the previous active snapshot in one
    /// deactivate-then-insert step.
    ///
    /// # Errors
    ///
    /// Propagates store failures; a failed run writes nothing.
    pub async fn run(&self) -> Result<ScanReport> {
        let kalshi_markets = self.catalog.active_markets(Exchange::Kalshi).await?;
        let polymarket_markets = self.catalog.active_markets(Exchange::Polymarket).await?;

        let mut report = ScanReport {
            kalshi_markets: kalshi_markets.len(),
            polymarket_markets: polymarket_markets.len(),
            ..ScanReport::default()
        };
        let mut found: Vec<ArbitrageOpportunity> = Vec::new();

        for market in &kalshi_markets {
            if let Some(opportunity) = self.detector.detect_single_market(market) {
                report.kalshi_single += 1;
                found.push(opportunity);
            }
        }
        for market in &polymarket_markets {
            if let Some(opportunity) = self.detector.detect_single_market(market) {
                report.polymarket_single += 1;
                found.push(opportunity);
            }
        }

        let by_id = |markets: &[Market]| -> HashMap<String, Market> {
            markets
                .iter()
                .map(|m| (m.external_id.clone(), m.clone()))
                .collect()
        };
        let kalshi_by_id = by_id(&kalshi_markets);
        let polymarket_by_id = by_id(&polymarket_markets);

        let matches = self.matches.active_market_matches().await?;
        report.matches = matches.len();

        for matched in &matches {
            let (Some(kalshi), Some(polymarket)) = (
                kalshi_by_id.get(&matched.kalshi_external_id),
                polymarket_by_id.get(&matched.polymarket_external_id),
            ) else {
                // The match store said both sides are active; a missing side
                // means the catalog moved between the two reads.
                warn!(
                    kalshi = %matched.kalshi_external_id,
                    polymarket = %matched.polymarket_external_id,
                    "matched market missing from active catalog, skipping"
                );
                continue;
            };

            if let Some(opportunity) = self.detector.detect_cross_exchange(matched, kalshi, polymarket)
            {
                report.cross_exchange += 1;
                found.push(opportunity);
            }
        }

        found.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));

        report.written = self.opportunities.replace_active(&found).await?;

        info!(
            kalshi_markets = report.kalshi_markets,
            polymarket_markets = report.polymarket_markets,
            matches = report.matches,
            found = report.total_found(),
            written = report.written,
            "arbitrage scan complete"
        );

        Ok(report)
    }
}
