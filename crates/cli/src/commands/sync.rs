//! `sync` command: ingest exchange snapshots into the catalog.

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Args;
use rust_decimal::Decimal;

use predarb_core::AppConfig;
use predarb_ingest::{CatalogFilters, KalshiSnapshot, PolymarketSnapshot, SyncService};

use super::Stores;

/// Client-side catalog filter arguments.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only keep events closing on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub close_after: Option<NaiveDate>,

    /// Only keep events closing on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub close_before: Option<NaiveDate>,

    /// Minimum aggregated event volume
    #[arg(long)]
    pub volume_min: Option<Decimal>,

    /// Maximum aggregated event volume
    #[arg(long)]
    pub volume_max: Option<Decimal>,

    /// Minimum aggregated event liquidity
    #[arg(long)]
    pub liquidity_min: Option<Decimal>,

    /// Maximum aggregated event liquidity
    #[arg(long)]
    pub liquidity_max: Option<Decimal>,
}

impl FilterArgs {
    fn to_filters(&self) -> CatalogFilters {
        CatalogFilters {
            close_after: self
                .close_after
                .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap_or_default())),
            close_before: self
                .close_before
                .map(|d| Utc.from_utc_datetime(&d.and_hms_opt(23, 59, 59).unwrap_or_default())),
            volume_min: self.volume_min,
            volume_max: self.volume_max,
            liquidity_min: self.liquidity_min,
            liquidity_max: self.liquidity_max,
        }
    }
}

/// Runs a two-exchange snapshot sync and prints per-venue counts.
pub async fn sync(
    config: &AppConfig,
    stores: &Stores,
    kalshi_snapshot: &str,
    polymarket_snapshot: &str,
    filters: &FilterArgs,
) -> Result<()> {
    let service = SyncService::new(
        Arc::new(KalshiSnapshot::new(kalshi_snapshot)),
        Arc::new(PolymarketSnapshot::new(polymarket_snapshot)),
        Arc::clone(&stores.catalog),
        config.sync.clone(),
    );

    let report = service.sync_all(&filters.to_filters()).await;

    for (venue, outcome) in [("kalshi", &report.kalshi), ("polymarket", &report.polymarket)] {
        match outcome {
            Ok(counts) => println!(
                "{venue}: {} events, {} markets synced ({} records skipped)",
                counts.events, counts.markets, counts.skipped
            ),
            Err(err) => println!("{venue}: sync failed: {err}"),
        }
    }

    if !report.is_complete() {
        bail!("sync finished with failures");
    }
    Ok(())
}
