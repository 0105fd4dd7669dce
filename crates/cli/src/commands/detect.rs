//! `detect` command: run the arbitrage scanner and print the ranked snapshot.

use std::sync::Arc;

use anyhow::Result;

use predarb_arbitrage::{ArbitrageScanner, DetectorConfig};
use predarb_core::AppConfig;

use super::Stores;

/// Runs one detection pass and prints the active snapshot.
pub async fn detect(config: &AppConfig, stores: &Stores) -> Result<()> {
    let scanner = ArbitrageScanner::new(
        DetectorConfig::default().with_min_profit(config.arbitrage.min_profit),
        Arc::clone(&stores.catalog),
        Arc::clone(&stores.matches),
        Arc::clone(&stores.opportunities),
    );

    let report = scanner.run().await?;

    println!(
        "scanned {} kalshi + {} polymarket markets and {} matches",
        report.kalshi_markets, report.polymarket_markets, report.matches
    );
    println!(
        "opportunities: {} kalshi-only, {} polymarket-only, {} cross-exchange",
        report.kalshi_single, report.polymarket_single, report.cross_exchange
    );

    let active = stores.opportunities.active_opportunities().await?;
    for opportunity in active.iter().take(10) {
        let legs: Vec<String> = opportunity
            .positions
            .iter()
            .map(|p| format!("{} {} @ {}", p.exchange, p.outcome, p.price))
            .collect();
        println!(
            "  [{}] cost {} -> profit {}% ({})",
            opportunity.kind,
            opportunity.total_cost,
            opportunity.profit_percent.round_dp(2),
            legs.join(" + ")
        );
    }

    Ok(())
}
