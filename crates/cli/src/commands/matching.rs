//! `match-events` / `match-markets` commands.

use anyhow::Result;

use predarb_core::{AppConfig, EventMatch, Exchange, MarketMatch};
use predarb_matching::{EventMatcher, MarketTextMatcher};

use super::Stores;

/// Matches events across exchanges and upserts the results.
pub async fn match_events(
    config: &AppConfig,
    stores: &Stores,
    threshold: Option<f64>,
) -> Result<()> {
    let threshold = threshold.unwrap_or(config.matching.event_threshold);
    let matcher = EventMatcher::new(threshold, config.matching.workers);

    let kalshi = stores.catalog.active_events(Exchange::Kalshi).await?;
    let polymarket = stores.catalog.active_events(Exchange::Polymarket).await?;
    let candidates = matcher.find_matches(&kalshi, &polymarket).await;

    for candidate in &candidates {
        stores
            .matches
            .upsert_event_match(&EventMatch::new(
                &candidate.kalshi_external_id,
                &candidate.polymarket_external_id,
                candidate.score,
                &candidate.reason,
            ))
            .await?;
    }

    println!(
        "event matching: {} kalshi x {} polymarket -> {} matches (threshold {threshold})",
        kalshi.len(),
        polymarket.len(),
        candidates.len()
    );
    Ok(())
}

/// Matches individual markets across exchanges and upserts the results.
pub async fn match_markets(
    config: &AppConfig,
    stores: &Stores,
    threshold: Option<f64>,
) -> Result<()> {
    let threshold = threshold.unwrap_or(config.matching.market_threshold);
    let matcher = MarketTextMatcher::new(threshold, config.matching.workers);

    let kalshi = stores.catalog.active_markets(Exchange::Kalshi).await?;
    let polymarket = stores.catalog.active_markets(Exchange::Polymarket).await?;
    let candidates = matcher.find_matches(&kalshi, &polymarket).await;

    for candidate in &candidates {
        stores
            .matches
            .upsert_market_match(&MarketMatch::new(
                &candidate.kalshi_external_id,
                &candidate.polymarket_external_id,
                candidate.score,
                &candidate.reason,
            ))
            .await?;
    }

    println!(
        "market matching: {} kalshi x {} polymarket -> {} matches (threshold {threshold})",
        kalshi.len(),
        polymarket.len(),
        candidates.len()
    );
    Ok(())
}
