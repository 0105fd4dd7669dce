//! Raw -> canonical catalog mapping.
//!
//! Price-unit normalization happens here: Kalshi asks above 1 are cents and
//! divide by 100, so everything downstream sees probabilities in [0, 1].
//! Event volume/liquidity/open-interest are recomputed as sums over child
//! markets rather than trusted from the venue. Records with no usable
//! identifier are skipped and counted, never fatal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::warn;

use predarb_core::{Event, Exchange, Market, Outcome};

use crate::raw::{RawKalshiEvent, RawPolymarketEvent, RawPolymarketMarket};
use crate::source::CatalogFilters;

/// Output of normalizing one exchange's raw catalog.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    /// Canonical events.
    pub events: Vec<Event>,
    /// Canonical markets across all events.
    pub markets: Vec<Market>,
    /// Raw records dropped for missing identifiers.
    pub skipped: usize,
}

impl NormalizedBatch {
    /// Applies client-side catalog filters, dropping filtered events along
    /// with their child markets.
    pub fn apply_filters(&mut self, filters: &CatalogFilters) {
        self.events.retain(|event| filters.accepts(event));

        let kept: std::collections::HashSet<(Exchange, String)> = self
            .events
            .iter()
            .map(|e| (e.exchange, e.external_id.clone()))
            .collect();

        self.markets.retain(|market| match &market.event_external_id {
            Some(parent) => kept.contains(&(market.exchange, parent.clone())),
            None => true,
        });
    }
}

/// Converts a cent-quoted ask into a probability; values at or below 1 are
/// already probabilities.
fn cents_to_probability(price: Decimal) -> Decimal {
    if price > Decimal::ONE {
        price / Decimal::from(100)
    } else {
        price
    }
}

// =============================================================================
// Kalshi
// =============================================================================

/// Normalizes a Kalshi event batch.
#[must_use]
pub fn normalize_kalshi(raws: &[RawKalshiEvent]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raws {
        if raw.event_ticker.is_empty() {
            warn!("skipping kalshi event without event_ticker");
            batch.skipped += 1;
            continue;
        }

        let url = format!("https://kalshi.com/markets/{}", raw.event_ticker);

        let mut volume = Decimal::ZERO;
        let mut volume_24h = Decimal::ZERO;
        let mut liquidity = Decimal::ZERO;
        let mut open_interest = Decimal::ZERO;
        let mut end_date: Option<DateTime<Utc>> = None;

        for market in &raw.markets {
            volume += market.volume.unwrap_or(Decimal::ZERO);
            volume_24h += market.volume_24h.unwrap_or(Decimal::ZERO);
            liquidity += market.liquidity.unwrap_or(Decimal::ZERO);
            open_interest += market.open_interest.unwrap_or(Decimal::ZERO);

            if let Some(close) = market.close_time {
                end_date = Some(end_date.map_or(close, |current| current.max(close)));
            }
        }

        for market in &raw.markets {
            if market.ticker.is_empty() {
                warn!(event = %raw.event_ticker, "skipping kalshi market without ticker");
                batch.skipped += 1;
                continue;
            }

            let outcomes = vec![
                Outcome {
                    name: "Yes".to_string(),
                    price: market.yes_ask.map(cents_to_probability),
                },
                Outcome {
                    name: "No".to_string(),
                    price: market.no_ask.map(cents_to_probability),
                },
            ];

            batch.markets.push(Market {
                exchange: Exchange::Kalshi,
                external_id: market.ticker.clone(),
                event_external_id: Some(raw.event_ticker.clone()),
                title: if market.title.is_empty() {
                    market.ticker.clone()
                } else {
                    market.title.clone()
                },
                description: market.rules_primary.clone(),
                outcomes,
                url: url.clone(),
                volume: market.volume.unwrap_or(Decimal::ZERO),
                volume_24h: market.volume_24h.unwrap_or(Decimal::ZERO),
                liquidity: market.liquidity.unwrap_or(Decimal::ZERO),
                open_interest: market.open_interest.unwrap_or(Decimal::ZERO),
                is_active: matches!(market.status.as_str(), "active" | "open"),
                close_time: market.close_time,
            });
        }

        batch.events.push(Event {
            exchange: Exchange::Kalshi,
            external_id: raw.event_ticker.clone(),
            title: if raw.title.is_empty() {
                raw.event_ticker.clone()
            } else {
                raw.title.clone()
            },
            description: raw.sub_title.clone(),
            category: raw.category.clone(),
            url,
            volume,
            volume_24h,
            liquidity,
            open_interest,
            is_active: true,
            mutually_exclusive: raw.mutually_exclusive,
            end_date,
        });
    }

    batch
}

// =============================================================================
// Polymarket
// =============================================================================

fn polymarket_outcomes(raw: &RawPolymarketMarket) -> Vec<Outcome> {
    let names = raw.outcomes.decode();
    let prices = raw.outcome_prices.decode();

    let mut outcomes: Vec<Outcome> = names
        .iter()
        .enumerate()
        .map(|(index, name)| Outcome {
            name: name.clone(),
            price: prices.get(index).copied(),
        })
        .collect();

    // CLOB token fallback when the gamma fields are absent
    if outcomes.is_empty() {
        outcomes = raw
            .tokens
            .iter()
            .filter(|token| !token.outcome.is_empty())
            .map(|token| Outcome {
                name: token.outcome.clone(),
                price: token.price,
            })
            .collect();
    }

    outcomes
}

/// Normalizes a Polymarket event batch.
#[must_use]
pub fn normalize_polymarket(raws: &[RawPolymarketEvent]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raws {
        let external_id = if raw.id.is_empty() {
            raw.slug.clone()
        } else {
            raw.id.clone()
        };
        if external_id.is_empty() {
            warn!("skipping polymarket event without id or slug");
            batch.skipped += 1;
            continue;
        }

        let url = if raw.slug.is_empty() {
            String::new()
        } else {
            format!("https://polymarket.com/event/{}", raw.slug)
        };

        let mut volume = Decimal::ZERO;
        let mut volume_24h = Decimal::ZERO;
        let mut liquidity = Decimal::ZERO;

        for market in &raw.markets {
            let market_external_id = if market.condition_id.is_empty() {
                market.id.clone()
            } else {
                market.condition_id.clone()
            };
            if market_external_id.is_empty() {
                warn!(event = %external_id, "skipping polymarket market without id");
                batch.skipped += 1;
                continue;
            }

            volume += market.volume.unwrap_or(Decimal::ZERO);
            volume_24h += market.volume_24h.unwrap_or(Decimal::ZERO);
            liquidity += market.liquidity.unwrap_or(Decimal::ZERO);

            let title = if market.question.is_empty() {
                market.title.clone()
            } else {
                market.question.clone()
            };

            batch.markets.push(Market {
                exchange: Exchange::Polymarket,
                external_id: market_external_id,
                event_external_id: Some(external_id.clone()),
                title,
                description: market.description.clone(),
                outcomes: polymarket_outcomes(market),
                url: url.clone(),
                volume: market.volume.unwrap_or(Decimal::ZERO),
                volume_24h: market.volume_24h.unwrap_or(Decimal::ZERO),
                liquidity: market.liquidity.unwrap_or(Decimal::ZERO),
                open_interest: Decimal::ZERO,
                is_active: market.active,
                close_time: market.end_date,
            });
        }

        batch.events.push(Event {
            exchange: Exchange::Polymarket,
            external_id,
            title: if raw.title.is_empty() {
                raw.slug.clone()
            } else {
                raw.title.clone()
            },
            description: raw.description.clone(),
            category: raw.category.clone(),
            url,
            volume,
            volume_24h,
            liquidity,
            open_interest: Decimal::ZERO,
            is_active: raw.active,
            mutually_exclusive: raw.neg_risk,
            end_date: raw.end_date,
        });
    }

    batch
}
