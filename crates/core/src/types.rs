//! Canonical catalog shapes shared by both exchanges.
//!
//! Every raw venue payload is mapped into these types at the ingestion
//! boundary; nothing downstream of ingestion sees exchange-native field names
//! or price units. Prices are probabilities in [0, 1], never cents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Exchange Identifiers
// =============================================================================

/// Identifies which venue a market or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    /// Kalshi, the regulated derivatives venue.
    Kalshi,
    /// Polymarket, the decentralized prediction-market venue.
    Polymarket,
}

impl Exchange {
    /// Returns the lowercase wire/storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kalshi => "kalshi",
            Self::Polymarket => "polymarket",
        }
    }

    /// Returns the other venue.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Kalshi => Self::Polymarket,
            Self::Polymarket => Self::Kalshi,
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kalshi" => Ok(Self::Kalshi),
            "polymarket" => Ok(Self::Polymarket),
            other => Err(format!("unknown exchange: {other}")),
        }
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// One tradable outcome of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Outcome label ("Yes", "No", a candidate name, ...).
    pub name: String,
    /// Probability price in [0, 1]; `None` when the venue reports no quote.
    pub price: Option<Decimal>,
}

impl Outcome {
    /// Creates an outcome with a quoted price.
    #[must_use]
    pub fn priced(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
        }
    }

    /// Creates an outcome without a quote.
    #[must_use]
    pub fn unpriced(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
        }
    }
}

// =============================================================================
// Market
// =============================================================================

/// One tradable contract on one exchange.
///
/// Invariant: `(exchange, external_id)` is globally unique; repeated syncs
/// upsert by that key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// Venue this market trades on.
    pub exchange: Exchange,
    /// Venue-native identifier (ticker on Kalshi, condition id on Polymarket).
    pub external_id: String,
    /// Venue-native identifier of the parent event, if any.
    pub event_external_id: Option<String>,
    /// Market title / question.
    pub title: String,
    /// Market description or settlement rules.
    pub description: String,
    /// Ordered list of outcomes with probability prices.
    pub outcomes: Vec<Outcome>,
    /// Link to the market on the venue.
    pub url: String,
    /// Lifetime traded volume.
    pub volume: Decimal,
    /// Volume over the trailing 24 hours.
    pub volume_24h: Decimal,
    /// Resting liquidity.
    pub liquidity: Decimal,
    /// Open interest.
    pub open_interest: Decimal,
    /// Whether the market is currently tradable.
    pub is_active: bool,
    /// Scheduled close time, if known.
    pub close_time: Option<DateTime<Utc>>,
}

impl Market {
    /// Returns the quoted (yes, no) probability prices for a binary market.
    ///
    /// Outcome names are compared case-insensitively; zero or missing quotes
    /// yield `None` for that side, so callers can tell "no quote" apart from
    /// "quoted at zero".
    #[must_use]
    pub fn binary_prices(&self) -> (Option<Decimal>, Option<Decimal>) {
        let mut yes = None;
        let mut no = None;

        for outcome in &self.outcomes {
            let Some(price) = outcome.price else {
                continue;
            };
            if price <= Decimal::ZERO {
                continue;
            }
            if outcome.name.eq_ignore_ascii_case("yes") {
                yes = Some(price);
            } else if outcome.name.eq_ignore_ascii_case("no") {
                no = Some(price);
            }
        }

        (yes, no)
    }
}

// =============================================================================
// Event
// =============================================================================

/// A container grouping related markets from the same exchange.
///
/// The volume/liquidity/open-interest metrics are recomputed at normalization
/// time as sums over child markets; they are never independently
/// authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Venue this event belongs to.
    pub exchange: Exchange,
    /// Venue-native identifier (event ticker on Kalshi, id/slug on Polymarket).
    pub external_id: String,
    /// Event title.
    pub title: String,
    /// Event description.
    pub description: String,
    /// Venue category label, if any.
    pub category: String,
    /// Link to the event on the venue.
    pub url: String,
    /// Sum of child-market volume.
    pub volume: Decimal,
    /// Sum of child-market 24h volume.
    pub volume_24h: Decimal,
    /// Sum of child-market liquidity.
    pub liquidity: Decimal,
    /// Sum of child-market open interest.
    pub open_interest: Decimal,
    /// Whether the event is currently open.
    pub is_active: bool,
    /// Whether at most one child market can resolve yes.
    pub mutually_exclusive: bool,
    /// Latest close time across child markets, if known.
    pub end_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn binary_market(yes: Option<Decimal>, no: Option<Decimal>) -> Market {
        Market {
            exchange: Exchange::Kalshi,
            external_id: "TEST-MARKET".to_string(),
            event_external_id: None,
            title: "Test market".to_string(),
            description: String::new(),
            outcomes: vec![
                Outcome {
                    name: "Yes".to_string(),
                    price: yes,
                },
                Outcome {
                    name: "No".to_string(),
                    price: no,
                },
            ],
            url: String::new(),
            volume: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            liquidity: Decimal::ZERO,
            open_interest: Decimal::ZERO,
            is_active: true,
            close_time: None,
        }
    }

    // ==================== Exchange Tests ====================

    #[test]
    fn exchange_round_trips_through_str() {
        assert_eq!(Exchange::Kalshi.as_str(), "kalshi");
        assert_eq!("polymarket".parse::<Exchange>(), Ok(Exchange::Polymarket));
        assert!("nyse".parse::<Exchange>().is_err());
    }

    #[test]
    fn exchange_other_flips_venue() {
        assert_eq!(Exchange::Kalshi.other(), Exchange::Polymarket);
        assert_eq!(Exchange::Polymarket.other(), Exchange::Kalshi);
    }

    #[test]
    fn exchange_serializes_lowercase() {
        let json = serde_json::to_string(&Exchange::Kalshi).unwrap();
        assert_eq!(json, "\"kalshi\"");
    }

    // ==================== Binary Price Tests ====================

    #[test]
    fn binary_prices_reads_both_sides() {
        let market = binary_market(Some(dec!(0.40)), Some(dec!(0.55)));
        assert_eq!(market.binary_prices(), (Some(dec!(0.40)), Some(dec!(0.55))));
    }

    #[test]
    fn binary_prices_is_case_insensitive() {
        let mut market = binary_market(Some(dec!(0.30)), Some(dec!(0.60)));
        market.outcomes[0].name = "YES".to_string();
        market.outcomes[1].name = "no".to_string();
        assert_eq!(market.binary_prices(), (Some(dec!(0.30)), Some(dec!(0.60))));
    }

    #[test]
    fn binary_prices_skips_zero_and_missing_quotes() {
        let market = binary_market(Some(Decimal::ZERO), None);
        assert_eq!(market.binary_prices(), (None, None));
    }

    #[test]
    fn binary_prices_ignores_non_binary_outcomes() {
        let mut market = binary_market(Some(dec!(0.40)), Some(dec!(0.55)));
        market
            .outcomes
            .push(Outcome::priced("Novak Djokovic", dec!(0.20)));
        assert_eq!(market.binary_prices(), (Some(dec!(0.40)), Some(dec!(0.55))));
    }
}
