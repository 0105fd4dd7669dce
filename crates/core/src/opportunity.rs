//! Detected arbitrage opportunities.
//!
//! An opportunity is a derived snapshot record: every detection run deactivates
//! the prior batch and inserts a fresh one. A recurring opportunity is a new
//! record, never a reactivation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Exchange;

/// Which venue combination an opportunity spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArbitrageKind {
    /// Both legs on Kalshi.
    KalshiOnly,
    /// Both legs on Polymarket.
    PolymarketOnly,
    /// One leg per venue, linked by a market match.
    CrossExchange,
}

impl ArbitrageKind {
    /// Returns the storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KalshiOnly => "kalshi_only",
            Self::PolymarketOnly => "polymarket_only",
            Self::CrossExchange => "cross_exchange",
        }
    }

    /// Returns the single-exchange kind for a venue.
    #[must_use]
    pub fn single(exchange: Exchange) -> Self {
        match exchange {
            Exchange::Kalshi => Self::KalshiOnly,
            Exchange::Polymarket => Self::PolymarketOnly,
        }
    }
}

impl std::fmt::Display for ArbitrageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ArbitrageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kalshi_only" => Ok(Self::KalshiOnly),
            "polymarket_only" => Ok(Self::PolymarketOnly),
            "cross_exchange" => Ok(Self::CrossExchange),
            other => Err(format!("unknown arbitrage kind: {other}")),
        }
    }
}

/// One leg of an arbitrage combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Venue the leg trades on.
    pub exchange: Exchange,
    /// External id of the market the leg trades.
    pub market_external_id: String,
    /// Outcome side bought ("Yes" or "No").
    pub outcome: String,
    /// Probability price paid, in [0, 1].
    pub price: Decimal,
}

/// A detected risk-free position combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Venue combination.
    pub kind: ArbitrageKind,
    /// Legs of the combination.
    pub positions: Vec<Position>,
    /// Sum of leg prices.
    pub total_cost: Decimal,
    /// Payout of a fully hedged binary combination; always 1.0 here.
    pub guaranteed_return: Decimal,
    /// `guaranteed_return - total_cost`.
    pub profit: Decimal,
    /// `profit / total_cost * 100`.
    pub profit_percent: Decimal,
    /// `guaranteed_return / total_cost`.
    pub expected_value: Decimal,
    /// Whether this row belongs to the latest detection snapshot.
    pub is_active: bool,
    /// When the detection run emitted this record.
    pub detected_at: DateTime<Utc>,
}

impl ArbitrageOpportunity {
    /// Creates an active opportunity from its legs, deriving all profit
    /// figures from the summed leg cost against a $1 guaranteed payout.
    ///
    /// Callers must only pass combinations whose total cost is positive and
    /// below 1; the constructor does the arithmetic, not the screening.
    #[must_use]
    pub fn from_positions(kind: ArbitrageKind, positions: Vec<Position>) -> Self {
        let total_cost: Decimal = positions.iter().map(|p| p.price).sum();
        let guaranteed_return = Decimal::ONE;
        let profit = guaranteed_return - total_cost;
        let profit_percent = profit / total_cost * Decimal::from(100);
        let expected_value = guaranteed_return / total_cost;

        Self {
            kind,
            positions,
            total_cost,
            guaranteed_return,
            profit,
            profit_percent,
            expected_value,
            is_active: true,
            detected_at: Utc::now(),
        }
    }
}
