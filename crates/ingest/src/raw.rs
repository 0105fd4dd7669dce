//! Exchange-native record shapes.
//!
//! These mirror the venues' payloads closely enough to deserialize real
//! responses, including their quirks: Polymarket delivers outcome arrays
//! either inline or as JSON-encoded strings depending on endpoint, numbers
//! arrive as strings, and date fields are not always well-formed. The
//! ambiguity is modeled here as tagged unions and lenient fields; the
//! canonical model never carries it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// A list that arrives either inline (`["Yes","No"]`) or JSON-encoded inside
/// a string (`"[\"Yes\",\"No\"]"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaybeEncoded<T> {
    /// The list arrived as a plain JSON array.
    Inline(Vec<T>),
    /// The list arrived JSON-encoded inside a string.
    Encoded(String),
}

impl<T> Default for MaybeEncoded<T> {
    fn default() -> Self {
        Self::Inline(Vec::new())
    }
}

impl<T: DeserializeOwned + Clone> MaybeEncoded<T> {
    /// Decodes to a plain list; an undecodable encoded payload yields empty.
    #[must_use]
    pub fn decode(&self) -> Vec<T> {
        match self {
            Self::Inline(items) => items.clone(),
            Self::Encoded(payload) => serde_json::from_str(payload).unwrap_or_default(),
        }
    }
}

/// Parses an optional RFC 3339 timestamp, treating malformed values as
/// absent instead of failing the whole record.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

fn default_true() -> bool {
    true
}

/// Accepts identifiers that arrive as either JSON strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

// =============================================================================
// Kalshi
// =============================================================================

/// A Kalshi event with its nested markets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawKalshiEvent {
    #[serde(default)]
    pub event_ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sub_title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub mutually_exclusive: bool,
    #[serde(default)]
    pub markets: Vec<RawKalshiMarket>,
}

/// A Kalshi market. Ask prices are quoted in cents (1-99).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawKalshiMarket {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub rules_primary: String,
    #[serde(default)]
    pub yes_ask: Option<Decimal>,
    #[serde(default)]
    pub no_ask: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub volume_24h: Option<Decimal>,
    #[serde(default)]
    pub liquidity: Option<Decimal>,
    #[serde(default)]
    pub open_interest: Option<Decimal>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub close_time: Option<DateTime<Utc>>,
}

// =============================================================================
// Polymarket
// =============================================================================

/// A Polymarket event with its nested markets.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPolymarketEvent {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, rename = "negRisk")]
    pub neg_risk: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, rename = "endDate", deserialize_with = "lenient_datetime")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub markets: Vec<RawPolymarketMarket>,
}

impl Default for RawPolymarketEvent {
    fn default() -> Self {
        Self {
            id: String::new(),
            slug: String::new(),
            title: String::new(),
            description: String::new(),
            category: String::new(),
            neg_risk: false,
            // Mirrors the wire default: absent means still trading
            active: true,
            end_date: None,
            markets: Vec::new(),
        }
    }
}

/// A Polymarket market.
///
/// `outcomes`/`outcome_prices` shape-shift between endpoints; `tokens` is the
/// CLOB-side fallback carrying the same information.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPolymarketMarket {
    #[serde(default, rename = "conditionId", alias = "condition_id")]
    pub condition_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub outcomes: MaybeEncoded<String>,
    #[serde(default, rename = "outcomePrices", alias = "outcome_prices")]
    pub outcome_prices: MaybeEncoded<Decimal>,
    #[serde(default)]
    pub tokens: Vec<RawPolymarketToken>,
    #[serde(default, rename = "volumeNum", alias = "volume")]
    pub volume: Option<Decimal>,
    #[serde(default, rename = "volume24hr", alias = "volume_24h")]
    pub volume_24h: Option<Decimal>,
    #[serde(default, rename = "liquidityNum", alias = "liquidity")]
    pub liquidity: Option<Decimal>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, rename = "endDate", alias = "end_date_iso", deserialize_with = "lenient_datetime")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Default for RawPolymarketMarket {
    fn default() -> Self {
        Self {
            condition_id: String::new(),
            id: String::new(),
            question: String::new(),
            title: String::new(),
            description: String::new(),
            outcomes: MaybeEncoded::default(),
            outcome_prices: MaybeEncoded::default(),
            tokens: Vec::new(),
            volume: None,
            volume_24h: None,
            liquidity: None,
            // Mirrors the wire default: absent means still trading
            active: true,
            end_date: None,
        }
    }
}

/// CLOB token entry: one outcome with its last price.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPolymarketToken {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}
