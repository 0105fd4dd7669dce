//! Cross-exchange match records.
//!
//! A match is a directed-pair claim that a Kalshi entity and a Polymarket
//! entity describe the same proposition. The (kalshi, polymarket) identifier
//! pair is the record identity: re-matching the same pair updates the existing
//! record instead of duplicating it. The verification fields are owned by
//! human review; matching runs never write them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A market-level match between the two exchanges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketMatch {
    /// External id of the Kalshi-side market.
    pub kalshi_external_id: String,
    /// External id of the Polymarket-side market.
    pub polymarket_external_id: String,
    /// Combined similarity confidence in [0, 1].
    pub similarity_score: f64,
    /// Human-readable explanation of why the pair was matched.
    pub match_reason: String,
    /// Set by a human reviewer, never by a matching run.
    pub is_verified: bool,
    /// When a human toggled `is_verified` on.
    pub verified_at: Option<DateTime<Utc>>,
}

impl MarketMatch {
    /// Creates an unverified match as produced by a matching run.
    #[must_use]
    pub fn new(
        kalshi_external_id: impl Into<String>,
        polymarket_external_id: impl Into<String>,
        similarity_score: f64,
        match_reason: impl Into<String>,
    ) -> Self {
        Self {
            kalshi_external_id: kalshi_external_id.into(),
            polymarket_external_id: polymarket_external_id.into(),
            similarity_score,
            match_reason: match_reason.into(),
            is_verified: false,
            verified_at: None,
        }
    }

    /// The identity key this record upserts under.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (&self.kalshi_external_id, &self.polymarket_external_id)
    }
}

/// An event-level match between the two exchanges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMatch {
    /// External id of the Kalshi-side event.
    pub kalshi_external_id: String,
    /// External id of the Polymarket-side event.
    pub polymarket_external_id: String,
    /// Combined similarity confidence in [0, 1].
    pub similarity_score: f64,
    /// Human-readable explanation of why the pair was matched.
    pub match_reason: String,
    /// Set by a human reviewer, never by a matching run.
    pub is_verified: bool,
    /// When a human toggled `is_verified` on.
    pub verified_at: Option<DateTime<Utc>>,
}

impl EventMatch {
    /// Creates an unverified match as produced by a matching run.
    #[must_use]
    pub fn new(
        kalshi_external_id: impl Into<String>,
        polymarket_external_id: impl Into<String>,
        similarity_score: f64,
        match_reason: impl Into<String>,
    ) -> Self {
        Self {
            kalshi_external_id: kalshi_external_id.into(),
            polymarket_external_id: polymarket_external_id.into(),
            similarity_score,
            match_reason: match_reason.into(),
            is_verified: false,
            verified_at: None,
        }
    }

    /// The identity key this record upserts under.
    #[must_use]
    pub fn identity(&self) -> (&str, &str) {
        (&self.kalshi_external_id, &self.polymarket_external_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_match_is_unverified() {
        let m = MarketMatch::new("KXFED-25DEC", "0xabc", 0.72, "shared terms: fed, rates");
        assert!(!m.is_verified);
        assert!(m.verified_at.is_none());
        assert_eq!(m.identity(), ("KXFED-25DEC", "0xabc"));
    }

    #[test]
    fn event_match_identity_is_the_pair() {
        let m = EventMatch::new("KXELECTION", "election-2028", 0.81, "shared year: 2028");
        assert_eq!(m.identity(), ("KXELECTION", "election-2028"));
    }
}
