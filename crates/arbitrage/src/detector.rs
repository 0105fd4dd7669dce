//! Arbitrage opportunity detection.
//!
//! Operates over binary markets whose outcome prices are already normalized
//! probabilities in [0, 1]; price-unit conversion is an ingestion concern.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use predarb_core::{ArbitrageKind, ArbitrageOpportunity, Exchange, Market, MarketMatch, Position};

// =============================================================================
// Detection Configuration
// =============================================================================

/// Configuration for arbitrage detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum profit fraction below the $1 payout for a combination to be
    /// reported (0.01 = 1%).
    pub min_profit: Decimal,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_profit: dec!(0.01),
        }
    }
}

impl DetectorConfig {
    /// Sets the minimum profit threshold.
    #[must_use]
    pub fn with_min_profit(mut self, min_profit: Decimal) -> Self {
        self.min_profit = min_profit;
        self
    }
}

// =============================================================================
// Detector
// =============================================================================

/// Detects risk-free position combinations within and across exchanges.
#[derive(Debug, Clone, Default)]
pub struct ArbitrageDetector {
    config: DetectorConfig,
}

impl ArbitrageDetector {
    /// Creates a detector with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector with custom configuration.
    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detects arbitrage within one binary market.
    ///
    /// If `yes + no < 1 - min_profit`, buying both sides costs less than the
    /// guaranteed $1 payout. Markets missing either quote yield nothing.
    #[must_use]
    pub fn detect_single_market(&self, market: &Market) -> Option<ArbitrageOpportunity> {
        let (yes, no) = market.binary_prices();
        let (yes, no) = (yes?, no?);

        let total_cost = yes + no;
        if total_cost >= Decimal::ONE - self.config.min_profit {
            trace!(
                market = %market.external_id,
                total_cost = %total_cost,
                "no single-market arbitrage"
            );
            return None;
        }

        let positions = vec![
            Position {
                exchange: market.exchange,
                market_external_id: market.external_id.clone(),
                outcome: "Yes".to_string(),
                price: yes,
            },
            Position {
                exchange: market.exchange,
                market_external_id: market.external_id.clone(),
                outcome: "No".to_string(),
                price: no,
            },
        ];

        let opportunity =
            ArbitrageOpportunity::from_positions(ArbitrageKind::single(market.exchange), positions);

        debug!(
            market = %market.external_id,
            exchange = %market.exchange,
            total_cost = %opportunity.total_cost,
            profit_percent = %opportunity.profit_percent,
            "single-market arbitrage detected"
        );

        Some(opportunity)
    }

    /// Detects arbitrage across a matched market pair.
    ///
    /// Evaluates the two hedge strategies (Kalshi Yes + Polymarket No, and
    /// Polymarket Yes + Kalshi No); each is only valid when both legs have a
    /// defined price, and the one with higher profit is kept.
    ///
    /// The both-No strategy (profitable when the two propositions are
    /// mutually exclusive) is deliberately not evaluated: it is only safe
    /// with independent verification that the events are truly the same, and
    /// a heuristic match does not establish that.
    #[must_use]
    pub fn detect_cross_exchange(
        &self,
        matched: &MarketMatch,
        kalshi_market: &Market,
        polymarket_market: &Market,
    ) -> Option<ArbitrageOpportunity> {
        let (kalshi_yes, kalshi_no) = kalshi_market.binary_prices();
        let (poly_yes, poly_no) = polymarket_market.binary_prices();

        let strategy_a = match (kalshi_yes, poly_no) {
            (Some(yes), Some(no)) => self.cross_opportunity(
                matched,
                ("Yes", yes, &kalshi_market.external_id, Exchange::Kalshi),
                ("No", no, &polymarket_market.external_id, Exchange::Polymarket),
            ),
            _ => None,
        };

        let strategy_b = match (poly_yes, kalshi_no) {
            (Some(yes), Some(no)) => self.cross_opportunity(
                matched,
                ("Yes", yes, &polymarket_market.external_id, Exchange::Polymarket),
                ("No", no, &kalshi_market.external_id, Exchange::Kalshi),
            ),
            _ => None,
        };

        let best = match (strategy_a, strategy_b) {
            (Some(a), Some(b)) => {
                if a.profit_percent >= b.profit_percent {
                    Some(a)
                } else {
                    Some(b)
                }
            }
            (Some(o), None) | (None, Some(o)) => Some(o),
            (None, None) => None,
        };

        if let Some(ref opportunity) = best {
            debug!(
                kalshi = %matched.kalshi_external_id,
                polymarket = %matched.polymarket_external_id,
                total_cost = %opportunity.total_cost,
                profit_percent = %opportunity.profit_percent,
                "cross-exchange arbitrage detected"
            );
        }

        best
    }

    fn cross_opportunity(
        &self,
        matched: &MarketMatch,
        yes_leg: (&str, Decimal, &str, Exchange),
        no_leg: (&str, Decimal, &str, Exchange),
    ) -> Option<ArbitrageOpportunity> {
        let total_cost = yes_leg.1 + no_leg.1;
        if total_cost >= Decimal::ONE - self.config.min_profit {
            trace!(
                kalshi = %matched.kalshi_external_id,
                polymarket = %matched.polymarket_external_id,
                total_cost = %total_cost,
                "hedge combination above cost ceiling"
            );
            return None;
        }

        let positions = vec![
            Position {
                exchange: yes_leg.3,
                market_external_id: yes_leg.2.to_string(),
                outcome: yes_leg.0.to_string(),
                price: yes_leg.1,
            },
            Position {
                exchange: no_leg.3,
                market_external_id: no_leg.2.to_string(),
                outcome: no_leg.0.to_string(),
                price: no_leg.1,
            },
        ];

        Some(ArbitrageOpportunity::from_positions(
            ArbitrageKind::CrossExchange,
            positions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use predarb_core::Outcome;

    fn market(exchange: Exchange, id: &str, yes: Option<Decimal>, no: Option<Decimal>) -> Market {
        Market {
            exchange,
            external_id: id.to_string(),
            event_external_id: None,
            title: format!("{id} title"),
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

    fn matched(kalshi_id: &str, poly_id: &str) -> MarketMatch {
        MarketMatch::new(kalshi_id, poly_id, 0.85, "test match")
    }

    // ==================== Single-Market Tests ====================

    #[test]
    fn single_market_scenario_forty_fiftyfive() {
        let detector = ArbitrageDetector::new();
        let market = market(
            Exchange::Kalshi,
            "KXTEST",
            Some(dec!(0.40)),
            Some(dec!(0.55)),
        );

        let opportunity = detector.detect_single_market(&market).unwrap();

        assert_eq!(opportunity.kind, ArbitrageKind::KalshiOnly);
        assert_eq!(opportunity.total_cost, dec!(0.95));
        assert_eq!(opportunity.profit, dec!(0.05));
        // profit_percent = (1 - cost) / cost * 100 ~= 5.26%
        assert!(opportunity.profit_percent > dec!(5.26));
        assert!(opportunity.profit_percent < dec!(5.27));
        // expected_value = 1 / cost ~= 1.0526
        assert!(opportunity.expected_value > dec!(1.052));
        assert!(opportunity.expected_value < dec!(1.053));
        assert_eq!(opportunity.positions.len(), 2);
    }

    #[test]
    fn single_market_requires_strict_underpricing() {
        let detector = ArbitrageDetector::new();

        // Sums to exactly 1: fair, no opportunity
        let fair = market(Exchange::Kalshi, "FAIR", Some(dec!(0.60)), Some(dec!(0.40)));
        assert!(detector.detect_single_market(&fair).is_none());

        // Sums to 0.995: above the 1% threshold ceiling of 0.99
        let thin = market(Exchange::Kalshi, "THIN", Some(dec!(0.60)), Some(dec!(0.395)));
        assert!(detector.detect_single_market(&thin).is_none());
    }

    #[test]
    fn single_market_reported_profit_is_strictly_positive() {
        let detector = ArbitrageDetector::new();
        let market = market(
            Exchange::Polymarket,
            "0xcheap",
            Some(dec!(0.30)),
            Some(dec!(0.30)),
        );

        let opportunity = detector.detect_single_market(&market).unwrap();
        assert_eq!(opportunity.kind, ArbitrageKind::PolymarketOnly);
        assert!(opportunity.total_cost < Decimal::ONE);
        assert!(opportunity.profit > Decimal::ZERO);
    }

    #[test]
    fn single_market_skips_missing_quotes() {
        let detector = ArbitrageDetector::new();

        let no_yes = market(Exchange::Kalshi, "NOYES", None, Some(dec!(0.40)));
        assert!(detector.detect_single_market(&no_yes).is_none());

        let no_quotes = market(Exchange::Kalshi, "EMPTY", None, None);
        assert!(detector.detect_single_market(&no_quotes).is_none());
    }

    #[test]
    fn min_profit_threshold_is_configurable() {
        // 5% threshold: a 4% edge is not enough
        let strict = ArbitrageDetector::with_config(
            DetectorConfig::default().with_min_profit(dec!(0.05)),
        );
        let market = market(Exchange::Kalshi, "EDGE4", Some(dec!(0.48)), Some(dec!(0.48)));

        assert!(strict.detect_single_market(&market).is_none());
        assert!(ArbitrageDetector::new()
            .detect_single_market(&market)
            .is_some());
    }

    // ==================== Cross-Exchange Tests ====================

    #[test]
    fn cross_exchange_picks_better_strategy() {
        let detector = ArbitrageDetector::new();
        // Strategy A: kalshi yes 0.45 + poly no 0.48 = 0.93 (7.5%)
        // Strategy B: poly yes 0.51 + kalshi no 0.52 = 1.03 (none)
        let kalshi = market(
            Exchange::Kalshi,
            "KXBTC",
            Some(dec!(0.45)),
            Some(dec!(0.52)),
        );
        let poly = market(
            Exchange::Polymarket,
            "0xbtc",
            Some(dec!(0.51)),
            Some(dec!(0.48)),
        );

        let opportunity = detector
            .detect_cross_exchange(&matched("KXBTC", "0xbtc"), &kalshi, &poly)
            .unwrap();

        assert_eq!(opportunity.kind, ArbitrageKind::CrossExchange);
        assert_eq!(opportunity.total_cost, dec!(0.93));
        let yes_leg = &opportunity.positions[0];
        assert_eq!(yes_leg.exchange, Exchange::Kalshi);
        assert_eq!(yes_leg.outcome, "Yes");
    }

    #[test]
    fn cross_exchange_reverse_strategy() {
        let detector = ArbitrageDetector::new();
        // Only strategy B works: poly yes 0.40 + kalshi no 0.50 = 0.90
        let kalshi = market(
            Exchange::Kalshi,
            "KXFED",
            Some(dec!(0.55)),
            Some(dec!(0.50)),
        );
        let poly = market(
            Exchange::Polymarket,
            "0xfed",
            Some(dec!(0.40)),
            Some(dec!(0.50)),
        );

        let opportunity = detector
            .detect_cross_exchange(&matched("KXFED", "0xfed"), &kalshi, &poly)
            .unwrap();

        assert_eq!(opportunity.total_cost, dec!(0.90));
        let yes_leg = &opportunity.positions[0];
        assert_eq!(yes_leg.exchange, Exchange::Polymarket);
    }

    #[test]
    fn cross_exchange_requires_both_legs_priced() {
        let detector = ArbitrageDetector::new();
        // Poly has no No quote, killing strategy A; Kalshi has no No quote,
        // killing strategy B.
        let kalshi = market(Exchange::Kalshi, "KX", Some(dec!(0.30)), None);
        let poly = market(Exchange::Polymarket, "0x", Some(dec!(0.30)), None);

        assert!(detector
            .detect_cross_exchange(&matched("KX", "0x"), &kalshi, &poly)
            .is_none());
    }

    #[test]
    fn cross_exchange_fair_prices_yield_nothing() {
        let detector = ArbitrageDetector::new();
        let kalshi = market(Exchange::Kalshi, "KX", Some(dec!(0.55)), Some(dec!(0.47)));
        let poly = market(
            Exchange::Polymarket,
            "0x",
            Some(dec!(0.54)),
            Some(dec!(0.48)),
        );

        // Both hedges cost more than $1 - threshold
        assert!(detector
            .detect_cross_exchange(&matched("KX", "0x"), &kalshi, &poly)
            .is_none());
    }
}
