//! Multi-signal similarity scoring.
//!
//! The event scorer combines lexical, temporal, topical, and structural
//! evidence into one weighted confidence score. Temporal and topical signals
//! carry more weight than raw lexical similarity: titles about unrelated
//! events often share generic market phrasing. A corroboration bonus rewards
//! agreement across heterogeneous signal categories over a single strong one.
//!
//! The market-level [`TextMatcher`] keeps the lighter original contract:
//! TF-IDF cosine blended with key-term Jaccard.

use std::collections::BTreeSet;

use crate::text::TextFeatures;

fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn shared<T: Ord + Clone + ToString>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> Vec<String> {
    a.intersection(b).map(ToString::to_string).collect()
}

// =============================================================================
// Weights and Thresholds
// =============================================================================

/// Fixed signal weights; must sum to 1.0.
#[derive(Debug, Clone)]
pub struct SignalWeights {
    pub year: f64,
    pub date: f64,
    pub topic: f64,
    pub key_term: f64,
    pub entity: f64,
    pub number: f64,
    pub text_vector: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        // Temporal + topical (0.45) deliberately outweigh the raw lexical
        // cosine (0.20).
        Self {
            year: 0.15,
            date: 0.10,
            topic: 0.20,
            key_term: 0.20,
            entity: 0.10,
            number: 0.05,
            text_vector: 0.20,
        }
    }
}

impl SignalWeights {
    /// Sum of all weights; 1.0 for a well-formed configuration.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.year
            + self.date
            + self.topic
            + self.key_term
            + self.entity
            + self.number
            + self.text_vector
    }
}

/// Per-signal thresholds used only for counting corroborating signals.
#[derive(Debug, Clone)]
pub struct SignalThresholds {
    pub year: f64,
    pub date: f64,
    pub topic: f64,
    pub key_term: f64,
    pub entity: f64,
    pub number: f64,
    pub text_vector: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            year: 0.99,
            date: 0.99,
            topic: 0.5,
            key_term: 0.3,
            entity: 0.3,
            number: 0.5,
            text_vector: 0.4,
        }
    }
}

// =============================================================================
// Breakdown
// =============================================================================

/// Per-signal decomposition of a combined score.
///
/// Retains the concrete matched years/dates/topics/terms so a deterministic
/// human-readable reason string can be rendered for audit and manual
/// verification.
#[derive(Debug, Clone, Default)]
pub struct SignalBreakdown {
    pub year_score: f64,
    pub shared_years: Vec<String>,
    pub date_score: f64,
    pub shared_dates: Vec<String>,
    pub topic_score: f64,
    pub shared_topics: Vec<String>,
    pub key_term_score: f64,
    pub shared_terms: Vec<String>,
    pub entity_score: f64,
    pub shared_entities: Vec<String>,
    pub number_score: f64,
    pub shared_numbers: Vec<String>,
    /// Cosine similarity, absent when vectorization fell back.
    pub vector_score: Option<f64>,
    /// How many signal categories cleared their own threshold.
    pub corroborating_signals: usize,
    /// Whether the corroboration bonus multiplied the combined score.
    pub corroboration_applied: bool,
}

// =============================================================================
// Event Scorer
// =============================================================================

/// Weighted multi-signal scorer for event-level matching.
#[derive(Debug, Clone)]
pub struct EventScorer {
    pub weights: SignalWeights,
    pub thresholds: SignalThresholds,
    /// Multiplier applied when enough signals corroborate; result capped at 1.
    pub corroboration_factor: f64,
    /// Minimum corroborating signal categories for the bonus.
    pub corroboration_min: usize,
}

impl Default for EventScorer {
    fn default() -> Self {
        Self {
            weights: SignalWeights::default(),
            thresholds: SignalThresholds::default(),
            corroboration_factor: 1.15,
            corroboration_min: 3,
        }
    }
}

impl EventScorer {
    /// Scores a candidate pair from its extracted features and an optional
    /// precomputed text-vector cosine (absent when vectorization fell back).
    ///
    /// Returns the combined score in [0, 1] and the full signal breakdown.
    /// Without a vector signal the remaining weights are renormalized so the
    /// combined score keeps its [0, 1] meaning.
    #[must_use]
    pub fn score(
        &self,
        a: &TextFeatures,
        b: &TextFeatures,
        vector_similarity: Option<f64>,
    ) -> (f64, SignalBreakdown) {
        let mut breakdown = SignalBreakdown {
            shared_years: shared(&a.years, &b.years),
            shared_dates: shared(&a.dates, &b.dates),
            shared_topics: shared(&a.topics, &b.topics),
            shared_terms: shared(&a.key_terms, &b.key_terms),
            shared_entities: shared(&a.entities, &b.entities),
            shared_numbers: shared(&a.numbers, &b.numbers),
            vector_score: vector_similarity,
            ..SignalBreakdown::default()
        };

        // Any shared year/date is a full binary signal.
        breakdown.year_score = if breakdown.shared_years.is_empty() { 0.0 } else { 1.0 };
        breakdown.date_score = if breakdown.shared_dates.is_empty() { 0.0 } else { 1.0 };
        breakdown.topic_score = jaccard(&a.topics, &b.topics);
        breakdown.key_term_score = jaccard(&a.key_terms, &b.key_terms);
        breakdown.entity_score = jaccard(&a.entities, &b.entities);
        breakdown.number_score = jaccard(&a.numbers, &b.numbers);

        let w = &self.weights;
        let mut combined = w.year * breakdown.year_score
            + w.date * breakdown.date_score
            + w.topic * breakdown.topic_score
            + w.key_term * breakdown.key_term_score
            + w.entity * breakdown.entity_score
            + w.number * breakdown.number_score;

        match vector_similarity {
            Some(cosine) => combined += w.text_vector * cosine,
            None => {
                // Vector fallback: renormalize over the remaining weight mass.
                let remaining = w.total() - w.text_vector;
                if remaining > 0.0 {
                    combined /= remaining;
                }
            }
        }

        let t = &self.thresholds;
        let mut corroborating = 0;
        for (score, threshold) in [
            (breakdown.year_score, t.year),
            (breakdown.date_score, t.date),
            (breakdown.topic_score, t.topic),
            (breakdown.key_term_score, t.key_term),
            (breakdown.entity_score, t.entity),
            (breakdown.number_score, t.number),
        ] {
            if score >= threshold {
                corroborating += 1;
            }
        }
        if let Some(cosine) = vector_similarity {
            if cosine >= t.text_vector {
                corroborating += 1;
            }
        }
        breakdown.corroborating_signals = corroborating;

        if corroborating >= self.corroboration_min {
            combined = (combined * self.corroboration_factor).min(1.0);
            breakdown.corroboration_applied = true;
        }

        (combined.clamp(0.0, 1.0), breakdown)
    }

    /// Renders the deterministic audit string for a scored pair.
    #[must_use]
    pub fn match_reason(&self, breakdown: &SignalBreakdown, combined: f64) -> String {
        let mut reasons = Vec::new();

        if !breakdown.shared_years.is_empty() {
            reasons.push(format!(
                "Shared years: {}",
                breakdown.shared_years.join(", ")
            ));
        }
        if !breakdown.shared_dates.is_empty() {
            reasons.push(format!(
                "Shared dates: {}",
                breakdown.shared_dates.join(", ")
            ));
        }
        if !breakdown.shared_topics.is_empty() {
            reasons.push(format!(
                "Shared topics: {}",
                breakdown.shared_topics.join(", ")
            ));
        }
        if !breakdown.shared_terms.is_empty() {
            let terms: Vec<_> = breakdown.shared_terms.iter().take(5).cloned().collect();
            reasons.push(format!("Shared key terms: {}", terms.join(", ")));
        }
        if breakdown.corroboration_applied {
            reasons.push(format!(
                "{} corroborating signals",
                breakdown.corroborating_signals
            ));
        }

        reasons.push(format!("Combined similarity: {:.1}%", combined * 100.0));
        reasons.push(confidence_tier(combined).to_string());

        reasons.join(" | ")
    }
}

fn confidence_tier(score: f64) -> &'static str {
    if score >= 0.8 {
        "High confidence match"
    } else if score >= 0.7 {
        "Good confidence match"
    } else {
        "Moderate confidence - manual verification recommended"
    }
}

// =============================================================================
// Market-Level Text Matcher
// =============================================================================

/// Lighter market-level scorer: TF-IDF cosine blended with key-term Jaccard.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    pub vector_weight: f64,
    pub term_weight: f64,
}

impl Default for TextMatcher {
    fn default() -> Self {
        Self {
            vector_weight: 0.6,
            term_weight: 0.4,
        }
    }
}

impl TextMatcher {
    /// Combined market-title similarity; when the vector signal is absent the
    /// key-term Jaccard stands alone.
    #[must_use]
    pub fn score(
        &self,
        a: &TextFeatures,
        b: &TextFeatures,
        vector_similarity: Option<f64>,
    ) -> f64 {
        let term_sim = jaccard(&a.key_terms, &b.key_terms);
        match vector_similarity {
            Some(cosine) => self.vector_weight * cosine + self.term_weight * term_sim,
            None => term_sim,
        }
    }

    /// Renders the audit string for a scored market pair.
    #[must_use]
    pub fn match_reason(&self, a: &TextFeatures, b: &TextFeatures, combined: f64) -> String {
        let common = shared(&a.key_terms, &b.key_terms);
        let mut reasons = Vec::new();

        if !common.is_empty() {
            let terms: Vec<_> = common.into_iter().take(5).collect();
            reasons.push(format!("Shared key terms: {}", terms.join(", ")));
        }
        reasons.push(format!("Text similarity score: {:.1}%", combined * 100.0));
        reasons.push(confidence_tier(combined).to_string());

        reasons.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(text: &str) -> TextFeatures {
        TextFeatures::extract(text)
    }

    // ==================== Weight Tests ====================

    #[test]
    fn default_weights_sum_to_one() {
        assert!((SignalWeights::default().total() - 1.0).abs() < 1e-9);
    }

    // ==================== Event Scorer Tests ====================

    #[test]
    fn self_similarity_is_maximal() {
        let scorer = EventScorer::default();
        let x = features("Fed raises rates in March 2025");
        let y = features("Lakers win the finals");

        let (self_score, _) = scorer.score(&x, &x, Some(1.0));
        let (cross_score, _) = scorer.score(&x, &y, Some(0.0));

        assert!(self_score >= cross_score);
        assert!(self_score > 0.9);
    }

    #[test]
    fn fed_rate_titles_clear_the_default_threshold() {
        let scorer = EventScorer::default();
        let a = features("Fed raises rates in 2025");
        let b = features("Federal Reserve rate hike 2025");

        let (combined, breakdown) = scorer.score(&a, &b, Some(0.3));

        // Shared "2025" is a full binary year signal.
        assert!((breakdown.year_score - 1.0).abs() < 1e-9);
        // Abbreviation expansion puts both titles in the economics topic.
        assert!(breakdown.topic_score > 0.0);
        assert!(breakdown.shared_topics.contains(&"economics".to_string()));
        // Above the default cross-exchange threshold.
        assert!(combined > 0.5);
    }

    #[test]
    fn disjoint_titles_score_near_zero() {
        let scorer = EventScorer::default();
        let a = features("Fed raises rates in 2025");
        let b = features("Lakers beat Celtics tonight");

        let (combined, breakdown) = scorer.score(&a, &b, Some(0.0));
        assert!(combined < 0.1);
        assert_eq!(breakdown.year_score, 0.0);
        assert!(breakdown.shared_terms.is_empty());
    }

    #[test]
    fn corroboration_bonus_requires_three_signals() {
        let scorer = EventScorer::default();

        // Year + topic + strong term overlap -> three corroborating categories
        let a = features("Bitcoin above 100k in December 2025");
        let b = features("Bitcoin above 100k December 2025");
        let (_, breakdown) = scorer.score(&a, &b, None);
        assert!(breakdown.corroborating_signals >= 3);
        assert!(breakdown.corroboration_applied);

        // Year only -> no bonus
        let c = features("Something happens 2025");
        let d = features("Unrelated event 2025");
        let (_, breakdown) = scorer.score(&c, &d, None);
        assert!(!breakdown.corroboration_applied);
    }

    #[test]
    fn corroborated_score_is_capped_at_one() {
        let scorer = EventScorer::default();
        let x = features("Bitcoin above 100k in December 2025");

        let (combined, breakdown) = scorer.score(&x, &x, Some(1.0));
        assert!(breakdown.corroboration_applied);
        assert!(combined <= 1.0);
    }

    #[test]
    fn vector_fallback_renormalizes_weights() {
        let scorer = EventScorer::default();
        let x = features("Fed raises rates in 2025");

        // Identical features without a vector must still reach full score.
        let (combined, breakdown) = scorer.score(&x, &x, None);
        assert!(breakdown.vector_score.is_none());
        assert!(combined > 0.9);
    }

    // ==================== Reason Tests ====================

    #[test]
    fn match_reason_is_deterministic_and_complete() {
        let scorer = EventScorer::default();
        let a = features("Fed raises rates in 2025");
        let b = features("Federal Reserve rate hike 2025");

        let (combined, breakdown) = scorer.score(&a, &b, Some(0.3));
        let reason1 = scorer.match_reason(&breakdown, combined);
        let reason2 = scorer.match_reason(&breakdown, combined);

        assert_eq!(reason1, reason2);
        assert!(reason1.contains("Shared years: 2025"));
        assert!(reason1.contains("economics"));
        assert!(reason1.contains("Combined similarity"));
    }

    #[test]
    fn reason_tiers_follow_score() {
        assert_eq!(confidence_tier(0.85), "High confidence match");
        assert_eq!(confidence_tier(0.72), "Good confidence match");
        assert!(confidence_tier(0.55).contains("manual verification"));
    }

    // ==================== Text Matcher Tests ====================

    #[test]
    fn text_matcher_blends_vector_and_terms() {
        let matcher = TextMatcher::default();
        let a = features("Chiefs win the Super Bowl");
        let b = features("Chiefs win Super Bowl 2025");

        let blended = matcher.score(&a, &b, Some(0.8));
        let terms_only = matcher.score(&a, &b, None);

        assert!(blended > 0.0 && blended <= 1.0);
        assert!(terms_only > 0.0);
    }

    #[test]
    fn text_matcher_reason_lists_shared_terms() {
        let matcher = TextMatcher::default();
        let a = features("Chiefs win the Super Bowl");
        let b = features("Chiefs win Super Bowl 2025");

        let score = matcher.score(&a, &b, Some(0.8));
        let reason = matcher.match_reason(&a, &b, score);
        assert!(reason.contains("chiefs"));
        assert!(reason.contains("Text similarity score"));
    }
}
