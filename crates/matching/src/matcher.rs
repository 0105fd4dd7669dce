//! Catalog-level matchers.
//!
//! Wire the text pipeline, the per-run TF-IDF fit, the pair scorers, and the
//! parallel resolver into operations over whole catalogs, producing candidate
//! matches ready to upsert keyed by their identity pair.

use std::sync::Arc;

use tracing::{info, warn};

use predarb_core::{Event, Market};

use crate::resolve::{MatchResolver, PairScore};
use crate::score::{EventScorer, TextMatcher};
use crate::text::TextFeatures;
use crate::tfidf::{FittedVectorizer, SparseVector, TfidfVectorizer};

/// A scored candidate pair ready for persistence.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    /// External id of the Kalshi-side entity.
    pub kalshi_external_id: String,
    /// External id of the Polymarket-side entity.
    pub polymarket_external_id: String,
    /// Combined similarity in [0, 1].
    pub score: f64,
    /// Audit string from the scorer.
    pub reason: String,
}

/// One prepared scoring candidate: features plus an optional document vector.
struct Candidate {
    external_id: String,
    features: TextFeatures,
    vector: Option<SparseVector>,
}

/// Fits the vectorizer over the whole batch once per run.
///
/// A degenerate batch (empty vocabulary) downgrades the entire run to the
/// non-vector signal subset instead of aborting it.
fn fit_batch(titles: &[String]) -> Option<FittedVectorizer> {
    match TfidfVectorizer::default().fit(titles) {
        Ok(fitted) => Some(fitted),
        Err(err) => {
            warn!(error = %err, "vectorization unavailable, falling back to non-vector signals");
            None
        }
    }
}

fn prepare(
    ids_and_titles: Vec<(String, String)>,
    fitted: Option<&FittedVectorizer>,
) -> Vec<Candidate> {
    ids_and_titles
        .into_iter()
        .map(|(external_id, title)| {
            let vector = fitted.map(|f| f.transform(&title));
            Candidate {
                external_id,
                features: TextFeatures::extract(&title),
                vector,
            }
        })
        .collect()
}

fn pair_vector_similarity(a: &Candidate, b: &Candidate) -> Option<f64> {
    match (&a.vector, &b.vector) {
        (Some(va), Some(vb)) => Some(va.cosine(vb)),
        _ => None,
    }
}

// =============================================================================
// Event Matcher
// =============================================================================

/// Matches events across exchanges with the multi-signal scorer.
#[derive(Debug, Clone)]
pub struct EventMatcher {
    scorer: EventScorer,
    resolver: MatchResolver,
}

impl EventMatcher {
    /// Creates a matcher with the given threshold and worker pool width.
    #[must_use]
    pub fn new(threshold: f64, workers: usize) -> Self {
        Self {
            scorer: EventScorer::default(),
            resolver: MatchResolver::new(threshold).with_workers(workers),
        }
    }

    /// Finds, for each Kalshi event, its best Polymarket counterpart at or
    /// above the threshold. Results are sorted by score descending.
    pub async fn find_matches(
        &self,
        kalshi: &[Event],
        polymarket: &[Event],
    ) -> Vec<CandidateMatch> {
        let kalshi_titles: Vec<(String, String)> = kalshi
            .iter()
            .map(|e| (e.external_id.clone(), e.title.clone()))
            .collect();
        let polymarket_titles: Vec<(String, String)> = polymarket
            .iter()
            .map(|e| (e.external_id.clone(), e.title.clone()))
            .collect();

        let all_titles: Vec<String> = kalshi_titles
            .iter()
            .chain(polymarket_titles.iter())
            .map(|(_, title)| title.clone())
            .collect();
        let fitted = fit_batch(&all_titles);

        let left = Arc::new(prepare(kalshi_titles, fitted.as_ref()));
        let right = Arc::new(prepare(polymarket_titles, fitted.as_ref()));

        let scorer = self.scorer.clone();
        let score_fn = Arc::new(move |a: &Candidate, b: &Candidate| {
            let vector = pair_vector_similarity(a, b);
            let (score, breakdown) = scorer.score(&a.features, &b.features, vector);
            PairScore {
                score,
                reason: scorer.match_reason(&breakdown, score),
            }
        });

        let resolved = self
            .resolver
            .resolve(Arc::clone(&left), Arc::clone(&right), score_fn)
            .await;

        info!(
            kalshi = left.len(),
            polymarket = right.len(),
            matches = resolved.len(),
            "event matching complete"
        );

        resolved
            .into_iter()
            .map(|pair| CandidateMatch {
                kalshi_external_id: left[pair.left].external_id.clone(),
                polymarket_external_id: right[pair.right].external_id.clone(),
                score: pair.score,
                reason: pair.reason,
            })
            .collect()
    }
}

// =============================================================================
// Market Text Matcher
// =============================================================================

/// Matches individual markets across exchanges on title similarity alone.
#[derive(Debug, Clone)]
pub struct MarketTextMatcher {
    matcher: TextMatcher,
    resolver: MatchResolver,
}

impl MarketTextMatcher {
    /// Creates a matcher with the given threshold and worker pool width.
    #[must_use]
    pub fn new(threshold: f64, workers: usize) -> Self {
        Self {
            matcher: TextMatcher::default(),
            resolver: MatchResolver::new(threshold).with_workers(workers),
        }
    }

    /// Finds, for each Kalshi market, its best Polymarket counterpart at or
    /// above the threshold. Results are sorted by score descending.
    pub async fn find_matches(
        &self,
        kalshi: &[Market],
        polymarket: &[Market],
    ) -> Vec<CandidateMatch> {
        let kalshi_titles: Vec<(String, String)> = kalshi
            .iter()
            .map(|m| (m.external_id.clone(), m.title.clone()))
            .collect();
        let polymarket_titles: Vec<(String, String)> = polymarket
            .iter()
            .map(|m| (m.external_id.clone(), m.title.clone()))
            .collect();

        let all_titles: Vec<String> = kalshi_titles
            .iter()
            .chain(polymarket_titles.iter())
            .map(|(_, title)| title.clone())
            .collect();
        let fitted = fit_batch(&all_titles);

        let left = Arc::new(prepare(kalshi_titles, fitted.as_ref()));
        let right = Arc::new(prepare(polymarket_titles, fitted.as_ref()));

        let matcher = self.matcher.clone();
        let score_fn = Arc::new(move |a: &Candidate, b: &Candidate| {
            let vector = pair_vector_similarity(a, b);
            let score = matcher.score(&a.features, &b.features, vector);
            PairScore {
                score,
                reason: matcher.match_reason(&a.features, &b.features, score),
            }
        });

        let resolved = self
            .resolver
            .resolve(Arc::clone(&left), Arc::clone(&right), score_fn)
            .await;

        info!(
            kalshi = left.len(),
            polymarket = right.len(),
            matches = resolved.len(),
            "market matching complete"
        );

        resolved
            .into_iter()
            .map(|pair| CandidateMatch {
                kalshi_external_id: left[pair.left].external_id.clone(),
                polymarket_external_id: right[pair.right].external_id.clone(),
                score: pair.score,
                reason: pair.reason,
            })
            .collect()
    }
}
