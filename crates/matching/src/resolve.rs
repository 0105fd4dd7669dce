//! Bounded-parallel best-match resolution.
//!
//! Exhaustively scores every (left, right) candidate pair and keeps, for each
//! left element, the single best right element at or above the threshold.
//! Scoring one left element against the whole right collection is independent
//! of every other left element, so elements are fanned out across a bounded
//! worker pool and joined at a barrier; both candidate collections are
//! read-only for the duration of a run.
//!
//! Ties are broken by first-encountered right element, so output is only
//! deterministic when input order is fixed. Completion order carries no
//! guarantee; results are sorted by score descending at the end.

use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Result of scoring one candidate pair.
#[derive(Debug, Clone)]
pub struct PairScore {
    /// Combined similarity in [0, 1].
    pub score: f64,
    /// Human-readable audit string for the pair.
    pub reason: String,
}

/// One resolved best-match pair, by index into the input collections.
#[derive(Debug, Clone)]
pub struct ResolvedPair {
    /// Index into the left collection.
    pub left: usize,
    /// Index into the right collection.
    pub right: usize,
    /// Combined similarity of the pair.
    pub score: f64,
    /// Audit string from the scorer.
    pub reason: String,
}

/// Resolves best pairwise assignments subject to a similarity threshold.
#[derive(Debug, Clone)]
pub struct MatchResolver {
    /// Minimum combined score for a pair to be kept.
    pub threshold: f64,
    /// Width of the bounded worker pool.
    pub workers: usize,
}

impl MatchResolver {
    /// Creates a resolver with the default pool width of 8.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            workers: 8,
        }
    }

    /// Overrides the worker pool width.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Scores every pair and returns at most one match per left element,
    /// sorted by score descending.
    ///
    /// The scoring function must be pure over its inputs; per-element tasks
    /// never communicate. A panicking task loses only that element's match
    /// and is logged, never propagated.
    pub async fn resolve<L, R, F>(
        &self,
        left: Arc<Vec<L>>,
        right: Arc<Vec<R>>,
        score_fn: Arc<F>,
    ) -> Vec<ResolvedPair>
    where
        L: Send + Sync + 'static,
        R: Send + Sync + 'static,
        F: Fn(&L, &R) -> PairScore + Send + Sync + 'static,
    {
        if left.is_empty() || right.is_empty() {
            return Vec::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for index in 0..left.len() {
            let left = Arc::clone(&left);
            let right = Arc::clone(&right);
            let score_fn = Arc::clone(&score_fn);
            let semaphore = Arc::clone(&semaphore);
            let threshold = self.threshold;

            tasks.spawn(async move {
                // Closing the semaphore is not part of this protocol, so the
                // acquire only fails if the pool itself is gone.
                let _permit = semaphore.acquire_owned().await.ok()?;

                let element = &left[index];
                let mut best: Option<(usize, PairScore)> = None;
                for (candidate_index, candidate) in right.iter().enumerate() {
                    let pair = score_fn(element, candidate);
                    let improves = match &best {
                        None => true,
                        // Strict: first-encountered wins ties.
                        Some((_, current)) => pair.score > current.score,
                    };
                    if improves {
                        best = Some((candidate_index, pair));
                    }
                }

                best.and_then(|(candidate_index, pair)| {
                    (pair.score >= threshold).then_some(ResolvedPair {
                        left: index,
                        right: candidate_index,
                        score: pair.score,
                        reason: pair.reason,
                    })
                })
            });
        }

        let mut matches = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(pair)) => matches.push(pair),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "candidate scoring task failed"),
            }
        }

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        debug!(
            left = left.len(),
            right = right.len(),
            matches = matches.len(),
            threshold = self.threshold,
            "match resolution complete"
        );

        matches
    }
}
