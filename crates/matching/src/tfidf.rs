//! A small TF-IDF vectorizer with cosine similarity.
//!
//! Vocabulary and document frequencies are fit once per resolution run over
//! the full batch of titles from both exchanges, so a term's weight is stable
//! within a run. Documents are tokenized on the abbreviation-expanded,
//! stopword-filtered normalized form with word n-grams up to `ngram_max`.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::text::{expand_abbreviations, is_stopword, normalize_text};

/// Errors from vectorizer fitting.
#[derive(Debug, Error)]
pub enum VectorizeError {
    /// No documents were provided to fit on.
    #[error("no documents to fit vectorizer on")]
    NoDocuments,

    /// Every document normalized to nothing; there is no vocabulary.
    #[error("degenerate input: empty vocabulary after tokenization")]
    EmptyVocabulary,
}

/// An L2-normalized sparse document vector, sorted by term index.
#[derive(Debug, Clone, Default)]
pub struct SparseVector(Vec<(usize, f64)>);

impl SparseVector {
    /// Returns true if the document produced no known terms.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Cosine similarity between two vectors; 0.0 when either is zero.
    ///
    /// Both vectors are unit-length, so the dot product is the cosine.
    #[must_use]
    pub fn cosine(&self, other: &Self) -> f64 {
        let mut dot = 0.0;
        let (mut i, mut j) = (0, 0);

        while i < self.0.len() && j < other.0.len() {
            let (ti, wi) = self.0[i];
            let (tj, wj) = other.0[j];
            match ti.cmp(&tj) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += wi * wj;
                    i += 1;
                    j += 1;
                }
            }
        }

        dot
    }
}

/// TF-IDF vectorizer configuration.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    /// Maximum word n-gram length (1 = unigrams only).
    pub ngram_max: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self { ngram_max: 2 }
    }
}

impl TfidfVectorizer {
    /// Creates a vectorizer with the given maximum n-gram length.
    #[must_use]
    pub fn new(ngram_max: usize) -> Self {
        Self {
            ngram_max: ngram_max.max(1),
        }
    }

    /// Fits vocabulary and inverse document frequencies over a batch.
    ///
    /// # Errors
    ///
    /// Returns [`VectorizeError::NoDocuments`] for an empty batch and
    /// [`VectorizeError::EmptyVocabulary`] when no document yields a single
    /// token; callers fall back to non-vector signals in that case.
    pub fn fit(&self, documents: &[String]) -> Result<FittedVectorizer, VectorizeError> {
        if documents.is_empty() {
            return Err(VectorizeError::NoDocuments);
        }

        // BTreeMap keeps term indices deterministic across runs.
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let mut seen: Vec<String> = tokenize_terms(doc, self.ngram_max);
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(VectorizeError::EmptyVocabulary);
        }

        let total = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());

        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            // Smoothed idf keeps terms present in every document at weight 1.
            idf.push(((1.0 + total) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(FittedVectorizer {
            vocabulary,
            idf,
            ngram_max: self.ngram_max,
        })
    }
}

/// A vectorizer fitted on one batch of documents.
#[derive(Debug, Clone)]
pub struct FittedVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_max: usize,
}

impl FittedVectorizer {
    /// Number of terms in the fitted vocabulary.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Transforms a document into an L2-normalized sparse vector.
    ///
    /// Terms outside the fitted vocabulary are ignored; a document with no
    /// known terms yields a zero vector.
    #[must_use]
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in tokenize_terms(document, self.ngram_max) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weighted: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm: f64 = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut weighted {
                *w /= norm;
            }
        }
        weighted.sort_unstable_by_key(|(index, _)| *index);

        SparseVector(weighted)
    }
}

/// Normalizes, expands, drops stopwords, and emits 1..=n word n-grams.
fn tokenize_terms(document: &str, ngram_max: usize) -> Vec<String> {
    let normalized = normalize_text(document);
    let expanded = expand_abbreviations(&normalized);
    let words: Vec<&str> = expanded
        .split_whitespace()
        .filter(|t| !is_stopword(t))
        .collect();

    let mut terms = Vec::new();
    for n in 1..=ngram_max {
        if words.len() < n {
            break;
        }
        for window in words.windows(n) {
            terms.push(window.join(" "));
        }
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    // ==================== Fit Tests ====================

    #[test]
    fn fit_rejects_empty_batch() {
        let vectorizer = TfidfVectorizer::default();
        assert!(matches!(
            vectorizer.fit(&[]),
            Err(VectorizeError::NoDocuments)
        ));
    }

    #[test]
    fn fit_rejects_degenerate_vocabulary() {
        let vectorizer = TfidfVectorizer::default();
        // Normalizes to nothing at all
        let result = vectorizer.fit(&docs(&["???", "!!!"]));
        assert!(matches!(result, Err(VectorizeError::EmptyVocabulary)));
    }

    #[test]
    fn fit_builds_unigrams_and_bigrams() {
        let vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer.fit(&docs(&["bitcoin hits 100k"])).unwrap();
        // unigrams: bitcoin, hits, 100k; bigrams: "bitcoin hits", "hits 100k"
        assert_eq!(fitted.vocabulary_size(), 5);
    }

    // ==================== Similarity Tests ====================

    #[test]
    fn identical_documents_have_unit_cosine() {
        let vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer
            .fit(&docs(&["fed rate hike december", "unrelated sports final"]))
            .unwrap();

        let a = fitted.transform("fed rate hike december");
        let b = fitted.transform("fed rate hike december");
        assert!((a.cosine(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_documents_have_zero_cosine() {
        let vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer
            .fit(&docs(&["bitcoin price", "senate election"]))
            .unwrap();

        let a = fitted.transform("bitcoin price");
        let b = fitted.transform("senate election");
        assert!(a.cosine(&b).abs() < 1e-9);
    }

    #[test]
    fn overlapping_documents_fall_in_between() {
        let vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer
            .fit(&docs(&[
                "fed raises rates 2025",
                "federal reserve rate hike 2025",
            ]))
            .unwrap();

        let a = fitted.transform("fed raises rates 2025");
        let b = fitted.transform("federal reserve rate hike 2025");
        let sim = a.cosine(&b);
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn unknown_terms_yield_zero_vector() {
        let vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer.fit(&docs(&["bitcoin price"])).unwrap();

        let v = fitted.transform("completely different words");
        assert!(v.is_zero());
        assert!(v.cosine(&fitted.transform("bitcoin price")).abs() < f64::EPSILON);
    }

    #[test]
    fn abbreviations_expand_before_vectorization() {
        let vectorizer = TfidfVectorizer::default();
        let fitted = vectorizer
            .fit(&docs(&["fed decision", "federal reserve decision"]))
            .unwrap();

        let a = fitted.transform("fed decision");
        let b = fitted.transform("federal reserve decision");
        // "fed" expands to "federal reserve", so the texts tokenize identically
        assert!((a.cosine(&b) - 1.0).abs() < 1e-9);
    }
}
