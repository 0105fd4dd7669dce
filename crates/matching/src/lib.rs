//! Cross-exchange entity matching.
//!
//! Takes two independently-sourced catalogs of markets/events and decides
//! which entries describe the same real-world proposition. Market titles
//! about unrelated events often share generic phrasing ("Will X happen by
//! ..."), so the event scorer leans on temporal and topical evidence rather
//! than raw lexical similarity, and rewards agreement across heterogeneous
//! signals over a single strong one.
//!
//! # Modules
//!
//! - [`text`]: normalization, abbreviation expansion, and feature extraction
//! - [`tfidf`]: a small TF-IDF vectorizer with cosine similarity
//! - [`score`]: multi-signal event scoring and the market-level text scorer
//! - [`resolve`]: bounded-parallel best-match resolution
//! - [`matcher`]: catalog-level matchers producing persistable candidates
//! - [`sports`]: structured sports-market matching (team/league/season)

pub mod matcher;
pub mod resolve;
pub mod score;
pub mod sports;
pub mod text;
pub mod tfidf;

pub use matcher::{CandidateMatch, EventMatcher, MarketTextMatcher};
pub use resolve::{MatchResolver, PairScore, ResolvedPair};
pub use score::{EventScorer, SignalBreakdown, SignalWeights, TextMatcher};
pub use sports::{MarketKind, SportsInfo, SportsScorer};
pub use text::{TextFeatures, Topic};
pub use tfidf::{FittedVectorizer, SparseVector, TfidfVectorizer, VectorizeError};
