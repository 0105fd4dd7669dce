//! Text normalization and feature extraction.
//!
//! Turns a free-text market/event title into a canonical token form plus the
//! structured signals the scorer compares: years, date mentions, significant
//! numbers, a capitalized-word entity proxy, and coarse topic tags. The
//! abbreviation-expanded variant improves lexical recall without ever
//! mutating the canonical form used for display.

use std::collections::BTreeSet;

/// Prediction-market filler removed before token-overlap scoring.
///
/// Boilerplate phrasing ("Will X win?", "price above Y") would otherwise
/// inflate similarity between unrelated markets.
const STOPWORDS: &[&str] = &[
    "will", "be", "the", "to", "in", "on", "at", "by", "yes", "no", "market", "win", "winner",
    "price", "above", "below", "over", "under", "a", "an", "and", "or", "of", "for", "is", "are",
    "what", "when", "who",
];

/// Fixed domain abbreviation dictionary, expanded on whole-word boundaries.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("fed", "federal reserve"),
    ("fomc", "federal open market committee"),
    ("ecb", "european central bank"),
    ("boe", "bank of england"),
    ("gdp", "gross domestic product"),
    ("cpi", "consumer price index"),
    ("imf", "international monetary fund"),
    ("potus", "president of the united states"),
    ("scotus", "supreme court"),
    ("gop", "republican party"),
    ("eu", "european union"),
    ("un", "united nations"),
    ("uk", "united kingdom"),
    ("usa", "united states"),
    ("nyc", "new york city"),
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("ai", "artificial intelligence"),
    ("nfl", "national football league"),
    ("nba", "national basketball association"),
    ("mlb", "major league baseball"),
    ("nhl", "national hockey league"),
    ("epl", "english premier league"),
    ("ufc", "ultimate fighting championship"),
];

const MONTHS: &[(&str, &str)] = &[
    ("jan", "jan"),
    ("january", "jan"),
    ("feb", "feb"),
    ("february", "feb"),
    ("mar", "mar"),
    ("march", "mar"),
    ("apr", "apr"),
    ("april", "apr"),
    ("may", "may"),
    ("jun", "jun"),
    ("june", "jun"),
    ("jul", "jul"),
    ("july", "jul"),
    ("aug", "aug"),
    ("august", "aug"),
    ("sep", "sep"),
    ("sept", "sep"),
    ("september", "sep"),
    ("oct", "oct"),
    ("october", "oct"),
    ("nov", "nov"),
    ("november", "nov"),
    ("dec", "dec"),
    ("december", "dec"),
];

// =============================================================================
// Topics
// =============================================================================

/// Coarse subject-matter tag assigned by keyword membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Politics,
    Crypto,
    Economics,
    Tech,
    Sports,
    Entertainment,
}

impl Topic {
    /// Returns the display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Politics => "politics",
            Self::Crypto => "crypto",
            Self::Economics => "economics",
            Self::Tech => "tech",
            Self::Sports => "sports",
            Self::Entertainment => "entertainment",
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Politics => &[
                "election",
                "president",
                "senate",
                "congress",
                "governor",
                "vote",
                "ballot",
                "impeachment",
                "parliament",
                "prime minister",
                "republican",
                "democrat",
                "white house",
                "supreme court",
            ],
            Self::Crypto => &[
                "bitcoin",
                "ethereum",
                "crypto",
                "blockchain",
                "solana",
                "dogecoin",
                "stablecoin",
                "defi",
            ],
            Self::Economics => &[
                "federal reserve",
                "interest rate",
                "rate",
                "rates",
                "inflation",
                "recession",
                "gross domestic product",
                "consumer price index",
                "unemployment",
                "tariff",
                "treasury",
                "central bank",
                "economy",
            ],
            Self::Tech => &[
                "artificial intelligence",
                "openai",
                "google",
                "apple",
                "microsoft",
                "tesla",
                "spacex",
                "iphone",
                "software",
                "semiconductor",
                "nvidia",
            ],
            Self::Sports => &[
                "national football league",
                "national basketball association",
                "major league baseball",
                "national hockey league",
                "super bowl",
                "world cup",
                "playoffs",
                "championship",
                "finals",
                "premier league",
                "olympics",
                "grand slam",
                "wimbledon",
            ],
            Self::Entertainment => &[
                "oscar",
                "oscars",
                "grammy",
                "emmy",
                "box office",
                "movie",
                "album",
                "netflix",
                "spotify",
                "billboard",
            ],
        }
    }

    const ALL: [Self; 6] = [
        Self::Politics,
        Self::Crypto,
        Self::Economics,
        Self::Tech,
        Self::Sports,
        Self::Entertainment,
    ];
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalizes text: lowercase, non-alphanumeric collapsed to single spaces,
/// trimmed. Idempotent.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }

    out
}

/// Expands domain abbreviations on whole-word boundaries.
///
/// Input must already be normalized; the canonical form is left untouched by
/// callers, expansion only feeds term/topic extraction and vectorization.
#[must_use]
pub fn expand_abbreviations(normalized: &str) -> String {
    let mut words = Vec::new();
    for word in normalized.split_whitespace() {
        match ABBREVIATIONS.iter().find(|(abbr, _)| *abbr == word) {
            Some((_, expansion)) => words.push(*expansion),
            None => words.push(word),
        }
    }
    words.join(" ")
}

/// Returns true if the token is a stopword.
#[must_use]
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Stopword-filtered tokens of an abbreviation-expanded normalized text.
#[must_use]
pub fn key_terms(normalized_expanded: &str) -> BTreeSet<String> {
    normalized_expanded
        .split_whitespace()
        .filter(|t| !is_stopword(t))
        .map(ToString::to_string)
        .collect()
}

// =============================================================================
// Signal Extraction
// =============================================================================

fn plausible_year(token: &str) -> bool {
    token.len() == 4
        && token.chars().all(|c| c.is_ascii_digit())
        && (token.starts_with("19") || token.starts_with("20"))
}

/// Four-digit years in the plausible 1900-2099 range.
#[must_use]
pub fn extract_years(normalized: &str) -> BTreeSet<String> {
    normalized
        .split_whitespace()
        .filter(|t| plausible_year(t))
        .map(ToString::to_string)
        .collect()
}

fn month_key(token: &str) -> Option<&'static str> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, key)| *key)
}

fn day_of_month(token: &str) -> Option<u8> {
    if token.len() > 2 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day: u8 = token.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

/// Month-day mentions normalized to a `mmm d` key, in either token order
/// ("january 5" and "5 january" both yield "jan 5").
#[must_use]
pub fn extract_dates(normalized: &str) -> BTreeSet<String> {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut dates = BTreeSet::new();

    for window in tokens.windows(2) {
        if let Some(month) = month_key(window[0]) {
            if let Some(day) = day_of_month(window[1]) {
                dates.insert(format!("{month} {day}"));
            }
        }
        if let Some(month) = month_key(window[1]) {
            if let Some(day) = day_of_month(window[0]) {
                dates.insert(format!("{month} {day}"));
            }
        }
    }

    dates
}

/// Significant numeric tokens: at least two digits and not year-valued.
#[must_use]
pub fn extract_numbers(normalized: &str) -> BTreeSet<String> {
    normalized
        .split_whitespace()
        .filter(|t| t.len() >= 2 && t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !plausible_year(t))
        .map(ToString::to_string)
        .collect()
}

/// Capitalized-word runs from the raw (pre-normalization) text, lowercased,
/// as a cheap named-entity proxy.
///
/// Capitalized stopwords break runs; sentence-initial "Will" is boilerplate,
/// not a name.
#[must_use]
pub fn extract_entities(raw: &str) -> BTreeSet<String> {
    let mut entities = BTreeSet::new();
    let mut run: Vec<String> = Vec::new();

    for word in raw.split_whitespace() {
        let cleaned: String = word.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        let lowered = cleaned.to_ascii_lowercase();
        let capitalized = cleaned.chars().next().is_some_and(|c| c.is_ascii_uppercase());

        if capitalized && !is_stopword(&lowered) {
            run.push(lowered);
        } else if !run.is_empty() {
            entities.insert(run.join(" "));
            run.clear();
        }
    }
    if !run.is_empty() {
        entities.insert(run.join(" "));
    }

    entities
}

/// Topic tags assigned by keyword membership over the expanded text.
///
/// Single-word keywords match tokens exactly; multi-word keywords match as
/// whole-word phrases. A text may carry zero or more topics.
#[must_use]
pub fn extract_topics(normalized_expanded: &str) -> BTreeSet<Topic> {
    let tokens: BTreeSet<&str> = normalized_expanded.split_whitespace().collect();
    let padded = format!(" {normalized_expanded} ");

    let mut topics = BTreeSet::new();
    for topic in Topic::ALL {
        let hit = topic.keywords().iter().any(|kw| {
            if kw.contains(' ') {
                padded.contains(&format!(" {kw} "))
            } else {
                tokens.contains(kw)
            }
        });
        if hit {
            topics.insert(topic);
        }
    }

    topics
}

// =============================================================================
// Feature Bundle
// =============================================================================

/// Everything the scorer needs about one text, extracted once.
#[derive(Debug, Clone)]
pub struct TextFeatures {
    /// Canonical normalized form (display/debug use).
    pub normalized: String,
    /// Abbreviation-expanded normalized form (scoring use).
    pub expanded: String,
    /// Four-digit years mentioned.
    pub years: BTreeSet<String>,
    /// Month-day keys mentioned.
    pub dates: BTreeSet<String>,
    /// Significant non-year numbers.
    pub numbers: BTreeSet<String>,
    /// Capitalized-run entity proxies.
    pub entities: BTreeSet<String>,
    /// Coarse topic tags.
    pub topics: BTreeSet<Topic>,
    /// Stopword-filtered tokens of the expanded form.
    pub key_terms: BTreeSet<String>,
}

impl TextFeatures {
    /// Extracts all signals from a raw title.
    #[must_use]
    pub fn extract(raw: &str) -> Self {
        let normalized = normalize_text(raw);
        let expanded = expand_abbreviations(&normalized);

        Self {
            years: extract_years(&normalized),
            dates: extract_dates(&normalized),
            numbers: extract_numbers(&normalized),
            entities: extract_entities(raw),
            topics: extract_topics(&expanded),
            key_terms: key_terms(&expanded),
            normalized,
            expanded,
        }
    }
}
