//! Structured sports-market matching.
//!
//! Sports markets carry enough structure (team codes, league, season,
//! over/under lines) that comparing fields beats comparing prose. This scorer
//! replaces the generic signal set with structured field comparison and keeps
//! the generic text vector only as a small residual weight. It shares the
//! weighted-signals → reason contract with [`crate::score::EventScorer`], so
//! it plugs into the same resolver.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::text::{extract_years, normalize_text};

/// Market sub-type for sports contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketKind {
    /// Outright winner of the game/series.
    Winner,
    /// Point-spread market.
    Spread,
    /// Over/under total market.
    Total,
}

impl MarketKind {
    /// Returns the display name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winner => "winner",
            Self::Spread => "spread",
            Self::Total => "total",
        }
    }
}

impl std::fmt::Display for MarketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const LEAGUES: &[&str] = &["nfl", "nba", "mlb", "nhl", "epl", "ncaa", "ufc", "mls"];

// =============================================================================
// Parsed Info
// =============================================================================

/// Structured fields parsed from a sports market.
#[derive(Debug, Clone, Default)]
pub struct SportsInfo {
    /// Exchange team code, usually a 2-4 letter ticker suffix.
    pub team_code: Option<String>,
    /// Team name as it appears in the title.
    pub team_name: Option<String>,
    /// League identifier (lowercased).
    pub league: Option<String>,
    /// Market sub-type.
    pub kind: Option<MarketKind>,
    /// Season year.
    pub season: Option<u16>,
    /// Division or conference label.
    pub division: Option<String>,
    /// Over/under line for total markets.
    pub line: Option<Decimal>,
}

impl SportsInfo {
    /// Parses structured fields from a market title and optional venue ticker.
    ///
    /// Ticker suffixes follow the `LEAGUE-DATE-TEAM` convention, so the team
    /// code is the trailing all-letter segment of 2-4 characters.
    #[must_use]
    pub fn parse(title: &str, ticker: Option<&str>) -> Self {
        let normalized = normalize_text(title);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        let team_code = ticker.and_then(|t| {
            let suffix = t.rsplit('-').next()?;
            let code: String = suffix.chars().filter(|c| c.is_ascii_alphabetic()).collect();
            ((2..=4).contains(&code.len()) && code.len() == suffix.len())
                .then(|| code.to_ascii_lowercase())
        });

        let league = tokens
            .iter()
            .find(|t| LEAGUES.contains(*t))
            .map(ToString::to_string);

        let kind = if tokens.contains(&"spread") {
            Some(MarketKind::Spread)
        } else if tokens.contains(&"total")
            || tokens.contains(&"over")
            || tokens.contains(&"under")
        {
            Some(MarketKind::Total)
        } else if !tokens.is_empty() {
            Some(MarketKind::Winner)
        } else {
            None
        };

        let season = extract_years(&normalized)
            .into_iter()
            .next()
            .and_then(|y| y.parse().ok());

        // Line value follows an over/under token ("over 45 5" after
        // normalization of "over 45.5" keeps the integer part as the line).
        let line = tokens
            .windows(2)
            .find(|w| w[0] == "over" || w[0] == "under")
            .and_then(|w| Decimal::from_str(w[1]).ok());

        let division = tokens
            .windows(2)
            .find(|w| w[1] == "division" || w[1] == "conference")
            .map(|w| w[0].to_string());

        Self {
            team_code,
            team_name: None,
            league,
            kind,
            season,
            division,
            line,
        }
    }

    /// Sets the team name used for the fuzzy fallback.
    #[must_use]
    pub fn with_team_name(mut self, name: impl Into<String>) -> Self {
        self.team_name = Some(normalize_text(&name.into()));
        self
    }
}

// =============================================================================
// Scorer
// =============================================================================

/// Signal weights for the structured scorer; sum to 1.0.
#[derive(Debug, Clone)]
pub struct SportsWeights {
    pub team: f64,
    pub league: f64,
    pub kind: f64,
    pub season: f64,
    pub division: f64,
    pub line: f64,
    pub text_vector: f64,
}

impl Default for SportsWeights {
    fn default() -> Self {
        Self {
            team: 0.35,
            league: 0.15,
            kind: 0.15,
            season: 0.15,
            division: 0.05,
            line: 0.10,
            text_vector: 0.05,
        }
    }
}

/// Structured sports-market scorer.
#[derive(Debug, Clone)]
pub struct SportsScorer {
    pub weights: SportsWeights,
    /// Over/under lines within this distance compare equal.
    pub line_tolerance: Decimal,
}

impl Default for SportsScorer {
    fn default() -> Self {
        Self {
            weights: SportsWeights::default(),
            line_tolerance: Decimal::new(1, 1),
        }
    }
}

impl SportsScorer {
    /// Scores a candidate pair of parsed sports markets.
    ///
    /// Signals where either side lacks the field are skipped and the
    /// remaining weights renormalized, so sparsely-parsed markets are not
    /// penalized for missing structure. Returns the combined score and the
    /// audit string.
    #[must_use]
    pub fn score(
        &self,
        a: &SportsInfo,
        b: &SportsInfo,
        vector_similarity: Option<f64>,
    ) -> (f64, String) {
        let w = &self.weights;
        let mut weighted = 0.0;
        let mut present = 0.0;
        let mut reasons = Vec::new();

        if let Some(team) = self.team_signal(a, b, &mut reasons) {
            weighted += w.team * team;
            present += w.team;
        }

        if let (Some(la), Some(lb)) = (&a.league, &b.league) {
            let signal = if la == lb { 1.0 } else { 0.0 };
            if la == lb {
                reasons.push(format!("league: {la}"));
            }
            weighted += w.league * signal;
            present += w.league;
        }

        if let (Some(ka), Some(kb)) = (a.kind, b.kind) {
            let signal = if ka == kb { 1.0 } else { 0.0 };
            if ka == kb {
                reasons.push(format!("market type: {ka}"));
            }
            weighted += w.kind * signal;
            present += w.kind;
        }

        if let (Some(sa), Some(sb)) = (a.season, b.season) {
            let signal = if sa == sb { 1.0 } else { 0.0 };
            if sa == sb {
                reasons.push(format!("season: {sa}"));
            }
            weighted += w.season * signal;
            present += w.season;
        }

        if let (Some(da), Some(db)) = (&a.division, &b.division) {
            let signal = if da == db { 1.0 } else { 0.0 };
            if da == db {
                reasons.push(format!("division: {da}"));
            }
            weighted += w.division * signal;
            present += w.division;
        }

        if let (Some(la), Some(lb)) = (a.line, b.line) {
            let near = (la - lb).abs() <= self.line_tolerance;
            if near {
                reasons.push(format!("line: {la} ~ {lb}"));
            }
            weighted += w.line * if near { 1.0 } else { 0.0 };
            present += w.line;
        }

        if let Some(cosine) = vector_similarity {
            weighted += w.text_vector * cosine;
            present += w.text_vector;
        }

        let combined = if present > 0.0 { weighted / present } else { 0.0 };

        reasons.push(format!("Structured similarity: {:.1}%", combined * 100.0));
        (combined.clamp(0.0, 1.0), reasons.join(" | "))
    }

    /// Team signal: exact code match is the strongest evidence; the fuzzy
    /// name-substring fallback is consulted only when codes are unavailable
    /// or disagree.
    fn team_signal(&self, a: &SportsInfo, b: &SportsInfo, reasons: &mut Vec<String>) -> Option<f64> {
        if let (Some(ca), Some(cb)) = (&a.team_code, &b.team_code) {
            if ca == cb {
                reasons.push(format!("team code: {ca}"));
                return Some(1.0);
            }
        }

        if let (Some(na), Some(nb)) = (&a.team_name, &b.team_name) {
            if !na.is_empty() && !nb.is_empty() && (na.contains(nb.as_str()) || nb.contains(na.as_str())) {
                reasons.push(format!("team name: {na}"));
                return Some(0.8);
            }
            return Some(0.0);
        }

        // Codes disagreed and no names to fall back to.
        if a.team_code.is_some() && b.team_code.is_some() {
            return Some(0.0);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ==================== Parsing Tests ====================

    #[test]
    fn parse_reads_team_code_from_ticker_suffix() {
        let info = SportsInfo::parse("Cowboys beat Eagles", Some("KXNFLGAME-25SEP04DALPHI-DAL"));
        assert_eq!(info.team_code.as_deref(), Some("dal"));
    }

    #[test]
    fn parse_rejects_numeric_ticker_suffix() {
        let info = SportsInfo::parse("Total above 45", Some("KXNFL-25SEP04-B45"));
        assert!(info.team_code.is_none());
    }

    #[test]
    fn parse_extracts_league_kind_and_season() {
        let info = SportsInfo::parse("NFL spread market for 2025 season", None);
        assert_eq!(info.league.as_deref(), Some("nfl"));
        assert_eq!(info.kind, Some(MarketKind::Spread));
        assert_eq!(info.season, Some(2025));
    }

    #[test]
    fn parse_reads_over_under_line() {
        let info = SportsInfo::parse("Points over 45 in the game", None);
        assert_eq!(info.kind, Some(MarketKind::Total));
        assert_eq!(info.line, Some(dec!(45)));
    }

    #[test]
    fn parse_defaults_to_winner_kind() {
        let info = SportsInfo::parse("Chiefs win the game", None);
        assert_eq!(info.kind, Some(MarketKind::Winner));
    }

    // ==================== Scoring Tests ====================

    #[test]
    fn exact_team_code_dominates() {
        let scorer = SportsScorer::default();
        let a = SportsInfo {
            team_code: Some("dal".to_string()),
            league: Some("nfl".to_string()),
            kind: Some(MarketKind::Winner),
            season: Some(2025),
            ..SportsInfo::default()
        };
        let b = a.clone();

        let (score, reason) = scorer.score(&a, &b, None);
        assert!((score - 1.0).abs() < 1e-9);
        assert!(reason.contains("team code: dal"));
    }

    #[test]
    fn mismatched_codes_fall_back_to_fuzzy_names() {
        let scorer = SportsScorer::default();
        let a = SportsInfo {
            team_code: Some("dal".to_string()),
            ..SportsInfo::default()
        }
        .with_team_name("Dallas Cowboys");
        let b = SportsInfo {
            team_code: Some("cow".to_string()),
            ..SportsInfo::default()
        }
        .with_team_name("Cowboys");

        let (score, reason) = scorer.score(&a, &b, None);
        // Fuzzy name hit scores 0.8 of the team signal
        assert!((score - 0.8).abs() < 1e-9);
        assert!(reason.contains("team name"));
    }

    #[test]
    fn mismatched_codes_without_names_score_zero() {
        let scorer = SportsScorer::default();
        let a = SportsInfo {
            team_code: Some("dal".to_string()),
            ..SportsInfo::default()
        };
        let b = SportsInfo {
            team_code: Some("phi".to_string()),
            ..SportsInfo::default()
        };

        let (score, _) = scorer.score(&a, &b, None);
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn line_tolerance_accepts_nearby_values() {
        let scorer = SportsScorer::default();
        let a = SportsInfo {
            line: Some(dec!(45.5)),
            ..SportsInfo::default()
        };
        let near = SportsInfo {
            line: Some(dec!(45.4)),
            ..SportsInfo::default()
        };
        let far = SportsInfo {
            line: Some(dec!(44.0)),
            ..SportsInfo::default()
        };

        let (near_score, _) = scorer.score(&a, &near, None);
        let (far_score, _) = scorer.score(&a, &far, None);
        assert!((near_score - 1.0).abs() < 1e-9);
        assert!(far_score.abs() < 1e-9);
    }

    #[test]
    fn missing_fields_are_skipped_not_penalized() {
        let scorer = SportsScorer::default();
        let a = SportsInfo {
            league: Some("nba".to_string()),
            season: Some(2026),
            ..SportsInfo::default()
        };
        let b = a.clone();

        // Only league and season present on both sides; both agree
        let (score, _) = scorer.score(&a, &b, None);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn residual_text_vector_contributes_little() {
        let scorer = SportsScorer::default();
        let a = SportsInfo {
            team_code: Some("dal".to_string()),
            league: Some("nfl".to_string()),
            ..SportsInfo::default()
        };
        let b = SportsInfo {
            team_code: Some("dal".to_string()),
            league: Some("nfl".to_string()),
            ..SportsInfo::default()
        };

        let (without_vector, _) = scorer.score(&a, &b, None);
        let (with_weak_vector, _) = scorer.score(&a, &b, Some(0.0));
        // A zero cosine drags the combined score down by at most its residual share
        assert!(without_vector - with_weak_vector < 0.1 + 1e-9);
        assert!(with_weak_vector > 0.85);
    }
}
