//! Match repository.
//!
//! Matches upsert by their (kalshi, polymarket) identity pair. The
//! verification columns are written by the admin surface only; the upsert
//! leaves them alone so a re-match never un-verifies a pair.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use predarb_core::{EventMatch, MarketMatch, MatchStore};

/// Repository for cross-exchange match records.
#[derive(Debug, Clone)]
pub struct MatchRepository {
    pool: PgPool,
}

impl MatchRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Marks a market match as human-verified.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn verify_market_match(
        &self,
        kalshi_external_id: &str,
        polymarket_external_id: &str,
    ) -> Result<()> {
        sqlx::query(
            r"
            UPDATE market_matches
            SET is_verified = TRUE, verified_at = NOW(), updated_at = NOW()
            WHERE kalshi_external_id = $1 AND polymarket_external_id = $2
            ",
        )
        .bind(kalshi_external_id)
        .bind(polymarket_external_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    kalshi_external_id: String,
    polymarket_external_id: String,
    similarity_score: f64,
    match_reason: String,
    is_verified: bool,
    verified_at: Option<DateTime<Utc>>,
}

impl From<MatchRow> for MarketMatch {
    fn from(row: MatchRow) -> Self {
        Self {
            kalshi_external_id: row.kalshi_external_id,
            polymarket_external_id: row.polymarket_external_id,
            similarity_score: row.similarity_score,
            match_reason: row.match_reason,
            is_verified: row.is_verified,
            verified_at: row.verified_at,
        }
    }
}

#[async_trait]
impl MatchStore for MatchRepository {
    async fn upsert_market_match(&self, m: &MarketMatch) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO market_matches
                (kalshi_external_id, polymarket_external_id, similarity_score, match_reason)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (kalshi_external_id, polymarket_external_id) DO UPDATE SET
                similarity_score = EXCLUDED.similarity_score,
                match_reason = EXCLUDED.match_reason,
                updated_at = NOW()
            ",
        )
        .bind(&m.kalshi_external_id)
        .bind(&m.polymarket_external_id)
        .bind(m.similarity_score)
        .bind(&m.match_reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn upsert_event_match(&self, m: &EventMatch) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO event_matches
                (kalshi_external_id, polymarket_external_id, similarity_score, match_reason)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (kalshi_external_id, polymarket_external_id) DO UPDATE SET
                similarity_score = EXCLUDED.similarity_score,
                match_reason = EXCLUDED.match_reason,
                updated_at = NOW()
            ",
        )
        .bind(&m.kalshi_external_id)
        .bind(&m.polymarket_external_id)
        .bind(m.similarity_score)
        .bind(&m.match_reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn active_market_matches(&self) -> Result<Vec<MarketMatch>> {
        let rows = sqlx::query_as::<_, MatchRow>(
            r"
            SELECT mm.kalshi_external_id, mm.polymarket_external_id,
                   mm.similarity_score, mm.match_reason, mm.is_verified, mm.verified_at
            FROM market_matches mm
            JOIN markets km
              ON km.exchange = 'kalshi' AND km.external_id = mm.kalshi_external_id
            JOIN markets pm
              ON pm.exchange = 'polymarket' AND pm.external_id = mm.polymarket_external_id
            WHERE km.is_active = TRUE AND pm.is_active = TRUE
            ORDER BY mm.similarity_score DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MarketMatch::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_row_converts_to_market_match() {
        let row = MatchRow {
            kalshi_external_id: "KX".to_string(),
            polymarket_external_id: "0x".to_string(),
            similarity_score: 0.77,
            match_reason: "Shared years: 2025".to_string(),
            is_verified: true,
            verified_at: Some(Utc::now()),
        };

        let m = MarketMatch::from(row);
        assert_eq!(m.identity(), ("KX", "0x"));
        assert!(m.is_verified);
    }
}
