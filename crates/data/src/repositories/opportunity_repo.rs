//! Opportunity repository.
//!
//! Opportunities are a recomputed-from-scratch snapshot: the replace runs
//! deactivate-then-insert inside a single transaction so no reader observes
//! an empty active set mid-run. Prior rows stay in the table as history.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use predarb_core::{ArbitrageKind, ArbitrageOpportunity, OpportunityStore, Position};

/// Repository for detected arbitrage opportunities.
#[derive(Debug, Clone)]
pub struct OpportunityRepository {
    pool: PgPool,
}

impl OpportunityRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deletes historical (inactive) rows older than the given cutoff.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn prune_history(&self, before: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM arbitrage_opportunities
            WHERE is_active = FALSE AND detected_at < $1
            ",
        )
        .bind(before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OpportunityRow {
    kind: String,
    positions: serde_json::Value,
    total_cost: Decimal,
    guaranteed_return: Decimal,
    profit: Decimal,
    profit_percent: Decimal,
    expected_value: Decimal,
    is_active: bool,
    detected_at: DateTime<Utc>,
}

impl TryFrom<OpportunityRow> for ArbitrageOpportunity {
    type Error = anyhow::Error;

    fn try_from(row: OpportunityRow) -> Result<Self> {
        let kind: ArbitrageKind = row.kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        let positions: Vec<Position> = serde_json::from_value(row.positions)?;

        Ok(Self {
            kind,
            positions,
            total_cost: row.total_cost,
            guaranteed_return: row.guaranteed_return,
            profit: row.profit,
            profit_percent: row.profit_percent,
            expected_value: row.expected_value,
            is_active: row.is_active,
            detected_at: row.detected_at,
        })
    }
}

#[async_trait]
impl OpportunityStore for OpportunityRepository {
    async fn replace_active(&self, opportunities: &[ArbitrageOpportunity]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE arbitrage_opportunities
            SET is_active = FALSE
            WHERE is_active = TRUE
            ",
        )
        .execute(&mut *tx)
        .await?;

        let mut inserted = 0u64;
        for opportunity in opportunities {
            let result = sqlx::query(
                r"
                INSERT INTO arbitrage_opportunities
                    (kind, positions, total_cost, guaranteed_return, profit,
                     profit_percent, expected_value, is_active, detected_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8)
                ",
            )
            .bind(opportunity.kind.as_str())
            .bind(serde_json::to_value(&opportunity.positions)?)
            .bind(opportunity.total_cost)
            .bind(opportunity.guaranteed_return)
            .bind(opportunity.profit)
            .bind(opportunity.profit_percent)
            .bind(opportunity.expected_value)
            .bind(opportunity.detected_at)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;

        debug!(inserted, "opportunity snapshot replaced");
        Ok(inserted)
    }

    async fn active_opportunities(&self) -> Result<Vec<ArbitrageOpportunity>> {
        let rows = sqlx::query_as::<_, OpportunityRow>(
            r"
            SELECT kind, positions, total_cost, guaranteed_return, profit,
                   profit_percent, expected_value, is_active, detected_at
            FROM arbitrage_opportunities
            WHERE is_active = TRUE
            ORDER BY profit_percent DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ArbitrageOpportunity::try_from).collect()
    }
}
