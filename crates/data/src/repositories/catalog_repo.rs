//! Catalog repository: normalized markets and events.
//!
//! Batch upserts go through `UNNEST` so a whole sync lands in one statement
//! per table, keyed by `(exchange, external_id)`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use predarb_core::{CatalogStore, Event, Exchange, Market, Outcome};

/// Repository for market/event catalog operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MarketRow {
    exchange: String,
    external_id: String,
    event_external_id: Option<String>,
    title: String,
    description: String,
    outcomes: serde_json::Value,
    url: String,
    volume: Decimal,
    volume_24h: Decimal,
    liquidity: Decimal,
    open_interest: Decimal,
    is_active: bool,
    close_time: Option<DateTime<Utc>>,
}

impl TryFrom<MarketRow> for Market {
    type Error = anyhow::Error;

    fn try_from(row: MarketRow) -> Result<Self> {
        let exchange: Exchange = row
            .exchange
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let outcomes: Vec<Outcome> =
            serde_json::from_value(row.outcomes).context("malformed outcomes column")?;

        Ok(Self {
            exchange,
            external_id: row.external_id,
            event_external_id: row.event_external_id,
            title: row.title,
            description: row.description,
            outcomes,
            url: row.url,
            volume: row.volume,
            volume_24h: row.volume_24h,
            liquidity: row.liquidity,
            open_interest: row.open_interest,
            is_active: row.is_active,
            close_time: row.close_time,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    exchange: String,
    external_id: String,
    title: String,
    description: String,
    category: String,
    url: String,
    volume: Decimal,
    volume_24h: Decimal,
    liquidity: Decimal,
    open_interest: Decimal,
    is_active: bool,
    mutually_exclusive: bool,
    end_date: Option<DateTime<Utc>>,
}

impl TryFrom<EventRow> for Event {
    type Error = anyhow::Error;

    fn try_from(row: EventRow) -> Result<Self> {
        let exchange: Exchange = row
            .exchange
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        Ok(Self {
            exchange,
            external_id: row.external_id,
            title: row.title,
            description: row.description,
            category: row.category,
            url: row.url,
            volume: row.volume,
            volume_24h: row.volume_24h,
            liquidity: row.liquidity,
            open_interest: row.open_interest,
            is_active: row.is_active,
            mutually_exclusive: row.mutually_exclusive,
            end_date: row.end_date,
        })
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn upsert_markets(&self, markets: &[Market]) -> Result<u64> {
        if markets.is_empty() {
            return Ok(0);
        }

        let mut written = 0u64;
        for chunk in markets.chunks(500) {
            let exchanges: Vec<&str> = chunk.iter().map(|m| m.exchange.as_str()).collect();
            let external_ids: Vec<&str> = chunk.iter().map(|m| m.external_id.as_str()).collect();
            let event_ids: Vec<Option<&str>> = chunk
                .iter()
                .map(|m| m.event_external_id.as_deref())
                .collect();
            let titles: Vec<&str> = chunk.iter().map(|m| m.title.as_str()).collect();
            let descriptions: Vec<&str> = chunk.iter().map(|m| m.description.as_str()).collect();
            let outcomes: Vec<serde_json::Value> = chunk
                .iter()
                .map(|m| serde_json::to_value(&m.outcomes))
                .collect::<Result<_, _>>()?;
            let urls: Vec<&str> = chunk.iter().map(|m| m.url.as_str()).collect();
            let volumes: Vec<Decimal> = chunk.iter().map(|m| m.volume).collect();
            let volumes_24h: Vec<Decimal> = chunk.iter().map(|m| m.volume_24h).collect();
            let liquidity: Vec<Decimal> = chunk.iter().map(|m| m.liquidity).collect();
            let open_interest: Vec<Decimal> = chunk.iter().map(|m| m.open_interest).collect();
            let is_active: Vec<bool> = chunk.iter().map(|m| m.is_active).collect();
            let close_times: Vec<Option<DateTime<Utc>>> =
                chunk.iter().map(|m| m.close_time).collect();

            let result = sqlx::query(
                r"
                INSERT INTO markets
                    (exchange, external_id, event_external_id, title, description,
                     outcomes, url, volume, volume_24h, liquidity, open_interest,
                     is_active, close_time)
                SELECT * FROM UNNEST(
                    $1::text[], $2::text[], $3::text[], $4::text[], $5::text[],
                    $6::jsonb[], $7::text[], $8::decimal[], $9::decimal[],
                    $10::decimal[], $11::decimal[], $12::boolean[], $13::timestamptz[]
                )
                ON CONFLICT (exchange, external_id) DO UPDATE SET
                    event_external_id = EXCLUDED.event_external_id,
                    title = EXCLUDED.title,
                    description = EXCLUDED.description,
                    outcomes = EXCLUDED.outcomes,
                    url = EXCLUDED.url,
                    volume = EXCLUDED.volume,
                    volume_24h = EXCLUDED.volume_24h,
                    liquidity = EXCLUDED.liquidity,
                    open_interest = EXCLUDED.open_interest,
                    is_active = EXCLUDED.is_active,
                    close_time = EXCLUDED.close_time,
                    updated_at = NOW()
                ",
            )
            .bind(&exchanges)
            .bind(&external_ids)
            .bind(&event_ids)
            .bind(&titles)
            .bind(&descriptions)
            .bind(&outcomes)
            .bind(&urls)
            .bind(&volumes)
            .bind(&volumes_24h)
            .bind(&liquidity)
            .bind(&open_interest)
            .bind(&is_active)
            .bind(&close_times)
            .execute(&self.pool)
            .await?;

            written += result.rows_affected();
        }

        Ok(written)
    }

    async fn upsert_events(&self, events: &[Event]) -> Result<u64> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut written = 0u64;
        for chunk in events.chunks(500) {
            let exchanges: Vec<&str> = chunk.iter().map(|e| e.exchange.as_str()).collect();
            let external_ids: Vec<&str> = chunk.iter().map(|e| e.external_id.as_str()).collect();
            let titles: Vec<&str> = chunk.iter().map(|e| e.title.as_str()).collect();
            let descriptions: Vec<&str> = chunk.iter().map(|e| e.description.as_str()).collect();
            let categories: Vec<&str> = chunk.iter().map(|e| e.category.as_str()).collect();
            let urls: Vec<&str> = chunk.iter().map(|e| e.url.as_str()).collect();
            let volumes: Vec<Decimal> = chunk.iter().map(|e| e.volume).collect();
            let volumes_24h: Vec<Decimal> = chunk.iter().map(|e| e.volume_24h).collect();
            let liquidity: Vec<Decimal> = chunk.iter().map(|e| e.liquidity).collect();
            let open_interest: Vec<Decimal> = chunk.iter().map(|e| e.open_interest).collect();
            let is_active: Vec<bool> = chunk.iter().map(|e| e.is_active).collect();
            let mutually_exclusive: Vec<bool> =
                chunk.iter().map(|e| e.mutually_exclusive).collect();
            let end_dates: Vec<Option<DateTime<Utc>>> = chunk.iter().map(|e| e.end_date).collect();

            let result = sqlx::query(
                r"
                INSERT INTO events
                    (exchange, external_id, title, description, category, url,
                     volume, volume_24h, liquidity, open_interest, is_active,
                     mutually_exclusive, end_date)
                SELECT * FROM UNNEST(
                    $1::text[], $2::text[], $3::text[], $4::text[], $5::text[],
                    $6::text[], $7::decimal[], $8::decimal[], $9::decimal[],
                    $10::decimal[], $11::boolean[], $12::boolean[], $13::timestamptz[]
                )
                ON CONFLICT (exchange, external_id) DO UPDATE SET
                    title = EXCLUDED.title,
                    description = EXCLUDED.description,
                    category = EXCLUDED.category,
                    url = EXCLUDED.url,
                    volume = EXCLUDED.volume,
                    volume_24h = EXCLUDED.volume_24h,
                    liquidity = EXCLUDED.liquidity,
                    open_interest = EXCLUDED.open_interest,
                    is_active = EXCLUDED.is_active,
                    mutually_exclusive = EXCLUDED.mutually_exclusive,
                    end_date = EXCLUDED.end_date,
                    updated_at = NOW()
                ",
            )
            .bind(&exchanges)
            .bind(&external_ids)
            .bind(&titles)
            .bind(&descriptions)
            .bind(&categories)
            .bind(&urls)
            .bind(&volumes)
            .bind(&volumes_24h)
            .bind(&liquidity)
            .bind(&open_interest)
            .bind(&is_active)
            .bind(&mutually_exclusive)
            .bind(&end_dates)
            .execute(&self.pool)
            .await?;

            written += result.rows_affected();
        }

        Ok(written)
    }

    async fn active_markets(&self, exchange: Exchange) -> Result<Vec<Market>> {
        let rows = sqlx::query_as::<_, MarketRow>(
            r"
            SELECT exchange, external_id, event_external_id, title, description,
                   outcomes, url, volume, volume_24h, liquidity, open_interest,
                   is_active, close_time
            FROM markets
            WHERE exchange = $1 AND is_active = TRUE
            ORDER BY external_id
            ",
        )
        .bind(exchange.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Market::try_from).collect()
    }

    async fn active_events(&self, exchange: Exchange) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"
            SELECT exchange, external_id, title, description, category, url,
                   volume, volume_24h, liquidity, open_interest, is_active,
                   mutually_exclusive, end_date
            FROM events
            WHERE exchange = $1 AND is_active = TRUE
            ORDER BY external_id
            ",
        )
        .bind(exchange.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn market_row_converts_to_canonical_market() {
        let row = MarketRow {
            exchange: "kalshi".to_string(),
            external_id: "KXTEST".to_string(),
            event_external_id: Some("KXEVENT".to_string()),
            title: "Test".to_string(),
            description: String::new(),
            outcomes: serde_json::json!([
                {"name": "Yes", "price": "0.40"},
                {"name": "No", "price": "0.55"}
            ]),
            url: String::new(),
            volume: dec!(100),
            volume_24h: dec!(10),
            liquidity: dec!(50),
            open_interest: dec!(5),
            is_active: true,
            close_time: None,
        };

        let market = Market::try_from(row).unwrap();
        assert_eq!(market.exchange, Exchange::Kalshi);
        assert_eq!(market.binary_prices(), (Some(dec!(0.40)), Some(dec!(0.55))));
    }

    #[test]
    fn unknown_exchange_in_row_is_an_error() {
        let row = EventRow {
            exchange: "nasdaq".to_string(),
            external_id: "X".to_string(),
            title: "T".to_string(),
            description: String::new(),
            category: String::new(),
            url: String::new(),
            volume: Decimal::ZERO,
            volume_24h: Decimal::ZERO,
            liquidity: Decimal::ZERO,
            open_interest: Decimal::ZERO,
            is_active: true,
            mutually_exclusive: false,
            end_date: None,
        };

        assert!(Event::try_from(row).is_err());
    }
}
