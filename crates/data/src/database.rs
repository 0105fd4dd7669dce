//! Database connection and schema bootstrap.

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Statements executed at startup; all idempotent.
const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS events (
        id              SERIAL PRIMARY KEY,
        exchange        TEXT NOT NULL,
        external_id     TEXT NOT NULL,
        title           TEXT NOT NULL,
        description     TEXT NOT NULL DEFAULT '',
        category        TEXT NOT NULL DEFAULT '',
        url             TEXT NOT NULL DEFAULT '',
        volume          DECIMAL NOT NULL DEFAULT 0,
        volume_24h      DECIMAL NOT NULL DEFAULT 0,
        liquidity       DECIMAL NOT NULL DEFAULT 0,
        open_interest   DECIMAL NOT NULL DEFAULT 0,
        is_active       BOOLEAN NOT NULL DEFAULT TRUE,
        mutually_exclusive BOOLEAN NOT NULL DEFAULT FALSE,
        end_date        TIMESTAMPTZ,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (exchange, external_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS markets (
        id              SERIAL PRIMARY KEY,
        exchange        TEXT NOT NULL,
        external_id     TEXT NOT NULL,
        event_external_id TEXT,
        title           TEXT NOT NULL,
        description     TEXT NOT NULL DEFAULT '',
        outcomes        JSONB NOT NULL DEFAULT '[]',
        url             TEXT NOT NULL DEFAULT '',
        volume          DECIMAL NOT NULL DEFAULT 0,
        volume_24h      DECIMAL NOT NULL DEFAULT 0,
        liquidity       DECIMAL NOT NULL DEFAULT 0,
        open_interest   DECIMAL NOT NULL DEFAULT 0,
        is_active       BOOLEAN NOT NULL DEFAULT TRUE,
        close_time      TIMESTAMPTZ,
        created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (exchange, external_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS market_matches (
        id                      SERIAL PRIMARY KEY,
        kalshi_external_id      TEXT NOT NULL,
        polymarket_external_id  TEXT NOT NULL,
        similarity_score        DOUBLE PRECISION NOT NULL DEFAULT 0,
        match_reason            TEXT NOT NULL DEFAULT '',
        is_verified             BOOLEAN NOT NULL DEFAULT FALSE,
        verified_at             TIMESTAMPTZ,
        created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (kalshi_external_id, polymarket_external_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS event_matches (
        id                      SERIAL PRIMARY KEY,
        kalshi_external_id      TEXT NOT NULL,
        polymarket_external_id  TEXT NOT NULL,
        similarity_score        DOUBLE PRECISION NOT NULL DEFAULT 0,
        match_reason            TEXT NOT NULL DEFAULT '',
        is_verified             BOOLEAN NOT NULL DEFAULT FALSE,
        verified_at             TIMESTAMPTZ,
        created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        UNIQUE (kalshi_external_id, polymarket_external_id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS arbitrage_opportunities (
        id                SERIAL PRIMARY KEY,
        kind              TEXT NOT NULL,
        positions         JSONB NOT NULL DEFAULT '[]',
        total_cost        DECIMAL NOT NULL,
        guaranteed_return DECIMAL NOT NULL,
        profit            DECIMAL NOT NULL,
        profit_percent    DECIMAL NOT NULL,
        expected_value    DECIMAL NOT NULL,
        is_active         BOOLEAN NOT NULL DEFAULT TRUE,
        detected_at       TIMESTAMPTZ NOT NULL,
        created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_markets_active ON markets (exchange, is_active)",
    "CREATE INDEX IF NOT EXISTS idx_events_active ON events (exchange, is_active)",
    "CREATE INDEX IF NOT EXISTS idx_opportunities_active ON arbitrage_opportunities (is_active)",
];

/// Postgres connection handle.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connects to Postgres and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a schema
    /// statement fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!(max_connections, "database connected, schema ready");
        Ok(Self { pool })
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
