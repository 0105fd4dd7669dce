//! In-memory store.
//!
//! Implements every store trait over process-local maps. Used by tests and
//! by snapshot runs that do not want a database; semantics mirror the
//! Postgres repositories, including upsert identity keys and the
//! deactivate-then-insert opportunity snapshot.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use predarb_core::{
    ArbitrageOpportunity, CatalogStore, Event, EventMatch, Exchange, Market, MarketMatch,
    MatchStore, OpportunityStore,
};

/// Process-local implementation of all store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    markets: RwLock<HashMap<(Exchange, String), Market>>,
    events: RwLock<HashMap<(Exchange, String), Event>>,
    market_matches: RwLock<HashMap<(String, String), MarketMatch>>,
    event_matches: RwLock<HashMap<(String, String), EventMatch>>,
    opportunities: RwLock<Vec<ArbitrageOpportunity>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total market-match records (active or not), for assertions.
    #[must_use]
    pub fn market_match_count(&self) -> usize {
        self.market_matches.read().len()
    }

    /// Total event-match records, for assertions.
    #[must_use]
    pub fn event_match_count(&self) -> usize {
        self.event_matches.read().len()
    }

    /// Total opportunity rows including superseded history, for assertions.
    #[must_use]
    pub fn total_opportunities(&self) -> usize {
        self.opportunities.read().len()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn upsert_markets(&self, markets: &[Market]) -> Result<u64> {
        let mut guard = self.markets.write();
        for market in markets {
            guard.insert(
                (market.exchange, market.external_id.clone()),
                market.clone(),
            );
        }
        Ok(markets.len() as u64)
    }

    async fn upsert_events(&self, events: &[Event]) -> Result<u64> {
        let mut guard = self.events.write();
        for event in events {
            guard.insert((event.exchange, event.external_id.clone()), event.clone());
        }
        Ok(events.len() as u64)
    }

    async fn active_markets(&self, exchange: Exchange) -> Result<Vec<Market>> {
        let mut markets: Vec<Market> = self
            .markets
            .read()
            .values()
            .filter(|m| m.exchange == exchange && m.is_active)
            .cloned()
            .collect();
        markets.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        Ok(markets)
    }

    async fn active_events(&self, exchange: Exchange) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .read()
            .values()
            .filter(|e| e.exchange == exchange && e.is_active)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.external_id.cmp(&b.external_id));
        Ok(events)
    }
}

#[async_trait]
impl MatchStore for MemoryStore {
    async fn upsert_market_match(&self, m: &MarketMatch) -> Result<()> {
        let key = (
            m.kalshi_external_id.clone(),
            m.polymarket_external_id.clone(),
        );
        let mut guard = self.market_matches.write();
        match guard.get_mut(&key) {
            Some(existing) => {
                // Same update surface as the SQL upsert: score and reason
                // only, verification stays human-owned.
                existing.similarity_score = m.similarity_score;
                existing.match_reason = m.match_reason.clone();
            }
            None => {
                guard.insert(key, m.clone());
            }
        }
        Ok(())
    }

    async fn upsert_event_match(&self, m: &EventMatch) -> Result<()> {
        let key = (
            m.kalshi_external_id.clone(),
            m.polymarket_external_id.clone(),
        );
        let mut guard = self.event_matches.write();
        match guard.get_mut(&key) {
            Some(existing) => {
                existing.similarity_score = m.similarity_score;
                existing.match_reason = m.match_reason.clone();
            }
            None => {
                guard.insert(key, m.clone());
            }
        }
        Ok(())
    }

    async fn active_market_matches(&self) -> Result<Vec<MarketMatch>> {
        let markets = self.markets.read();
        let is_active = |exchange: Exchange, id: &str| {
            markets
                .get(&(exchange, id.to_string()))
                .is_some_and(|m| m.is_active)
        };

        let mut matches: Vec<MarketMatch> = self
            .market_matches
            .read()
            .values()
            .filter(|m| {
                is_active(Exchange::Kalshi, &m.kalshi_external_id)
                    && is_active(Exchange::Polymarket, &m.polymarket_external_id)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(matches)
    }
}

#[async_trait]
impl OpportunityStore for MemoryStore {
    async fn replace_active(&self, opportunities: &[ArbitrageOpportunity]) -> Result<u64> {
        let mut guard = self.opportunities.write();
        for existing in guard.iter_mut() {
            existing.is_active = false;
        }
        for opportunity in opportunities {
            let mut row = opportunity.clone();
            row.is_active = true;
            guard.push(row);
        }
        Ok(opportunities.len() as u64)
    }

    async fn active_opportunities(&self) -> Result<Vec<ArbitrageOpportunity>> {
        let mut active: Vec<ArbitrageOpportunity> = self
            .opportunities
            .read()
            .iter()
            .filter(|o| o.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| b.profit_percent.cmp(&a.profit_percent));
        Ok(active)
    }
}
