//! End-to-end pipeline test: snapshot files -> sync -> match -> detect,
//! against the in-memory store.

use std::sync::Arc;

use predarb_arbitrage::{ArbitrageScanner, DetectorConfig};
use predarb_core::{
    CatalogStore, Exchange, MarketMatch, MatchStore, OpportunityStore, SyncConfig,
};
use predarb_data::MemoryStore;
use predarb_ingest::{CatalogFilters, KalshiSnapshot, PolymarketSnapshot, SyncService};
use predarb_matching::EventMatcher;

fn write_snapshot(name: &str, payload: &serde_json::Value) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("predarb-{}-{name}", std::process::id()));
    std::fs::write(&path, payload.to_string()).expect("writing snapshot fixture");
    path
}

fn kalshi_snapshot() -> serde_json::Value {
    serde_json::json!([
        {
            "event_ticker": "KXFED-25",
            "title": "Fed raises rates in 2025",
            "category": "Economics",
            "markets": [
                {
                    "ticker": "KXFED-25DEC",
                    "title": "Fed raises rates in 2025",
                    // Cents on the wire; 40 + 55 = 0.95 after conversion
                    "yes_ask": 40,
                    "no_ask": 55,
                    "volume": 1200,
                    "status": "active",
                    "close_time": "2025-12-31T15:00:00Z"
                }
            ]
        }
    ])
}

fn polymarket_snapshot() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "9001",
            "slug": "fed-rate-hike-2025",
            "title": "Federal Reserve rate hike 2025",
            "markets": [
                {
                    "conditionId": "0xfed2025",
                    "question": "Federal Reserve rate hike 2025",
                    "outcomes": "[\"Yes\", \"No\"]",
                    "outcomePrices": "[\"0.52\", \"0.49\"]",
                    "volumeNum": "8000",
                    "active": true,
                    "endDate": "2025-12-31T23:59:59Z"
                }
            ]
        }
    ])
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_to_opportunities_pipeline() {
    let store = Arc::new(MemoryStore::new());

    // Sync both snapshots
    let kalshi_path = write_snapshot("kalshi.json", &kalshi_snapshot());
    let polymarket_path = write_snapshot("polymarket.json", &polymarket_snapshot());
    let sync = SyncService::new(
        Arc::new(KalshiSnapshot::new(&kalshi_path)),
        Arc::new(PolymarketSnapshot::new(&polymarket_path)),
        Arc::clone(&store) as Arc<dyn CatalogStore>,
        SyncConfig {
            fetch_timeout_secs: 5,
        },
    );
    let report = sync.sync_all(&CatalogFilters::default()).await;
    assert!(report.is_complete());

    // Event matching finds the Fed pair
    let kalshi_events = store.active_events(Exchange::Kalshi).await.unwrap();
    let polymarket_events = store.active_events(Exchange::Polymarket).await.unwrap();
    let matcher = EventMatcher::new(0.5, 4);
    let candidates = matcher.find_matches(&kalshi_events, &polymarket_events).await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].kalshi_external_id, "KXFED-25");

    // Link the market pair and scan
    store
        .upsert_market_match(&MarketMatch::new(
            "KXFED-25DEC",
            "0xfed2025",
            candidates[0].score,
            &candidates[0].reason,
        ))
        .await
        .unwrap();

    let scanner = ArbitrageScanner::new(
        DetectorConfig::default(),
        Arc::clone(&store) as Arc<dyn CatalogStore>,
        Arc::clone(&store) as Arc<dyn MatchStore>,
        Arc::clone(&store) as Arc<dyn OpportunityStore>,
    );
    let scan = scanner.run().await.unwrap();

    // KXFED-25DEC single: 0.40 + 0.55 = 0.95
    // Cross: kalshi Yes 0.40 + poly No 0.49 = 0.89
    assert_eq!(scan.kalshi_single, 1);
    assert_eq!(scan.cross_exchange, 1);

    let active = store.active_opportunities().await.unwrap();
    assert_eq!(active.len() as u64, scan.written);
    // Ranked by profit: the 0.89 hedge beats the 0.95 single
    assert!(active[0].profit_percent > active[1].profit_percent);

    let _ = std::fs::remove_file(kalshi_path);
    let _ = std::fs::remove_file(polymarket_path);
}
