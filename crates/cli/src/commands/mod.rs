//! CLI command implementations.

mod detect;
mod matching;
mod sync;

pub use detect::detect;
pub use matching::{match_events, match_markets};
pub use sync::{sync, FilterArgs};

use std::sync::Arc;

use anyhow::Result;

use predarb_core::{AppConfig, CatalogStore, MatchStore, OpportunityStore};
use predarb_data::{CatalogRepository, Database, MatchRepository, MemoryStore, OpportunityRepository};

/// Trait-object handles to whichever backend is configured.
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub matches: Arc<dyn MatchStore>,
    pub opportunities: Arc<dyn OpportunityStore>,
}

/// Builds the storage backend: Postgres by default, in-memory on request.
pub async fn build_stores(config: &AppConfig, memory: bool) -> Result<Stores> {
    if memory {
        let store = Arc::new(MemoryStore::new());
        return Ok(Stores {
            catalog: Arc::clone(&store) as Arc<dyn CatalogStore>,
            matches: Arc::clone(&store) as Arc<dyn MatchStore>,
            opportunities: store as Arc<dyn OpportunityStore>,
        });
    }

    let database =
        Database::connect(&config.database.url, config.database.max_connections).await?;
    let pool = database.pool().clone();

    Ok(Stores {
        catalog: Arc::new(CatalogRepository::new(pool.clone())),
        matches: Arc::new(MatchRepository::new(pool.clone())),
        opportunities: Arc::new(OpportunityRepository::new(pool)),
    })
}
