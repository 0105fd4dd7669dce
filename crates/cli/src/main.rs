use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::FilterArgs;

#[derive(Parser)]
#[command(name = "predarb")]
#[command(about = "Cross-exchange prediction-market matching and arbitrage scanner", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml", global = true)]
    config: String,

    /// Run against the in-memory store instead of Postgres
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct SnapshotArgs {
    /// Kalshi snapshot file (JSON array of raw events)
    #[arg(long)]
    kalshi: String,

    /// Polymarket snapshot file (JSON array of raw events)
    #[arg(long)]
    polymarket: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest exchange snapshots into the catalog
    Sync {
        #[command(flatten)]
        snapshots: SnapshotArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Match events across exchanges and upsert the results
    MatchEvents {
        /// Override the similarity threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Match individual markets across exchanges and upsert the results
    MatchMarkets {
        /// Override the similarity threshold
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Detect arbitrage opportunities over the stored catalog
    Detect,
    /// Sync, match, and detect in one pass
    Scan {
        #[command(flatten)]
        snapshots: SnapshotArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = predarb_core::AppConfig::load(&cli.config)?;
    let stores = commands::build_stores(&config, cli.memory).await?;

    match cli.command {
        Commands::Sync { snapshots, filters } => {
            commands::sync(&config, &stores, &snapshots.kalshi, &snapshots.polymarket, &filters)
                .await
        }
        Commands::MatchEvents { threshold } => {
            commands::match_events(&config, &stores, threshold).await
        }
        Commands::MatchMarkets { threshold } => {
            commands::match_markets(&config, &stores, threshold).await
        }
        Commands::Detect => commands::detect(&config, &stores).await,
        Commands::Scan { snapshots, filters } => {
            commands::sync(&config, &stores, &snapshots.kalshi, &snapshots.polymarket, &filters)
                .await?;
            commands::match_events(&config, &stores, None).await?;
            commands::match_markets(&config, &stores, None).await?;
            commands::detect(&config, &stores).await
        }
    }
}
