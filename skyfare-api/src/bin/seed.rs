use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use skyfare_store::{app_config::{Config, DatabaseBackend}, seed, Repositories};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads a sample flight schedule into the configured store.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of days to generate, starting today (UTC).
    #[arg(short, long, default_value_t = 7)]
    days: u32,

    /// Delete existing flights first.
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,skyfare_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load().context("Failed to load config")?;
    if config.database.backend == DatabaseBackend::Memory {
        tracing::warn!("Seeding the in-memory backend; the data disappears when this process exits");
    }

    let repos = Repositories::connect(&config.database)
        .await
        .context("Failed to connect to the data store")?;

    if args.reset {
        let removed = repos.flights.delete_all().await?;
        tracing::info!("Deleted {} existing flights", removed);
    }

    let flights = seed::generate(&mut rand::thread_rng(), Utc::now().date_naive(), args.days)?;
    let inserted = repos.flights.insert_many(&flights).await?;
    tracing::info!("Inserted {} flights over {} days", inserted, args.days);

    Ok(())
}
