//! Cache inspection and pruning.

use anyhow::{Result, bail};
use clap::Subcommand;
use std::time::Duration;
use wisp_core::AppConfig;
use wisp_core::cache::CacheDb;

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Show entry count and age range.
    Stats,
    /// Delete every cached entry.
    Clear,
    /// Delete entries by age or resource.
    Purge {
        /// Delete entries fetched more than this many days ago.
        #[arg(long)]
        older_than_days: Option<u64>,

        /// Delete entries for one resource (posts, pages, authors, tags, settings).
        #[arg(long)]
        resource: Option<String>,
    },
}

pub async fn run(config: &AppConfig, command: CacheCommand) -> Result<()> {
    let db = CacheDb::open(&config.db_path).await?;

    match command {
        CacheCommand::Stats => {
            let stats = db.stats().await?;
            println!("entries: {}", stats.entries);
            if let Some(oldest) = stats.oldest_fetched_at {
                println!("oldest fetch: {oldest}");
            }
            if let Some(newest) = stats.newest_fetched_at {
                println!("newest fetch: {newest}");
            }
        }
        CacheCommand::Clear => {
            let deleted = db.clear().await?;
            println!("deleted {deleted} entries");
        }
        CacheCommand::Purge { older_than_days, resource } => {
            if older_than_days.is_none() && resource.is_none() {
                bail!("at least one of --older-than-days or --resource must be specified");
            }

            let mut deleted = 0u64;
            if let Some(days) = older_than_days {
                deleted += db.purge_older_than(Duration::from_secs(days * 24 * 3600)).await?;
            }
            if let Some(resource) = resource {
                deleted += db.purge_resource(&resource).await?;
            }
            println!("deleted {deleted} entries");
        }
    }

    Ok(())
}
