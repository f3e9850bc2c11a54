//! wisp entry point.
//!
//! A static site builder backed by a Ghost Content API: fetch collections
//! through an on-disk cache, normalize them, and render Tera templates.
//! Logging goes to stderr so `wisp fetch` output stays pipeable.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wisp_core::AppConfig;

mod commands;
mod helpers;
mod sources;

#[derive(Debug, Parser)]
#[command(name = "wisp", version, about = "Static site builder backed by a Ghost content API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch content and render the site into the output directory.
    Build,
    /// Serve the build output for local preview.
    Serve,
    /// Print one named collection as JSON.
    Fetch {
        /// Collection name: posts, pages, docs, footer, authors, tags, settings.
        collection: String,
    },
    /// Inspect or prune the content cache.
    Cache {
        #[command(subcommand)]
        command: commands::cache::CacheCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Build => commands::build::run(&config).await,
        Command::Serve => commands::serve::run(config).await,
        Command::Fetch { collection } => commands::fetch::run(&config, &collection).await,
        Command::Cache { command } => commands::cache::run(&config, command).await,
    }
}
