//! Print one named collection as JSON.
//!
//! The build's view of a data source, exposed for inspection. Unknown
//! collection names print nothing and exit successfully.

use crate::sources::Sources;
use anyhow::Result;
use wisp_client::{ContentClient, ContentConfig};
use wisp_core::cache::{CacheDb, Fetched};
use wisp_core::AppConfig;

pub async fn run(config: &AppConfig, name: &str) -> Result<()> {
    let db = CacheDb::open(&config.db_path).await?;
    let content_config = ContentConfig::from_config(config)?;
    let api_url = content_config.api_url.clone();
    let client = ContentClient::new(content_config)?;
    let sources = Sources::new(client, db, &api_url, config.site_url.clone());

    match sources.collection(name).await? {
        Fetched::Fresh(value) => {
            tracing::debug!("collection {} is fresh", name);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Fetched::Stale(value) => {
            tracing::warn!("collection {} served from stale cache", name);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Fetched::Empty => {
            tracing::debug!("collection {:?} produced no result", name);
        }
    }

    Ok(())
}
