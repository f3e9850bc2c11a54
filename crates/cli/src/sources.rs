//! Named content collections with fixed freshness windows.
//!
//! This is the registry the build consumes: each collection composes the
//! content client, the cache wrapper, and the normalizers under a fixed
//! maximum age. Fetches are independent and idempotent; repeated calls with
//! the same arguments converge on the same cached value until it expires.

use serde::Serialize;
use std::time::Duration;
use wisp_client::content::{ApiPost, ApiSettings};
use wisp_client::{Author, BrowseParams, ContentClient, Normalizer, Page, Post, Site, Tag};
use wisp_core::cache::{CacheDb, Fetched, fetch_cached};
use wisp_core::Error;

/// Posts refresh at most once a day.
pub const POSTS_MAX_AGE: Duration = Duration::from_secs(24 * 3600);
/// Pages and docs change rarely.
pub const PAGES_MAX_AGE: Duration = Duration::from_secs(10 * 24 * 3600);
pub const DOCS_MAX_AGE: Duration = Duration::from_secs(10 * 24 * 3600);
/// Footer-tagged pages are close to static.
pub const FOOTER_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 3600);
pub const AUTHORS_MAX_AGE: Duration = Duration::from_secs(24 * 3600);
pub const TAGS_MAX_AGE: Duration = Duration::from_secs(24 * 3600);
/// Settings drive titles and navigation; keep them near-live.
pub const SETTINGS_MAX_AGE: Duration = Duration::from_secs(600);

/// All normalized collections assembled for one build.
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub site: Option<Site>,
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub docs: Vec<Page>,
    pub footer: Vec<Page>,
    pub authors: Vec<Author>,
    pub tags: Vec<Tag>,
}

/// The data-source registry over one client, cache, and normalizer.
pub struct Sources {
    client: ContentClient,
    db: CacheDb,
    normalizer: Normalizer,
    site_url: Option<String>,
}

impl Sources {
    pub fn new(client: ContentClient, db: CacheDb, api_url: &str, site_url: Option<String>) -> Self {
        Self { client, db, normalizer: Normalizer::new(api_url), site_url }
    }

    /// The posts collection, featured first.
    pub async fn posts(&self) -> Result<Fetched<Vec<Post>>, Error> {
        let params = BrowseParams::all_with_include("tags,authors");
        let raw: Fetched<Vec<ApiPost>> = fetch_cached(
            &self.db,
            "posts",
            &params.cache_params(),
            POSTS_MAX_AGE,
            || async { self.client.posts(&params).await },
        )
        .await?;
        Ok(raw.map(|r| self.normalizer.posts(r)))
    }

    /// The full pages collection.
    pub async fn pages(&self) -> Result<Fetched<Vec<Page>>, Error> {
        self.pages_with("pages", BrowseParams::all(), PAGES_MAX_AGE).await
    }

    /// Pages carrying the internal `#docs` tag.
    pub async fn docs(&self) -> Result<Fetched<Vec<Page>>, Error> {
        self.pages_with("pages", BrowseParams::all_filtered("tag:hash-docs"), DOCS_MAX_AGE)
            .await
    }

    /// Pages carrying the internal `#footer` tag.
    pub async fn footer(&self) -> Result<Fetched<Vec<Page>>, Error> {
        self.pages_with("pages", BrowseParams::all_filtered("tag:hash-footer"), FOOTER_MAX_AGE)
            .await
    }

    /// The authors collection with cross-linked posts.
    pub async fn authors(&self) -> Result<Fetched<Vec<Author>>, Error> {
        let posts = self.posts().await?.into_value().unwrap_or_default();
        let params = BrowseParams::all();
        let raw = fetch_cached(
            &self.db,
            "authors",
            &params.cache_params(),
            AUTHORS_MAX_AGE,
            || async { self.client.authors(&params).await },
        )
        .await?;
        Ok(raw.map(|r| self.normalizer.authors(r, &posts)))
    }

    /// The tags collection with cross-linked posts.
    pub async fn tags(&self) -> Result<Fetched<Vec<Tag>>, Error> {
        let posts = self.posts().await?.into_value().unwrap_or_default();
        let params = BrowseParams::all();
        let raw = fetch_cached(
            &self.db,
            "tags",
            &params.cache_params(),
            TAGS_MAX_AGE,
            || async { self.client.tags(&params).await },
        )
        .await?;
        Ok(raw.map(|r| self.normalizer.tags(r, &posts)))
    }

    /// The site-wide settings record.
    pub async fn settings(&self) -> Result<Fetched<Site>, Error> {
        let params = BrowseParams::default();
        let raw: Fetched<ApiSettings> = fetch_cached(
            &self.db,
            "settings",
            &params.cache_params(),
            SETTINGS_MAX_AGE,
            || async { self.client.settings().await },
        )
        .await?;
        Ok(raw.map(|r| self.normalizer.settings(r, self.site_url.as_deref())))
    }

    /// Look up a collection by name.
    ///
    /// Unrecognized names silently produce no result.
    pub async fn collection(&self, name: &str) -> Result<Fetched<serde_json::Value>, Error> {
        match name {
            "posts" => Ok(to_json(self.posts().await?)),
            "pages" => Ok(to_json(self.pages().await?)),
            "docs" => Ok(to_json(self.docs().await?)),
            "footer" => Ok(to_json(self.footer().await?)),
            "authors" => Ok(to_json(self.authors().await?)),
            "tags" => Ok(to_json(self.tags().await?)),
            "settings" => Ok(to_json(self.settings().await?)),
            _ => {
                tracing::debug!("unknown collection {:?}, producing no result", name);
                Ok(Fetched::Empty)
            }
        }
    }

    /// Assemble every collection for the build context.
    ///
    /// Freshness collapses here: a build renders whatever content is
    /// available, stale included.
    pub async fn site_data(&self) -> Result<SiteData, Error> {
        Ok(SiteData {
            site: self.settings().await?.into_value(),
            posts: self.posts().await?.into_value().unwrap_or_default(),
            pages: self.pages().await?.into_value().unwrap_or_default(),
            docs: self.docs().await?.into_value().unwrap_or_default(),
            footer: self.footer().await?.into_value().unwrap_or_default(),
            authors: self.authors().await?.into_value().unwrap_or_default(),
            tags: self.tags().await?.into_value().unwrap_or_default(),
        })
    }

    async fn pages_with(&self, resource: &str, params: BrowseParams, max_age: Duration) -> Result<Fetched<Vec<Page>>, Error> {
        let raw: Fetched<Vec<ApiPost>> = fetch_cached(
            &self.db,
            resource,
            &params.cache_params(),
            max_age,
            || async { self.client.pages(&params).await },
        )
        .await?;
        Ok(raw.map(|r| self.normalizer.pages(r)))
    }
}

fn to_json<T: Serialize>(fetched: Fetched<T>) -> Fetched<serde_json::Value> {
    fetched.map(|v| serde_json::to_value(v).unwrap_or(serde_json::Value::Null))
}
