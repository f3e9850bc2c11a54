//! Content API response envelopes and record types.
//!
//! These are the raw shapes as returned by the CMS; the cache stores them
//! verbatim. Normalization into the template-facing model happens in
//! [`crate::normalize`].

use serde::{Deserialize, Serialize};

/// Envelope for `posts` browse responses.
#[derive(Debug, Deserialize)]
pub struct PostsEnvelope {
    pub posts: Vec<ApiPost>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Envelope for `pages` browse responses.
#[derive(Debug, Deserialize)]
pub struct PagesEnvelope {
    pub pages: Vec<ApiPage>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Envelope for `authors` browse responses.
#[derive(Debug, Deserialize)]
pub struct AuthorsEnvelope {
    pub authors: Vec<ApiAuthor>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Envelope for `tags` browse responses.
#[derive(Debug, Deserialize)]
pub struct TagsEnvelope {
    pub tags: Vec<ApiTag>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Envelope for the `settings` response.
#[derive(Debug, Deserialize)]
pub struct SettingsEnvelope {
    pub settings: ApiSettings,
}

/// Browse pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next: Option<u32>,
    #[serde(default)]
    pub prev: Option<u32>,
}

/// A post record as returned by the CMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub primary_author: Option<ApiAuthor>,
    #[serde(default)]
    pub tags: Option<Vec<ApiTag>>,
}

/// Pages share the post record shape (minus meaningful tags).
pub type ApiPage = ApiPost;

/// An author record as returned by the CMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAuthor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// A tag record as returned by the CMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTag {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

/// The site-wide settings record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}
