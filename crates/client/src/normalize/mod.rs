//! Collection normalization.
//!
//! Pure transforms applied to fetched (or cached) collections before they
//! reach the templating layer:
//!
//! - **Domain stripping**: the CMS base-URL prefix disappears from every
//!   URL field, including referenced author/tag URLs.
//! - **Date coercion**: `published_at` strings become `DateTime<Utc>`.
//! - **Featured-first ordering**: posts are stably sorted so featured posts
//!   precede the rest, fetch order otherwise preserved.
//! - **Cross-linking**: authors and tags gain the subsequence of posts that
//!   reference them, attached only when non-empty.
//!
//! Stripping and cross-linking are two explicit passes; grouping predicates
//! never mutate the records they inspect.

pub mod link;
pub mod strip;

use crate::content::{ApiAuthor, ApiPost, ApiSettings, ApiTag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strip::{strip_domain, strip_opt};

/// Embedded author reference on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub url: String,
}

/// Embedded tag reference on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub url: String,
}

/// A normalized post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub html: Option<String>,
    pub excerpt: Option<String>,
    pub feature_image: Option<String>,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub primary_author: Option<AuthorRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagRef>,
}

/// A normalized page: the post shape minus tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub html: Option<String>,
    pub excerpt: Option<String>,
    pub feature_image: Option<String>,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub primary_author: Option<AuthorRef>,
}

/// A normalized author with its cross-linked posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<Post>,
}

/// A normalized tag with its cross-linked posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub url: String,
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<Post>,
}

/// Normalized site-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub title: String,
    pub description: String,
    pub url: String,
    pub icon: Option<String>,
    pub logo: Option<String>,
    pub cover_image: Option<String>,
    pub timezone: Option<String>,
}

/// Applies the collection transforms against one configured CMS base URL.
#[derive(Debug, Clone)]
pub struct Normalizer {
    base_url: String,
}

impl Normalizer {
    /// Create a normalizer for the given CMS base URL.
    pub fn new(api_url: &str) -> Self {
        Self { base_url: api_url.trim_end_matches('/').to_string() }
    }

    /// Normalize a posts collection: strip, coerce dates, featured first.
    pub fn posts(&self, raw: Vec<ApiPost>) -> Vec<Post> {
        let mut posts: Vec<Post> = raw.into_iter().map(|p| self.post(p)).collect();
        // Stable sort: featured posts first, fetch order preserved within
        // each group.
        posts.sort_by_key(|p| !p.featured);
        posts
    }

    /// Normalize a pages collection (no featured reordering, no tags).
    pub fn pages(&self, raw: Vec<ApiPost>) -> Vec<Page> {
        raw.into_iter()
            .map(|p| {
                let p = self.post(p);
                Page {
                    id: p.id,
                    title: p.title,
                    slug: p.slug,
                    url: p.url,
                    html: p.html,
                    excerpt: p.excerpt,
                    feature_image: p.feature_image,
                    featured: p.featured,
                    published_at: p.published_at,
                    primary_author: p.primary_author,
                }
            })
            .collect()
    }

    /// Normalize an authors collection and cross-link posts.
    ///
    /// `posts` is the already-normalized posts collection; its order is the
    /// order each author's group retains.
    pub fn authors(&self, raw: Vec<ApiAuthor>, posts: &[Post]) -> Vec<Author> {
        raw.into_iter()
            .map(|a| {
                let linked = link::posts_by_author(&a.id, posts);
                Author {
                    id: a.id,
                    name: a.name,
                    slug: a.slug,
                    url: strip_domain(&a.url, &self.base_url),
                    profile_image: strip_opt(a.profile_image, &self.base_url),
                    bio: a.bio,
                    posts: linked,
                }
            })
            .collect()
    }

    /// Normalize a tags collection and cross-link posts.
    pub fn tags(&self, raw: Vec<ApiTag>, posts: &[Post]) -> Vec<Tag> {
        raw.into_iter()
            .map(|t| {
                let linked = link::posts_by_tag(&t.id, posts);
                Tag {
                    id: t.id,
                    name: t.name,
                    slug: t.slug,
                    url: strip_domain(&t.url, &self.base_url),
                    description: t.description,
                    posts: linked,
                }
            })
            .collect()
    }

    /// Normalize the settings record.
    ///
    /// When a public site URL override is configured it replaces the CMS
    /// URL; otherwise the CMS value is kept verbatim as the canonical
    /// absolute site URL.
    pub fn settings(&self, raw: ApiSettings, site_url_override: Option<&str>) -> Site {
        Site {
            title: raw.title,
            description: raw.description,
            url: site_url_override
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(raw.url),
            icon: strip_opt(raw.icon, &self.base_url),
            logo: strip_opt(raw.logo, &self.base_url),
            cover_image: strip_opt(raw.cover_image, &self.base_url),
            timezone: raw.timezone,
        }
    }

    fn post(&self, raw: ApiPost) -> Post {
        Post {
            id: raw.id,
            title: raw.title,
            slug: raw.slug,
            url: strip_domain(&raw.url, &self.base_url),
            html: raw.html,
            excerpt: raw.excerpt,
            feature_image: strip_opt(raw.feature_image, &self.base_url),
            featured: raw.featured,
            published_at: parse_published(raw.published_at.as_deref()),
            primary_author: raw.primary_author.map(|a| self.author_ref(a)),
            tags: raw
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(|t| TagRef {
                    id: t.id,
                    name: t.name,
                    slug: t.slug,
                    url: strip_domain(&t.url, &self.base_url),
                })
                .collect(),
        }
    }

    fn author_ref(&self, raw: ApiAuthor) -> AuthorRef {
        AuthorRef {
            id: raw.id,
            name: raw.name,
            slug: raw.slug,
            url: strip_domain(&raw.url, &self.base_url),
        }
    }
}

/// Coerce a raw `published_at` string into a UTC datetime.
///
/// Unparseable timestamps are logged and dropped rather than failing the
/// whole collection.
fn parse_published(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("unparseable published_at {:?}: {}", raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cms.example.com";

    fn api_post(id: &str, featured: bool) -> ApiPost {
        ApiPost {
            id: id.to_string(),
            title: format!("Post {id}"),
            slug: format!("post-{id}"),
            url: format!("{BASE}/post-{id}/"),
            html: Some("<p>Body</p>".to_string()),
            excerpt: None,
            feature_image: Some(format!("{BASE}/content/images/2026/07/{id}.png")),
            featured,
            published_at: Some("2026-07-01T08:00:00.000+00:00".to_string()),
            primary_author: Some(ApiAuthor {
                id: "a1".to_string(),
                name: "Cam Spiers".to_string(),
                slug: "cam".to_string(),
                url: format!("{BASE}/author/cam/"),
                profile_image: None,
                bio: None,
            }),
            tags: Some(vec![ApiTag {
                id: "t1".to_string(),
                name: "News".to_string(),
                slug: "news".to_string(),
                url: format!("{BASE}/tag/news/"),
                description: None,
                visibility: Some("public".to_string()),
            }]),
        }
    }

    #[test]
    fn test_no_url_contains_base_domain() {
        let normalizer = Normalizer::new(BASE);
        let posts = normalizer.posts(vec![api_post("1", false), api_post("2", true)]);

        for post in &posts {
            assert!(!post.url.contains("cms.example.com"), "post url: {}", post.url);
            let image = post.feature_image.as_ref().unwrap();
            assert!(!image.contains("cms.example.com"), "feature image: {image}");
            let author = post.primary_author.as_ref().unwrap();
            assert!(!author.url.contains("cms.example.com"), "author url: {}", author.url);
            for tag in &post.tags {
                assert!(!tag.url.contains("cms.example.com"), "tag url: {}", tag.url);
            }
        }
    }

    #[test]
    fn test_featured_first_stable() {
        let normalizer = Normalizer::new(BASE);
        let posts = normalizer.posts(vec![
            api_post("1", true),
            api_post("2", false),
            api_post("3", true),
        ]);

        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn test_date_coercion() {
        let normalizer = Normalizer::new(BASE);
        let posts = normalizer.posts(vec![api_post("1", false)]);

        let published = posts[0].published_at.unwrap();
        assert_eq!(published.to_rfc3339(), "2026-07-01T08:00:00+00:00");
    }

    #[test]
    fn test_bad_date_becomes_none() {
        let normalizer = Normalizer::new(BASE);
        let mut raw = api_post("1", false);
        raw.published_at = Some("July 1st".to_string());

        let posts = normalizer.posts(vec![raw]);
        assert!(posts[0].published_at.is_none());
    }

    #[test]
    fn test_author_cross_link() {
        let normalizer = Normalizer::new(BASE);
        let mut other = api_post("2", false);
        other.primary_author.as_mut().unwrap().id = "a2".to_string();
        let posts = normalizer.posts(vec![api_post("1", false), other, api_post("3", false)]);

        let raw_author = ApiAuthor {
            id: "a1".to_string(),
            name: "Cam Spiers".to_string(),
            slug: "cam".to_string(),
            url: format!("{BASE}/author/cam/"),
            profile_image: None,
            bio: None,
        };
        let authors = normalizer.authors(vec![raw_author], &posts);

        assert_eq!(authors.len(), 1);
        let linked: Vec<&str> = authors[0].posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(linked, vec!["1", "3"]);
    }

    #[test]
    fn test_tag_cross_link() {
        let normalizer = Normalizer::new(BASE);
        let mut untagged = api_post("2", false);
        untagged.tags = None;
        let posts = normalizer.posts(vec![api_post("1", false), untagged]);

        let raw_tag = ApiTag {
            id: "t1".to_string(),
            name: "News".to_string(),
            slug: "news".to_string(),
            url: format!("{BASE}/tag/news/"),
            description: None,
            visibility: None,
        };
        let tags = normalizer.tags(vec![raw_tag], &posts);

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].url, "/tag/news/");
        let linked: Vec<&str> = tags[0].posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(linked, vec!["1"]);
    }

    #[test]
    fn test_empty_cross_links_not_serialized() {
        let normalizer = Normalizer::new(BASE);
        let raw_author = ApiAuthor {
            id: "a9".to_string(),
            name: "Nobody".to_string(),
            slug: "nobody".to_string(),
            url: format!("{BASE}/author/nobody/"),
            profile_image: None,
            bio: None,
        };
        let authors = normalizer.authors(vec![raw_author], &[]);

        let json = serde_json::to_value(&authors[0]).unwrap();
        assert!(json.get("posts").is_none());
    }

    #[test]
    fn test_pages_drop_tags() {
        let normalizer = Normalizer::new(BASE);
        let pages = normalizer.pages(vec![api_post("1", false)]);

        assert_eq!(pages[0].url, "/post-1/");
        let json = serde_json::to_value(&pages[0]).unwrap();
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn test_settings_override() {
        let normalizer = Normalizer::new(BASE);
        let raw = ApiSettings {
            title: "Example Blog".to_string(),
            description: "Ideas.".to_string(),
            url: format!("{BASE}/"),
            icon: Some(format!("{BASE}/content/images/favicon.png")),
            logo: None,
            cover_image: None,
            timezone: Some("Etc/UTC".to_string()),
        };

        let site = normalizer.settings(raw.clone(), Some("https://blog.example.org/"));
        assert_eq!(site.url, "https://blog.example.org");
        assert_eq!(site.icon.as_deref(), Some("/content/images/favicon.png"));

        let site = normalizer.settings(raw, None);
        assert_eq!(site.url, format!("{BASE}/"));
    }
}
