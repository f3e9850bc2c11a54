//! Ghost Content API client.
//!
//! Provides a read-only client for the Ghost Content API with request
//! validation and typed response envelopes.
//!
//! ### Specification
//!
//! - **Endpoint**: `{api_url}/ghost/api/content/{resource}/`
//! - **Authentication**: the Content API key travels as the `key` query
//!   parameter; the API version is pinned via the `Accept-Version` header.
//! - **Resources**: `posts`, `pages`, `authors`, `tags` (browse with
//!   filter/include/limit parameters) and the singleton `settings`.

pub mod error;
pub mod request;
pub mod response;

pub use error::ContentError;
pub use request::BrowseParams;
pub use response::{ApiAuthor, ApiPage, ApiPost, ApiSettings, ApiTag, Pagination};

use reqwest::header;
use serde::de::DeserializeOwned;
use std::time::Duration;
use wisp_core::AppConfig;

use response::{AuthorsEnvelope, PagesEnvelope, PostsEnvelope, SettingsEnvelope, TagsEnvelope};

/// Content API version pinned on every request.
const API_VERSION: &str = "v5.0";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "wisp/0.1";

/// Content API client configuration.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Base URL of the Ghost instance, without trailing slash.
    pub api_url: String,
    /// Content API key.
    pub api_key: String,
    /// Request timeout (default: 15s).
    pub timeout: Duration,
    /// User-agent string (default: wisp/0.x).
    pub user_agent: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ContentConfig {
    /// Build client configuration from the application config.
    ///
    /// Returns an error if the API URL or key is absent.
    pub fn from_config(config: &AppConfig) -> Result<Self, ContentError> {
        let (api_url, api_key) = config
            .require_content_api()
            .map_err(|e| ContentError::MissingCredentials(e.to_string()))?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Ghost Content API client.
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    config: ContentConfig,
}

impl ContentClient {
    /// Create a new content client with the given configuration.
    pub fn new(config: ContentConfig) -> Result<Self, ContentError> {
        if config.api_key.is_empty() {
            return Err(ContentError::MissingCredentials("content API key is empty".into()));
        }

        url::Url::parse(&config.api_url).map_err(|e| ContentError::InvalidUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()
            .map_err(|e| ContentError::Network(std::sync::Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// Browse the posts collection.
    pub async fn posts(&self, params: &BrowseParams) -> Result<Vec<ApiPost>, ContentError> {
        Ok(self.browse::<PostsEnvelope>("posts", params).await?.posts)
    }

    /// Browse the pages collection.
    pub async fn pages(&self, params: &BrowseParams) -> Result<Vec<ApiPage>, ContentError> {
        Ok(self.browse::<PagesEnvelope>("pages", params).await?.pages)
    }

    /// Browse the authors collection.
    pub async fn authors(&self, params: &BrowseParams) -> Result<Vec<ApiAuthor>, ContentError> {
        Ok(self.browse::<AuthorsEnvelope>("authors", params).await?.authors)
    }

    /// Browse the tags collection.
    pub async fn tags(&self, params: &BrowseParams) -> Result<Vec<ApiTag>, ContentError> {
        Ok(self.browse::<TagsEnvelope>("tags", params).await?.tags)
    }

    /// Fetch the site-wide settings record.
    pub async fn settings(&self) -> Result<ApiSettings, ContentError> {
        Ok(self
            .browse::<SettingsEnvelope>("settings", &BrowseParams::default())
            .await?
            .settings)
    }

    /// Execute one browse request against a resource endpoint.
    async fn browse<T: DeserializeOwned>(&self, resource: &str, params: &BrowseParams) -> Result<T, ContentError> {
        params.validate()?;

        let endpoint = format!("{}/ghost/api/content/{}/", self.config.api_url, resource);

        tracing::debug!("fetching {} from {}", resource, endpoint);

        let response = self
            .http
            .get(&endpoint)
            .header("Accept-Version", API_VERSION)
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, &self.config.user_agent)
            .query(&[("key", self.config.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("{} response status: {}", resource, status);

        if status == 401 || status == 403 {
            return Err(ContentError::Unauthorized);
        }

        if status == 404 {
            return Err(ContentError::NotFound(resource.to_string()));
        }

        if status == 429 {
            return Err(ContentError::RateLimited);
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(ContentError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ContentError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ContentConfig {
        ContentConfig {
            api_url: "https://cms.example.com".to_string(),
            api_key: "22444f78447824223cefc48062".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_new() {
        let client = ContentClient::new(test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_new_empty_key() {
        let config = ContentConfig { api_key: String::new(), ..test_config() };
        let result = ContentClient::new(config);
        assert!(matches!(result, Err(ContentError::MissingCredentials(_))));
    }

    #[test]
    fn test_client_new_bad_url() {
        let config = ContentConfig { api_url: "not a url".to_string(), ..test_config() };
        let result = ContentClient::new(config);
        assert!(matches!(result, Err(ContentError::InvalidUrl(_))));
    }

    #[test]
    fn test_from_config_missing_credentials() {
        let app = AppConfig::default();
        let result = ContentConfig::from_config(&app);
        assert!(matches!(result, Err(ContentError::MissingCredentials(_))));
    }

    #[test]
    fn test_from_config_trims_trailing_slash() {
        let app = AppConfig {
            api_url: Some("https://cms.example.com/".into()),
            content_api_key: Some("22444f78447824223cefc48062".into()),
            ..Default::default()
        };
        let config = ContentConfig::from_config(&app).unwrap();
        assert_eq!(config.api_url, "https://cms.example.com");
    }
}
