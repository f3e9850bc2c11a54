//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WISP_*)
//! 2. TOML config file (if WISP_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WISP_*)
/// 2. TOML config file (if WISP_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Ghost instance, e.g. `https://cms.example.com`.
    ///
    /// Set via WISP_API_URL. Required only when content is fetched.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Ghost Content API key.
    ///
    /// Set via WISP_CONTENT_API_KEY. Required only when content is fetched.
    #[serde(default)]
    pub content_api_key: Option<String>,

    /// Public site URL override for the normalized settings record.
    ///
    /// Set via WISP_SITE_URL.
    #[serde(default)]
    pub site_url: Option<String>,

    /// Path to the SQLite content cache.
    ///
    /// Set via WISP_DB_PATH.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for Content API requests.
    ///
    /// Set via WISP_USER_AGENT.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via WISP_TIMEOUT_MS.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory holding Tera templates.
    ///
    /// Set via WISP_TEMPLATES_DIR.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,

    /// Directory of static assets copied verbatim into the output.
    ///
    /// Set via WISP_ASSETS_DIR.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Build output directory.
    ///
    /// Set via WISP_OUTPUT_DIR.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Whether rendered HTML is minified.
    ///
    /// Set via WISP_MINIFY.
    #[serde(default = "default_true")]
    pub minify: bool,

    /// Port for the local preview server.
    ///
    /// Set via WISP_PORT.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./wisp-cache.sqlite")
}

fn default_user_agent() -> String {
    "wisp/0.1".into()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            content_api_key: None,
            site_url: None,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            templates_dir: default_templates_dir(),
            assets_dir: default_assets_dir(),
            output_dir: default_output_dir(),
            minify: true,
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WISP_`
    /// 2. TOML file from `WISP_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WISP_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WISP_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that Content API credentials are available (deferred validation).
    ///
    /// Cache and preview subcommands run without credentials; anything that
    /// talks to the CMS calls this first.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the absent variable.
    pub fn require_content_api(&self) -> Result<(&str, &str), ConfigError> {
        let api_url = self.api_url.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "api_url".into(),
            hint: "Set WISP_API_URL environment variable".into(),
        })?;
        let key = self.content_api_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "content_api_key".into(),
            hint: "Set WISP_CONTENT_API_KEY environment variable".into(),
        })?;
        Ok((api_url, key))
    }
}
