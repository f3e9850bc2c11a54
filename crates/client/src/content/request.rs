//! Content API browse parameters and validation.

use serde::{Deserialize, Serialize};

/// Browse parameters accepted by the Content API collection endpoints.
///
/// Every field is optional; unset fields are omitted from the query string.
/// The same parameter set, canonically serialized, forms part of the cache
/// identifier for a fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BrowseParams {
    /// Related records to embed, e.g. `tags,authors`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,

    /// NQL filter expression, e.g. `tag:hash-footer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Page size: a positive integer or `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,

    /// Sort order, e.g. `published_at desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Page number (1-based).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Comma-separated field projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
}

impl BrowseParams {
    /// Parameters fetching an entire collection.
    pub fn all() -> Self {
        Self { limit: Some("all".to_string()), ..Default::default() }
    }

    /// Parameters fetching an entire collection with embedded relations.
    pub fn all_with_include(include: &str) -> Self {
        Self { include: Some(include.to_string()), ..Self::all() }
    }

    /// Parameters fetching an entire collection matching a filter.
    pub fn all_filtered(filter: &str) -> Self {
        Self { filter: Some(filter.to_string()), ..Self::all() }
    }

    /// Validate the browse parameters.
    ///
    /// Returns an error if any parameters are out of range or malformed.
    pub fn validate(&self) -> Result<(), crate::content::ContentError> {
        use crate::content::ContentError;

        if let Some(limit) = &self.limit
            && limit != "all"
            && !limit.parse::<u32>().is_ok_and(|n| n >= 1)
        {
            return Err(ContentError::InvalidParams(format!(
                "limit must be a positive integer or \"all\", got {limit:?}"
            )));
        }

        if let Some(page) = self.page
            && page < 1
        {
            return Err(ContentError::InvalidParams("page must be >= 1".to_string()));
        }

        Ok(())
    }

    /// Canonical serialization of the parameters for cache identifiers.
    ///
    /// Includes unset fields as nulls so the representation is total and
    /// stable across releases.
    pub fn cache_params(&self) -> String {
        serde_json::json!({
            "include": self.include,
            "filter": self.filter,
            "limit": self.limit,
            "order": self.order,
            "page": self.page,
            "fields": self.fields,
        })
        .to_string()
    }
}
