//! Metadata providers
//!
//! A provider turns a (name, platform) query into ranked candidates and
//! fetches full records for a chosen candidate. Each adapter owns its HTTP
//! client and a governor rate limiter awaited before every request.

pub mod rawg_client;
pub mod steam_client;

pub use rawg_client::RawgClient;
pub use steam_client::SteamStoreClient;

use crate::models::{CandidateSummary, Platform, ProviderRecord};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "gamecat/0.1.0 (https://github.com/gamecat/gamecat)";
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Provider request errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API key not configured")]
    MissingApiKey,
}

/// Static description of a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Display name used in prompts, logs and events
    pub name: String,
    /// Optional providers may be skipped with "proceed without"
    pub optional: bool,
}

impl ProviderDescriptor {
    pub fn mandatory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }
}

/// External metadata source
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn descriptor(&self) -> ProviderDescriptor;

    /// Search by name, best matches first
    async fn search(
        &self,
        name: &str,
        platform: Platform,
    ) -> Result<Vec<CandidateSummary>, ProviderError>;

    /// Fetch the full record behind a search candidate
    async fn fetch(&self, candidate: &CandidateSummary) -> Result<ProviderRecord, ProviderError>;
}

pub(crate) type DirectRateLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub(crate) fn build_http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Send a GET request and decode the JSON body
///
/// 404 maps to `NotFound(what)`; any other non-success status keeps its body.
/// Request URLs are stripped from network errors since they may carry API keys.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    what: &str,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

    let status = response.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(what.to_string()));
    }

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status(status.as_u16(), error_text));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(e.without_url().to_string()))?;

    serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Parse an ISO `YYYY-MM-DD` date, ignoring blanks and garbage
pub(crate) fn parse_iso_date(value: Option<&str>) -> Option<chrono::NaiveDate> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// Treat empty strings as absent
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
