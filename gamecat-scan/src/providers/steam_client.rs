//! Steam storefront client (secondary provider)
//!
//! Uses the public, keyless store endpoints:
//! - `GET /api/storesearch/?term&l=english&cc=US`
//! - `GET /api/appdetails?appids={id}&l=english`
//!
//! The store only lists PC titles, so the platform is not part of the query.

use super::{
    build_http_client, get_json, non_empty, DirectRateLimiter, MetadataProvider,
    ProviderDescriptor, ProviderError,
};
use crate::models::{CandidateSummary, Platform, ProviderRecord, ProviderRef};
use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

const STEAM_STORE_URL: &str = "https://store.steampowered.com";
const STEAM_REQUEST_INTERVAL_MS: u64 = 1500;

pub const STEAM_PROVIDER_NAME: &str = "Steam";

static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    // Safe: constant pattern
    Regex::new(r"<[^>]*>").expect("tag pattern is valid")
});

#[derive(Debug, Deserialize)]
pub(crate) struct StoreSearchResponse {
    #[serde(default)]
    items: Vec<StoreSearchItem>,
}

#[derive(Debug, Deserialize)]
struct StoreSearchItem {
    #[serde(rename = "type")]
    item_type: String,
    id: u64,
    name: String,
    /// Empty string when unrated
    #[serde(default)]
    metascore: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AppDetailsEntry {
    success: bool,
    data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    name: String,
    short_description: Option<String>,
    release_date: Option<AppReleaseDate>,
    #[serde(default)]
    genres: Vec<AppGenre>,
    header_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppReleaseDate {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppGenre {
    description: String,
}

pub(crate) fn candidates_from_search(response: StoreSearchResponse) -> Vec<CandidateSummary> {
    response
        .items
        .into_iter()
        .filter(|item| item.item_type == "app")
        .map(|item| CandidateSummary {
            provider_ref: ProviderRef(item.id.to_string()),
            name: item.name,
            release_date: None,
            score: item.metascore.trim().parse::<f32>().ok(),
        })
        .collect()
}

/// Store dates come as `21 Oct, 2001` or `Oct 21, 2001` depending on region
pub(crate) fn parse_store_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d %b, %Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%b %d, %Y"))
        .ok()
}

/// Remove HTML markup from store text
pub(crate) fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, " ");
    let decoded = without_tags
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn record_from_details(
    app_id: &str,
    mut details: HashMap<String, AppDetailsEntry>,
) -> Result<ProviderRecord, ProviderError> {
    let not_found = || ProviderError::NotFound(format!("Steam app {}", app_id));

    let entry = details.remove(app_id).ok_or_else(not_found)?;
    if !entry.success {
        return Err(not_found());
    }
    let data = entry.data.ok_or_else(not_found)?;

    Ok(ProviderRecord {
        name: data.name,
        description: non_empty(data.short_description.map(|d| strip_html(&d))),
        release_date: data
            .release_date
            .and_then(|r| r.date)
            .and_then(|d| parse_store_date(&d)),
        critic_score: None,
        user_score: None,
        genres: data.genres.into_iter().map(|g| g.description).collect(),
        thumbnail: non_empty(data.header_image),
        poster: None,
        detail_url: format!("{}/app/{}", STEAM_STORE_URL, app_id),
    })
}

/// Steam storefront client
pub struct SteamStoreClient {
    client: reqwest::Client,
    rate_limiter: DirectRateLimiter,
    base_url: String,
}

impl SteamStoreClient {
    pub fn new() -> Result<Self, ProviderError> {
        let quota = governor::Quota::with_period(Duration::from_millis(STEAM_REQUEST_INTERVAL_MS))
            .unwrap_or_else(|| governor::Quota::per_second(NonZeroU32::MIN));

        Ok(Self {
            client: build_http_client()?,
            rate_limiter: governor::RateLimiter::direct(quota),
            base_url: STEAM_STORE_URL.to_string(),
        })
    }

    /// Point the client at another server (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MetadataProvider for SteamStoreClient {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::optional(STEAM_PROVIDER_NAME)
    }

    async fn search(
        &self,
        name: &str,
        _platform: Platform,
    ) -> Result<Vec<CandidateSummary>, ProviderError> {
        self.rate_limiter.until_ready().await;

        debug!(name = %name, "Searching Steam store");

        let request = self
            .client
            .get(format!("{}/api/storesearch/", self.base_url))
            .query(&[("term", name), ("l", "english"), ("cc", "US")]);

        let response: StoreSearchResponse = get_json(request, "Steam store search").await?;
        Ok(candidates_from_search(response))
    }

    async fn fetch(&self, candidate: &CandidateSummary) -> Result<ProviderRecord, ProviderError> {
        self.rate_limiter.until_ready().await;

        let app_id = candidate.provider_ref.0.as_str();
        debug!(app_id = %app_id, "Fetching Steam app details");

        let request = self
            .client
            .get(format!("{}/api/appdetails", self.base_url))
            .query(&[("appids", app_id), ("l", "english")]);

        let details: HashMap<String, AppDetailsEntry> =
            get_json(request, &format!("Steam app {}", app_id)).await?;

        record_from_details(app_id, details)
    }
}
