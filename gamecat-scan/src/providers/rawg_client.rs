//! RAWG video game database client (primary provider)
//!
//! Search: `GET /games?key&search&platforms&page_size`
//! Detail: `GET /games/{id}?key`
//!
//! Requires an API key; a client built without one fails on first use
//! with `ProviderError::MissingApiKey`.

use super::{
    build_http_client, get_json, non_empty, parse_iso_date, DirectRateLimiter,
    MetadataProvider, ProviderDescriptor, ProviderError,
};
use crate::models::{CandidateSummary, Platform, ProviderRecord, ProviderRef};
use async_trait::async_trait;
use serde::Deserialize;
use std::num::NonZeroU32;
use tracing::debug;

const RAWG_BASE_URL: &str = "https://api.rawg.io/api";
const RAWG_DETAIL_URL: &str = "https://rawg.io/games";
const RAWG_REQUESTS_PER_SECOND: u32 = 5;
const SEARCH_PAGE_SIZE: u32 = 10;

pub const RAWG_PROVIDER_NAME: &str = "RAWG";

#[derive(Debug, Deserialize)]
pub(crate) struct RawgSearchResponse {
    #[serde(default)]
    results: Vec<RawgGameSummary>,
}

#[derive(Debug, Deserialize)]
struct RawgGameSummary {
    id: u64,
    name: String,
    released: Option<String>,
    metacritic: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawgGameDetail {
    slug: String,
    name: String,
    description_raw: Option<String>,
    released: Option<String>,
    metacritic: Option<u32>,
    /// 0-5 user rating
    rating: Option<f32>,
    #[serde(default)]
    genres: Vec<RawgGenre>,
    background_image: Option<String>,
    background_image_additional: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawgGenre {
    name: String,
}

/// RAWG platform id for a platform
pub fn rawg_platform_id(platform: Platform) -> u32 {
    match platform {
        Platform::Pc => 4,
        Platform::PlayStation => 27,
        Platform::PlayStation2 => 15,
        Platform::PlayStation3 => 16,
        Platform::PlayStation4 => 18,
        Platform::PlayStation5 => 187,
        Platform::Xbox360 => 14,
        Platform::XboxOne => 1,
        Platform::XboxSeries => 186,
        Platform::NintendoSwitch => 7,
    }
}

pub(crate) fn candidates_from_search(response: RawgSearchResponse) -> Vec<CandidateSummary> {
    response
        .results
        .into_iter()
        .map(|game| CandidateSummary {
            provider_ref: ProviderRef(game.id.to_string()),
            name: game.name,
            release_date: parse_iso_date(game.released.as_deref()),
            score: game.metacritic.map(|m| m as f32),
        })
        .collect()
}

pub(crate) fn record_from_detail(detail: RawgGameDetail) -> ProviderRecord {
    ProviderRecord {
        name: detail.name,
        description: non_empty(detail.description_raw),
        release_date: parse_iso_date(detail.released.as_deref()),
        critic_score: detail.metacritic.map(|m| m as f32),
        user_score: detail.rating,
        genres: detail.genres.into_iter().map(|g| g.name).collect(),
        thumbnail: non_empty(detail.background_image),
        poster: non_empty(detail.background_image_additional),
        detail_url: format!("{}/{}", RAWG_DETAIL_URL, detail.slug),
    }
}

/// RAWG API client
pub struct RawgClient {
    client: reqwest::Client,
    rate_limiter: DirectRateLimiter,
    base_url: String,
    api_key: Option<String>,
}

impl RawgClient {
    pub fn new(api_key: Option<String>) -> Result<Self, ProviderError> {
        let per_second = NonZeroU32::new(RAWG_REQUESTS_PER_SECOND).unwrap_or(NonZeroU32::MIN);
        let quota = governor::Quota::per_second(per_second);

        Ok(Self {
            client: build_http_client()?,
            rate_limiter: governor::RateLimiter::direct(quota),
            base_url: RAWG_BASE_URL.to_string(),
            api_key: non_empty(api_key),
        })
    }

    /// Point the client at another server (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)
    }
}

#[async_trait]
impl MetadataProvider for RawgClient {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor::mandatory(RAWG_PROVIDER_NAME)
    }

    async fn search(
        &self,
        name: &str,
        platform: Platform,
    ) -> Result<Vec<CandidateSummary>, ProviderError> {
        let key = self.api_key()?;

        self.rate_limiter.until_ready().await;

        debug!(name = %name, platform = %platform, "Searching RAWG");

        let request = self.client.get(format!("{}/games", self.base_url)).query(&[
            ("key", key.to_string()),
            ("search", name.to_string()),
            ("platforms", rawg_platform_id(platform).to_string()),
            ("page_size", SEARCH_PAGE_SIZE.to_string()),
        ]);

        let response: RawgSearchResponse = get_json(request, "RAWG search").await?;
        let candidates = candidates_from_search(response);

        debug!(name = %name, count = candidates.len(), "RAWG search complete");
        Ok(candidates)
    }

    async fn fetch(&self, candidate: &CandidateSummary) -> Result<ProviderRecord, ProviderError> {
        let key = self.api_key()?;

        self.rate_limiter.until_ready().await;

        debug!(id = %candidate.provider_ref, "Fetching RAWG game");

        let request = self
            .client
            .get(format!("{}/games/{}", self.base_url, candidate.provider_ref))
            .query(&[("key", key)]);

        let detail: RawgGameDetail =
            get_json(request, &format!("RAWG game {}", candidate.provider_ref)).await?;

        Ok(record_from_detail(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SEARCH_FIXTURE: &str = r#"{
        "count": 3,
        "next": null,
        "results": [
            {"id": 3328, "slug": "stronghold", "name": "Stronghold", "released": "2001-10-21", "metacritic": 81},
            {"id": 13536, "slug": "stronghold-crusader", "name": "Stronghold Crusader", "released": "2002-09-01", "metacritic": null},
            {"id": 9999, "slug": "stronghold-x", "name": "Stronghold X", "released": null}
        ]
    }"#;

    const DETAIL_FIXTURE: &str = r#"{
        "id": 3328,
        "slug": "stronghold",
        "name": "Stronghold",
        "description_raw": "Build a castle.",
        "released": "2001-10-21",
        "metacritic": 81,
        "rating": 3.9,
        "genres": [{"id": 10, "name": "Strategy"}, {"id": 14, "name": "Simulation"}],
        "background_image": "https://media.rawg.io/stronghold.jpg",
        "background_image_additional": ""
    }"#;

    #[test]
    fn test_search_translation() {
        let response: RawgSearchResponse = serde_json::from_str(SEARCH_FIXTURE).unwrap();
        let candidates = candidates_from_search(response);

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].provider_ref, ProviderRef("3328".to_string()));
        assert_eq!(candidates[0].name, "Stronghold");
        assert_eq!(candidates[0].release_date, NaiveDate::from_ymd_opt(2001, 10, 21));
        assert_eq!(candidates[0].score, Some(81.0));
        assert_eq!(candidates[1].score, None);
        assert_eq!(candidates[2].release_date, None);
    }

    #[test]
    fn test_empty_search_response() {
        let response: RawgSearchResponse = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(candidates_from_search(response).is_empty());
    }

    #[test]
    fn test_detail_translation() {
        let detail: RawgGameDetail = serde_json::from_str(DETAIL_FIXTURE).unwrap();
        let record = record_from_detail(detail);

        assert_eq!(record.name, "Stronghold");
        assert_eq!(record.description.as_deref(), Some("Build a castle."));
        assert_eq!(record.critic_score, Some(81.0));
        assert_eq!(record.user_score, Some(3.9));
        assert_eq!(record.genres, vec!["Strategy".to_string(), "Simulation".to_string()]);
        assert_eq!(record.thumbnail.as_deref(), Some("https://media.rawg.io/stronghold.jpg"));
        assert_eq!(record.poster, None);
        assert_eq!(record.detail_url, "https://rawg.io/games/stronghold");
    }

    #[test]
    fn test_platform_ids() {
        assert_eq!(rawg_platform_id(Platform::Pc), 4);
        assert_eq!(rawg_platform_id(Platform::PlayStation5), 187);
        assert_eq!(rawg_platform_id(Platform::NintendoSwitch), 7);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = RawgClient::new(Some("  ".to_string()))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");

        let result = client.search("Stronghold", Platform::Pc).await;
        assert!(matches!(result, Err(ProviderError::MissingApiKey)));
    }

    #[tokio::test]
    #[ignore] // Requires network access and GAMECAT_RAWG_API_KEY
    async fn test_live_search() {
        let key = std::env::var("GAMECAT_RAWG_API_KEY").ok();
        let client = RawgClient::new(key).unwrap();
        let candidates = client.search("Stronghold", Platform::Pc).await.unwrap();
        assert!(!candidates.is_empty());
    }
}
