//! Provider-side metadata: search candidates, fetched records, unified records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque provider-specific locator for a candidate (RAWG id, Steam app id, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderRef(pub String);

impl fmt::Display for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One search hit, as offered for disambiguation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub provider_ref: ProviderRef,
    pub name: String,
    pub release_date: Option<NaiveDate>,
    /// Provider ranking/score, if the search endpoint reports one
    pub score: Option<f32>,
}

/// Full record fetched from one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub name: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Critic score (0-100)
    pub critic_score: Option<f32>,
    /// User score (provider scale)
    pub user_score: Option<f32>,
    pub genres: Vec<String>,
    pub thumbnail: Option<String>,
    pub poster: Option<String>,
    pub detail_url: String,
}

/// Reconciled record handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    /// Always the primary provider's name
    pub name: String,
    pub description: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub critic_score: Option<f32>,
    pub user_score: Option<f32>,
    pub genres: Vec<String>,
    pub thumbnail: Option<String>,
    pub poster: Option<String>,
    pub primary_url: String,
    pub secondary_url: Option<String>,
}
