//! Field-wise reconciliation of primary and secondary provider records
//!
//! Each field is decided on its own; nothing is blended or unioned.
//! The unified name always comes from the primary record. Posters only
//! come from the secondary provider; otherwise the chosen thumbnail is used.

use crate::models::{ProviderRecord, UnifiedRecord};

/// Merge a primary record with an optional secondary record
pub fn reconcile(primary: ProviderRecord, secondary: Option<ProviderRecord>) -> UnifiedRecord {
    let Some(secondary) = secondary else {
        let poster = primary.thumbnail.clone();
        return UnifiedRecord {
            name: primary.name,
            description: primary.description,
            release_date: primary.release_date,
            critic_score: primary.critic_score,
            user_score: primary.user_score,
            genres: primary.genres,
            thumbnail: primary.thumbnail,
            poster,
            primary_url: primary.detail_url,
            secondary_url: None,
        };
    };

    let thumbnail = secondary.thumbnail.or(primary.thumbnail);
    // Poster falls back to the chosen thumbnail, not to the primary poster
    let poster = secondary.poster.or_else(|| thumbnail.clone());

    let genres = if secondary.genres.is_empty() {
        primary.genres
    } else {
        secondary.genres
    };

    UnifiedRecord {
        name: primary.name,
        description: secondary.description.or(primary.description),
        release_date: primary.release_date.or(secondary.release_date),
        critic_score: primary.critic_score,
        user_score: primary.user_score,
        genres,
        thumbnail,
        poster,
        primary_url: primary.detail_url,
        secondary_url: Some(secondary.detail_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn primary() -> ProviderRecord {
        ProviderRecord {
            name: "Stronghold".to_string(),
            description: Some("Primary description".to_string()),
            release_date: NaiveDate::from_ymd_opt(2001, 10, 21),
            critic_score: Some(81.0),
            user_score: Some(3.9),
            genres: vec!["Strategy".to_string()],
            thumbnail: Some("primary-thumb".to_string()),
            poster: Some("primary-poster".to_string()),
            detail_url: "https://rawg.io/games/stronghold".to_string(),
        }
    }

    fn secondary() -> ProviderRecord {
        ProviderRecord {
            name: "Stronghold HD".to_string(),
            description: Some("Secondary description".to_string()),
            release_date: NaiveDate::from_ymd_opt(2012, 5, 1),
            critic_score: Some(50.0),
            user_score: Some(1.0),
            genres: vec!["Simulation".to_string(), "Strategy".to_string()],
            thumbnail: Some("secondary-thumb".to_string()),
            poster: None,
            detail_url: "https://store.steampowered.com/app/40950".to_string(),
        }
    }

    #[test]
    fn test_primary_only() {
        let unified = reconcile(primary(), None);

        assert_eq!(unified.name, "Stronghold");
        assert_eq!(unified.description.as_deref(), Some("Primary description"));
        assert_eq!(unified.genres, vec!["Strategy".to_string()]);
        assert_eq!(unified.secondary_url, None);
    }

    #[test]
    fn test_poster_is_chosen_thumbnail_without_secondary_poster() {
        let unified = reconcile(primary(), None);
        assert_eq!(unified.poster.as_deref(), Some("primary-thumb"));

        let mut s = secondary();
        s.poster = Some("secondary-poster".to_string());
        let unified = reconcile(primary(), Some(s));
        assert_eq!(unified.poster.as_deref(), Some("secondary-poster"));
    }

    #[test]
    fn test_field_rules_with_secondary() {
        let unified = reconcile(primary(), Some(secondary()));

        assert_eq!(unified.name, "Stronghold");
        assert_eq!(unified.description.as_deref(), Some("Secondary description"));
        assert_eq!(unified.release_date, NaiveDate::from_ymd_opt(2001, 10, 21));
        assert_eq!(unified.critic_score, Some(81.0));
        assert_eq!(unified.user_score, Some(3.9));
        assert_eq!(unified.genres, vec!["Simulation".to_string(), "Strategy".to_string()]);
        assert_eq!(unified.thumbnail.as_deref(), Some("secondary-thumb"));
        // Secondary has no poster: use the chosen thumbnail
        assert_eq!(unified.poster.as_deref(), Some("secondary-thumb"));
        assert_eq!(unified.primary_url, "https://rawg.io/games/stronghold");
        assert_eq!(
            unified.secondary_url.as_deref(),
            Some("https://store.steampowered.com/app/40950")
        );
    }

    #[test]
    fn test_sparse_secondary_keeps_primary_values() {
        let sparse = ProviderRecord {
            name: "Other".to_string(),
            description: None,
            release_date: None,
            critic_score: None,
            user_score: None,
            genres: Vec::new(),
            thumbnail: None,
            poster: None,
            detail_url: "https://store.steampowered.com/app/1".to_string(),
        };
        let mut p = primary();
        p.release_date = None;

        let unified = reconcile(p, Some(sparse));

        assert_eq!(unified.description.as_deref(), Some("Primary description"));
        assert_eq!(unified.release_date, None);
        assert_eq!(unified.genres, vec!["Strategy".to_string()]);
        assert_eq!(unified.thumbnail.as_deref(), Some("primary-thumb"));
        assert_eq!(unified.poster.as_deref(), Some("primary-thumb"));
    }

    #[test]
    fn test_release_date_falls_back_to_secondary() {
        let mut p = primary();
        p.release_date = None;
        let unified = reconcile(p, Some(secondary()));
        assert_eq!(unified.release_date, NaiveDate::from_ymd_opt(2012, 5, 1));
    }
}
