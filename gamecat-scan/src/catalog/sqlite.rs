//! SQLite catalog
//!
//! Small sqlx-backed store for libraries, games and path exclusions.
//! UUIDs and paths are stored as text; genres as a JSON array.

use super::{closest_ancestor, Catalog};
use crate::models::{GameRef, LibraryDef, LibraryRef, Platform, UnifiedRecord};
use async_trait::async_trait;
use gamecat_common::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Catalog stored in a SQLite database
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::Internal(format!("Invalid UUID '{}': {}", value, e)))
}

impl SqliteCatalog {
    /// Open (or create) the catalog database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // mode=rwc: read, write, create
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        tracing::debug!("Connecting to database: {}", db_url);

        let pool = SqlitePool::connect(&db_url).await?;
        Self::from_pool(pool).await
    }

    /// Private in-memory database (single connection so every query sees the same data)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating tables if needed
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        init_tables(&pool).await?;
        Ok(Self { pool })
    }

    /// Number of tracked games, reported after a batch
    pub async fn game_count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM games")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn exists(&self, sql: &str, path: &Path) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(path_key(path))
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}

/// Create catalog tables if they don't exist
async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS libraries (
            guid TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            platform TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS games (
            guid TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            library_guid TEXT NOT NULL REFERENCES libraries(guid),
            name TEXT NOT NULL,
            description TEXT,
            release_date TEXT,
            critic_score REAL,
            user_score REAL,
            genres TEXT NOT NULL DEFAULT '[]',
            thumbnail TEXT,
            poster TEXT,
            primary_url TEXT NOT NULL,
            secondary_url TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exclusions (
            path TEXT PRIMARY KEY,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("Catalog tables initialized (libraries, games, exclusions)");

    Ok(())
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn is_known_game(&self, path: &Path) -> Result<bool> {
        self.exists("SELECT COUNT(*) FROM games WHERE path = ?", path).await
    }

    async fn is_known_library(&self, path: &Path) -> Result<bool> {
        self.exists("SELECT COUNT(*) FROM libraries WHERE path = ?", path).await
    }

    async fn is_excluded(&self, path: &Path) -> Result<bool> {
        self.exists("SELECT COUNT(*) FROM exclusions WHERE path = ?", path).await
    }

    async fn owning_library(&self, path: &Path) -> Result<Option<LibraryRef>> {
        let rows = sqlx::query("SELECT guid, path FROM libraries")
            .fetch_all(&self.pool)
            .await?;

        let mut libraries = Vec::with_capacity(rows.len());
        for row in rows {
            let guid: String = row.get("guid");
            let library_path: String = row.get("path");
            libraries.push((PathBuf::from(library_path), LibraryRef(parse_uuid(&guid)?)));
        }

        Ok(closest_ancestor(
            path,
            libraries.iter().map(|(p, r)| (p.as_path(), *r)),
        ))
    }

    async fn library(&self, library: LibraryRef) -> Result<Option<LibraryDef>> {
        let row = sqlx::query("SELECT path, name, platform FROM libraries WHERE guid = ?")
            .bind(library.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let path: String = row.get("path");
        let name: String = row.get("name");
        let platform: String = row.get("platform");
        let platform = platform
            .parse::<Platform>()
            .map_err(Error::Internal)?;

        Ok(Some(LibraryDef {
            path: PathBuf::from(path),
            name,
            platform,
        }))
    }

    async fn create_library(&self, def: &LibraryDef) -> Result<LibraryRef> {
        let library = LibraryRef(Uuid::new_v4());

        sqlx::query(
            "INSERT INTO libraries (guid, path, name, platform, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(library.0.to_string())
        .bind(path_key(&def.path))
        .bind(&def.name)
        .bind(def.platform.slug())
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(library = %library, path = %def.path.display(), "Library created");
        Ok(library)
    }

    async fn create_game(
        &self,
        record: &UnifiedRecord,
        path: &Path,
        library: LibraryRef,
    ) -> Result<GameRef> {
        let game = GameRef(Uuid::new_v4());
        let genres = serde_json::to_string(&record.genres)
            .map_err(|e| Error::Internal(format!("Serialize genres failed: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO games (
                guid, path, library_guid, name, description, release_date,
                critic_score, user_score, genres, thumbnail, poster,
                primary_url, secondary_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(game.0.to_string())
        .bind(path_key(path))
        .bind(library.0.to_string())
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.release_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(record.critic_score.map(f64::from))
        .bind(record.user_score.map(f64::from))
        .bind(genres)
        .bind(&record.thumbnail)
        .bind(&record.poster)
        .bind(&record.primary_url)
        .bind(&record.secondary_url)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(game = %game, name = %record.name, "Game created");
        Ok(game)
    }

    async fn record_exclusion(&self, path: &Path) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO exclusions (path, created_at) VALUES (?, ?)")
            .bind(path_key(path))
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> UnifiedRecord {
        UnifiedRecord {
            name: "Stronghold".to_string(),
            description: Some("Castle sim".to_string()),
            release_date: NaiveDate::from_ymd_opt(2001, 10, 21),
            critic_score: Some(81.0),
            user_score: Some(4.1),
            genres: vec!["Strategy".to_string(), "Simulation".to_string()],
            thumbnail: Some("https://img.example/thumb.jpg".to_string()),
            poster: None,
            primary_url: "https://rawg.io/games/stronghold".to_string(),
            secondary_url: Some("https://store.steampowered.com/app/40950".to_string()),
        }
    }

    #[tokio::test]
    async fn test_library_round_trip() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let def = LibraryDef::for_folder(Path::new("/games/ps2"), Platform::PlayStation2);

        let library = catalog.create_library(&def).await.unwrap();

        assert!(catalog.is_known_library(Path::new("/games/ps2")).await.unwrap());
        assert_eq!(catalog.library(library).await.unwrap(), Some(def));
        assert_eq!(
            catalog.owning_library(Path::new("/games/ps2/Okami")).await.unwrap(),
            Some(library)
        );
    }

    #[tokio::test]
    async fn test_game_creation_is_visible() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let library = catalog
            .create_library(&LibraryDef::for_folder(Path::new("/games"), Platform::Pc))
            .await
            .unwrap();

        let path = Path::new("/games/Stronghold [2001]");
        catalog.create_game(&record(), path, library).await.unwrap();

        assert!(catalog.is_known_game(path).await.unwrap());
        assert_eq!(catalog.game_count().await.unwrap(), 1);

        let genres: String = sqlx::query_scalar("SELECT genres FROM games")
            .fetch_one(&catalog.pool)
            .await
            .unwrap();
        assert_eq!(genres, "[\"Strategy\",\"Simulation\"]");
    }

    #[tokio::test]
    async fn test_exclusion_is_idempotent() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let path = Path::new("/games/Demo Disc");

        catalog.record_exclusion(path).await.unwrap();
        catalog.record_exclusion(path).await.unwrap();

        assert!(catalog.is_excluded(path).await.unwrap());
        assert!(!catalog.is_excluded(Path::new("/games/Other")).await.unwrap());
    }
}
