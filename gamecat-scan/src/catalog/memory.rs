//! In-memory catalog

use super::{closest_ancestor, Catalog};
use crate::models::{GameRef, LibraryDef, LibraryRef, UnifiedRecord};
use async_trait::async_trait;
use gamecat_common::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Game stored by [`MemoryCatalog`]
#[derive(Debug, Clone)]
pub struct StoredGame {
    pub game: GameRef,
    pub path: PathBuf,
    pub library: LibraryRef,
    pub record: UnifiedRecord,
}

#[derive(Debug, Default)]
struct MemoryState {
    libraries: Vec<(LibraryRef, LibraryDef)>,
    games: Vec<StoredGame>,
    /// Game paths known without a full record (seeded state)
    known_game_paths: BTreeSet<PathBuf>,
    exclusions: BTreeSet<PathBuf>,
}

/// Catalog kept entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: Mutex<MemoryState>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path as an already-tracked game
    pub async fn seed_game_path(&self, path: impl Into<PathBuf>) {
        self.state.lock().await.known_game_paths.insert(path.into());
    }

    /// Mark a path as permanently excluded
    pub async fn seed_exclusion(&self, path: impl Into<PathBuf>) {
        self.state.lock().await.exclusions.insert(path.into());
    }

    pub async fn games(&self) -> Vec<StoredGame> {
        self.state.lock().await.games.clone()
    }

    pub async fn libraries(&self) -> Vec<(LibraryRef, LibraryDef)> {
        self.state.lock().await.libraries.clone()
    }

    pub async fn exclusions(&self) -> Vec<PathBuf> {
        self.state.lock().await.exclusions.iter().cloned().collect()
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn is_known_game(&self, path: &Path) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.known_game_paths.contains(path) || state.games.iter().any(|g| g.path == path))
    }

    async fn is_known_library(&self, path: &Path) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.libraries.iter().any(|(_, def)| def.path == path))
    }

    async fn is_excluded(&self, path: &Path) -> Result<bool> {
        Ok(self.state.lock().await.exclusions.contains(path))
    }

    async fn owning_library(&self, path: &Path) -> Result<Option<LibraryRef>> {
        let state = self.state.lock().await;
        Ok(closest_ancestor(
            path,
            state
                .libraries
                .iter()
                .map(|(library, def)| (def.path.as_path(), *library)),
        ))
    }

    async fn library(&self, library: LibraryRef) -> Result<Option<LibraryDef>> {
        let state = self.state.lock().await;
        Ok(state
            .libraries
            .iter()
            .find(|(r, _)| *r == library)
            .map(|(_, def)| def.clone()))
    }

    async fn create_library(&self, def: &LibraryDef) -> Result<LibraryRef> {
        let mut state = self.state.lock().await;
        if state.libraries.iter().any(|(_, d)| d.path == def.path) {
            return Err(Error::InvalidInput(format!(
                "Library already exists: {}",
                def.path.display()
            )));
        }
        let library = LibraryRef(Uuid::new_v4());
        state.libraries.push((library, def.clone()));
        Ok(library)
    }

    async fn create_game(
        &self,
        record: &UnifiedRecord,
        path: &Path,
        library: LibraryRef,
    ) -> Result<GameRef> {
        let mut state = self.state.lock().await;
        if !state.libraries.iter().any(|(r, _)| *r == library) {
            return Err(Error::NotFound(format!("Library {}", library)));
        }
        if state.games.iter().any(|g| g.path == path) {
            return Err(Error::InvalidInput(format!(
                "Game already exists: {}",
                path.display()
            )));
        }
        let game = GameRef(Uuid::new_v4());
        state.games.push(StoredGame {
            game,
            path: path.to_path_buf(),
            library,
            record: record.clone(),
        });
        Ok(game)
    }

    async fn record_exclusion(&self, path: &Path) -> Result<()> {
        self.state.lock().await.exclusions.insert(path.to_path_buf());
        Ok(())
    }
}
