//! Catalog (persistence) collaborator
//!
//! The scan core only needs membership checks, library/game creation and
//! exclusion recording. Two implementations ship with the crate:
//! - [`MemoryCatalog`]: in-process maps, used by tests and `--dry-run`
//! - [`SqliteCatalog`]: sqlx-backed SQLite store used by the CLI

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCatalog;
pub use sqlite::SqliteCatalog;

use crate::models::{GameRef, LibraryDef, LibraryRef, UnifiedRecord};
use async_trait::async_trait;
use gamecat_common::Result;
use std::path::Path;

/// Persistence operations consumed by the scan pipeline
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn is_known_game(&self, path: &Path) -> Result<bool>;

    async fn is_known_library(&self, path: &Path) -> Result<bool>;

    /// Path was permanently excluded from scanning
    async fn is_excluded(&self, path: &Path) -> Result<bool>;

    /// Closest tracked library whose path is an ancestor of `path`
    async fn owning_library(&self, path: &Path) -> Result<Option<LibraryRef>>;

    /// Definition of a tracked library
    async fn library(&self, library: LibraryRef) -> Result<Option<LibraryDef>>;

    async fn create_library(&self, def: &LibraryDef) -> Result<LibraryRef>;

    async fn create_game(
        &self,
        record: &UnifiedRecord,
        path: &Path,
        library: LibraryRef,
    ) -> Result<GameRef>;

    /// Never scan `path` again
    async fn record_exclusion(&self, path: &Path) -> Result<()>;
}

/// Pick the deepest library path that is an ancestor of, or equal to, `path`
pub(crate) fn closest_ancestor<'a, I>(path: &Path, libraries: I) -> Option<LibraryRef>
where
    I: IntoIterator<Item = (&'a Path, LibraryRef)>,
{
    libraries
        .into_iter()
        .filter(|(library_path, _)| path.starts_with(library_path))
        .max_by_key(|(library_path, _)| library_path.components().count())
        .map(|(_, library)| library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_closest_ancestor_prefers_deepest() {
        let outer = LibraryRef(Uuid::new_v4());
        let inner = LibraryRef(Uuid::new_v4());
        let outer_path = PathBuf::from("/games");
        let inner_path = PathBuf::from("/games/ps2");

        let found = closest_ancestor(
            Path::new("/games/ps2/Okami"),
            vec![(outer_path.as_path(), outer), (inner_path.as_path(), inner)],
        );
        assert_eq!(found, Some(inner));
    }

    #[test]
    fn test_closest_ancestor_ignores_string_prefix_siblings() {
        let library = LibraryRef(Uuid::new_v4());
        let library_path = PathBuf::from("/games/pc");

        let found = closest_ancestor(
            Path::new("/games/pc-old/Doom"),
            vec![(library_path.as_path(), library)],
        );
        assert_eq!(found, None);
    }
}
