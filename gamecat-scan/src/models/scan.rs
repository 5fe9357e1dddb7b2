//! Scan targets, classifications and terminal outcomes

use super::{LibraryRef, Platform};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One filesystem path being resolved to a library or a game record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanTarget {
    pub path: PathBuf,
    pub platform: Platform,
}

impl ScanTarget {
    pub fn new(path: impl Into<PathBuf>, platform: Platform) -> Self {
        Self {
            path: path.into(),
            platform,
        }
    }

    /// Final path component, as used for name normalization
    pub fn folder_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// What a path is, relative to the catalog and its own contents
///
/// Computed fresh for every scan attempt, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathClassification {
    /// Path is already a tracked game
    AlreadyGame,
    /// Path is already a tracked library
    AlreadyLibrary,
    /// Path was permanently excluded by the user
    Excluded,
    /// Only sub-directories inside: offer it as a library root
    LibraryCandidate {
        /// Immediate child directories, sorted by file name
        children: Vec<PathBuf>,
    },
    /// Anything else: resolve it as a game
    GameCandidate,
}

impl PathClassification {
    pub fn name(&self) -> &'static str {
        match self {
            PathClassification::AlreadyGame => "AlreadyGame",
            PathClassification::AlreadyLibrary => "AlreadyLibrary",
            PathClassification::Excluded => "Excluded",
            PathClassification::LibraryCandidate { .. } => "LibraryCandidate",
            PathClassification::GameCandidate => "GameCandidate",
        }
    }
}

/// Terminal outcome of one scan target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Game created and attached to the given library
    Added(LibraryRef),
    /// Path was already a tracked game or library
    AlreadyTracked,
    /// User or policy skipped the path
    Skipped,
    /// Path is (now) permanently excluded
    Excluded,
    /// Path was registered as a new library
    LibraryCreated(LibraryRef),
    /// Scan was stopped before this target concluded
    Stopped,
}

impl PipelineOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineOutcome::Added(_) => "Added",
            PipelineOutcome::AlreadyTracked => "AlreadyTracked",
            PipelineOutcome::Skipped => "Skipped",
            PipelineOutcome::Excluded => "Excluded",
            PipelineOutcome::LibraryCreated(_) => "LibraryCreated",
            PipelineOutcome::Stopped => "Stopped",
        }
    }
}
