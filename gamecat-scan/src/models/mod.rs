//! Data models for gamecat-scan

pub mod library;
pub mod metadata;
pub mod platform;
pub mod scan;

pub use library::{GameRef, LibraryDef, LibraryRef};
pub use metadata::{CandidateSummary, ProviderRecord, ProviderRef, UnifiedRecord};
pub use platform::Platform;
pub use scan::{PathClassification, PipelineOutcome, ScanTarget};
