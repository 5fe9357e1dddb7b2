//! Scan services: pure building blocks used by the pipeline

pub mod exclusion_ledger;
pub mod name_normalizer;
pub mod path_classifier;
pub mod reconciliation;

pub use exclusion_ledger::{ExclusionLedger, FilteredCandidates, SearchContext};
pub use name_normalizer::normalize_name;
pub use path_classifier::{classify_path, list_directory, DirectoryListing};
pub use reconciliation::reconcile;
