//! Error types for gamecat-scan
//!
//! Control signals (skip, exclude, stop, proceed-without) are not errors;
//! they travel as `Resolution` / `PipelineOutcome` variants. Everything
//! here is fatal for the one scan target it occurred on.

use crate::providers::ProviderError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal per-target scan error
#[derive(Debug, Error)]
pub enum ScanError {
    /// Metadata provider request failed (network, HTTP status, malformed response)
    #[error("{provider} error: {source}")]
    Provider {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// Directory enumeration failed during classification
    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog (persistence) operation failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] gamecat_common::Error),

    /// Resolved game has no tracked library above it
    #[error("No tracked library contains {0}")]
    NoOwningLibrary(PathBuf),

    /// A collaborator broke its contract (programming error)
    #[error("Contract violation: {0}")]
    ContractViolation(String),
}

impl ScanError {
    pub fn provider(provider: &str, source: ProviderError) -> Self {
        ScanError::Provider {
            provider: provider.to_string(),
            source,
        }
    }

    /// Build a contract violation, logging it at error level
    pub fn contract_violation(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!(violation = %message, "Collaborator contract violated");
        ScanError::ContractViolation(message)
    }
}

/// Result type for pipeline stages
pub type ScanResult<T> = Result<T, ScanError>;
