//! gamecat-scan library interface
//!
//! Scans folders of games, resolves each unknown game folder against
//! external metadata providers (with user disambiguation where needed),
//! and records the result in the catalog.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod workflow;

pub use crate::error::{ScanError, ScanResult};
pub use crate::workflow::{ScanPipeline, ScanServices, ScanWorker, WorkerOptions};
