//! # gamecat Common Library
//!
//! Shared code for the gamecat crates:
//! - Configuration loading and root folder resolution
//! - Common error type
//! - Scan event types and the EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
pub use events::{EventBus, ScanEvent};
