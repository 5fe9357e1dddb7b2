//! Test Helper Utilities
//!
//! Shared utilities for testing gamecat-scan

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

// Re-export commonly used items
pub use fakes::{Answer, ScriptedProvider, ScriptedResolver};
pub use fixtures::{candidate, collect_events, game_dir, library_root, record, Harness};
