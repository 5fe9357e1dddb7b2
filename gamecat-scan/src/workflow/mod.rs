//! Scan workflow
//!
//! Resolves scan targets into catalog entries:
//! - [`pipeline`]: per-target stage orchestration
//! - [`disambiguation`]: per-provider search and user decision loop
//! - [`resolver`]: the interactive decision seam and its channel implementation
//! - [`worker`]: background batch processing with cooperative stop
//! - [`event_log`]: scan events forwarded to tracing

pub mod disambiguation;
pub mod event_log;
pub mod pipeline;
pub mod resolver;
pub mod worker;

pub use disambiguation::{Disambiguator, Resolution};
pub use event_log::log_events;
pub use pipeline::{ScanPipeline, ScanServices};
pub use resolver::{
    ChannelResolver, DisambiguationPrompt, InteractiveResolver, ResolverChoice, ResolverError,
    ResolverRequest,
};
pub use worker::{run_batch, BatchReport, ScanStatistics, ScanWorker, TargetReport, WorkerOptions};
