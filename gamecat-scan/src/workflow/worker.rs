//! Background scan worker
//!
//! Runs a batch of scan targets on one tokio task, strictly one target at a
//! time, while the front end stays free to answer resolver requests.
//! Per-target failures are recorded and the batch moves on.

use super::pipeline::ScanPipeline;
use crate::error::ScanResult;
use crate::models::{LibraryRef, PipelineOutcome, ScanTarget};
use crate::services::list_directory;
use gamecat_common::{Error, Result, ScanEvent};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Batch behavior
#[derive(Debug, Clone, Copy)]
pub struct WorkerOptions {
    /// Queue the children of a freshly created library
    pub descend_into_new_libraries: bool,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            descend_into_new_libraries: true,
        }
    }
}

/// Per-outcome counters for a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    pub added: usize,
    pub already_tracked: usize,
    pub skipped: usize,
    pub excluded: usize,
    pub libraries_created: usize,
    pub stopped: usize,
    pub failed: usize,
}

impl ScanStatistics {
    pub fn record(&mut self, result: &ScanResult<PipelineOutcome>) {
        match result {
            Ok(PipelineOutcome::Added(_)) => self.added += 1,
            Ok(PipelineOutcome::AlreadyTracked) => self.already_tracked += 1,
            Ok(PipelineOutcome::Skipped) => self.skipped += 1,
            Ok(PipelineOutcome::Excluded) => self.excluded += 1,
            Ok(PipelineOutcome::LibraryCreated(_)) => self.libraries_created += 1,
            Ok(PipelineOutcome::Stopped) => self.stopped += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.added
            + self.already_tracked
            + self.skipped
            + self.excluded
            + self.libraries_created
            + self.stopped
            + self.failed
    }

    fn to_event(&self) -> ScanEvent {
        ScanEvent::BatchCompleted {
            added: self.added,
            already_tracked: self.already_tracked,
            skipped: self.skipped,
            excluded: self.excluded,
            libraries_created: self.libraries_created,
            stopped: self.stopped,
            failed: self.failed,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Result of one target within a batch
#[derive(Debug)]
pub struct TargetReport {
    pub target: ScanTarget,
    pub result: ScanResult<PipelineOutcome>,
}

/// Everything a finished batch produced, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<TargetReport>,
    pub statistics: ScanStatistics,
}

impl BatchReport {
    fn push(&mut self, target: ScanTarget, result: ScanResult<PipelineOutcome>) {
        self.statistics.record(&result);
        self.results.push(TargetReport { target, result });
    }

    pub fn has_failures(&self) -> bool {
        self.statistics.failed > 0
    }
}

/// Handle to a running batch
pub struct ScanWorker {
    handle: JoinHandle<BatchReport>,
    cancel: CancellationToken,
}

impl ScanWorker {
    /// Start processing `targets` in order on a background task
    pub fn spawn(
        pipeline: Arc<ScanPipeline>,
        targets: Vec<ScanTarget>,
        options: WorkerOptions,
    ) -> Self {
        let cancel = pipeline.cancel_token().clone();
        let handle = tokio::spawn(run_batch(pipeline, targets, options));
        Self { handle, cancel }
    }

    /// Request a cooperative stop
    ///
    /// The current target unwinds at its next checkpoint (immediately if it
    /// is waiting on the resolver); queued targets are reported as stopped.
    pub fn stop(&self) {
        info!("Scan stop requested");
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the batch to finish
    pub async fn join(self) -> Result<BatchReport> {
        self.handle
            .await
            .map_err(|e| Error::Internal(format!("Scan worker task failed: {}", e)))
    }
}

/// Process a batch on the current task
pub async fn run_batch(
    pipeline: Arc<ScanPipeline>,
    targets: Vec<ScanTarget>,
    options: WorkerOptions,
) -> BatchReport {
    let cancel = pipeline.cancel_token().clone();
    let mut queue: VecDeque<ScanTarget> = targets.into();
    let mut report = BatchReport::default();

    info!(targets = queue.len(), "Scan batch started");
    pipeline.events().emit_lossy(ScanEvent::BatchStarted {
        target_count: queue.len(),
        timestamp: chrono::Utc::now(),
    });

    while let Some(target) = queue.pop_front() {
        if cancel.is_cancelled() {
            debug!(path = %target.path.display(), "Not processed (scan stopped)");
            report.push(target, Ok(PipelineOutcome::Stopped));
            continue;
        }

        let result = pipeline.process(&target).await;

        if let Ok(PipelineOutcome::LibraryCreated(library)) = &result {
            if options.descend_into_new_libraries {
                let children = library_children(&pipeline, *library, &target).await;
                debug!(path = %target.path.display(), count = children.len(), "Queueing library children");
                queue.extend(children);
            }
        }

        report.push(target, result);
    }

    let stats = &report.statistics;
    info!(
        added = stats.added,
        already_tracked = stats.already_tracked,
        skipped = stats.skipped,
        excluded = stats.excluded,
        libraries_created = stats.libraries_created,
        stopped = stats.stopped,
        failed = stats.failed,
        "Scan batch completed"
    );
    pipeline.events().emit_lossy(stats.to_event());

    report
}

/// Child directories of a new library as targets on the library's platform
async fn library_children(
    pipeline: &ScanPipeline,
    library: LibraryRef,
    target: &ScanTarget,
) -> Vec<ScanTarget> {
    let platform = match pipeline.catalog().library(library).await {
        Ok(Some(def)) => def.platform,
        Ok(None) => target.platform,
        Err(e) => {
            warn!(library = %library, error = %e, "Library lookup failed, using target platform");
            target.platform
        }
    };

    match list_children(&target.path).await {
        Ok(children) => children
            .into_iter()
            .map(|path| ScanTarget::new(path, platform))
            .collect(),
        Err(e) => {
            warn!(path = %target.path.display(), error = %e, "Could not list new library");
            Vec::new()
        }
    }
}

async fn list_children(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || list_directory(&owned))
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
        .map(|listing| listing.subdirectories)
}
