//! Scan event logger
//!
//! Forwards `ScanEvent`s from the EventBus to tracing so a console run
//! leaves a progress trail in the log file.

use gamecat_common::ScanEvent;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

/// Log every event until the bus closes; returns the number of events logged
pub async fn log_events(mut rx: broadcast::Receiver<ScanEvent>) -> usize {
    let mut logged = 0;

    loop {
        match rx.recv().await {
            Ok(event) => {
                log_event(&event);
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event logger lagged behind the scan");
            }
            Err(RecvError::Closed) => break,
        }
    }

    debug!(logged, "Event logger stopped");
    logged
}

fn log_event(event: &ScanEvent) {
    match event {
        ScanEvent::BatchStarted { target_count, .. } => {
            info!(targets = target_count, "Batch started")
        }
        ScanEvent::TargetStarted { path, platform } => {
            debug!(path = %path.display(), platform = %platform, "Target started")
        }
        ScanEvent::TargetClassified {
            path,
            classification,
        } => debug!(path = %path.display(), classification = %classification, "Target classified"),
        ScanEvent::ProviderSearchStarted {
            provider,
            searched_name,
            excluded_names,
        } => debug!(
            provider = %provider,
            name = %searched_name,
            excluded = excluded_names.len(),
            "Provider search started"
        ),
        ScanEvent::CandidatesFound {
            provider,
            count,
            filter_reverted,
        } => info!(provider = %provider, count, filter_reverted, "Candidates found"),
        ScanEvent::ResolutionRequested {
            provider,
            candidate_names,
        } => debug!(provider = %provider, candidates = candidate_names.len(), "Waiting for user"),
        ScanEvent::TargetCompleted { path, outcome } => {
            debug!(path = %path.display(), outcome = %outcome, "Target completed")
        }
        ScanEvent::TargetFailed { path, message } => {
            warn!(path = %path.display(), error = %message, "Target failed")
        }
        ScanEvent::BatchCompleted { added, failed, .. } => {
            info!(added, failed, "Batch completed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamecat_common::EventBus;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_logs_until_bus_is_dropped() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();

        bus.emit_lossy(ScanEvent::TargetStarted {
            path: PathBuf::from("/games/Doom"),
            platform: "pc".to_string(),
        });
        bus.emit_lossy(ScanEvent::TargetFailed {
            path: PathBuf::from("/games/Doom"),
            message: "connection reset".to_string(),
        });
        drop(bus);

        assert_eq!(log_events(rx).await, 2);
    }

    #[tokio::test]
    async fn test_lagged_events_are_not_counted() {
        let bus = EventBus::new(2);
        let rx = bus.subscribe();

        for outcome in ["Added", "Skipped", "Excluded", "Stopped"] {
            bus.emit_lossy(ScanEvent::TargetCompleted {
                path: PathBuf::from("/games/Doom"),
                outcome: outcome.to_string(),
            });
        }
        drop(bus);

        // Capacity 2: the two oldest are overwritten
        assert_eq!(log_events(rx).await, 2);
    }
}
