//! Event types for the gamecat event system
//!
//! Provides the shared scan event definitions and the EventBus used to
//! observe a running scan (console front end, logging bridge, tests).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Scan progress events
///
/// Events are broadcast via EventBus and can be serialized for external
/// consumers. Emission is lossy: a scan never fails because nobody listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScanEvent {
    /// A batch of scan targets was handed to the worker
    BatchStarted {
        /// Number of targets queued initially
        target_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The worker picked up a target
    TargetStarted {
        path: PathBuf,
        /// Platform slug (e.g. "pc")
        platform: String,
    },

    /// The target was classified
    TargetClassified {
        path: PathBuf,
        /// Classification name (e.g. "GameCandidate")
        classification: String,
    },

    /// A provider search is about to run
    ///
    /// `excluded_names` is a snapshot of the attempt's exclusion ledger at
    /// the moment the search starts.
    ProviderSearchStarted {
        provider: String,
        searched_name: String,
        excluded_names: Vec<String>,
    },

    /// A provider search returned
    CandidatesFound {
        provider: String,
        /// Number of candidates offered after exclusion filtering
        count: usize,
        /// True when filtering removed every candidate and the unfiltered list was restored
        filter_reverted: bool,
    },

    /// The pipeline is waiting for an interactive decision
    ResolutionRequested {
        provider: String,
        candidate_names: Vec<String>,
    },

    /// A target reached a terminal outcome
    TargetCompleted {
        path: PathBuf,
        /// Outcome name (e.g. "Added", "Skipped")
        outcome: String,
    },

    /// A target failed with a fatal error
    TargetFailed { path: PathBuf, message: String },

    /// The worker drained its queue (or was stopped)
    BatchCompleted {
        added: usize,
        already_tracked: usize,
        skipped: usize,
        excluded: usize,
        libraries_created: usize,
        stopped: usize,
        failed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Central event distribution bus
///
/// Wraps a tokio broadcast channel:
/// - Non-blocking publish (slow subscribers don't block the scan worker)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use gamecat_common::events::{EventBus, ScanEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(ScanEvent::TargetFailed {
///     path: "/games/Broken".into(),
///     message: "permission denied".to_string(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(ScanEvent::TargetFailed { .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScanEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ScanEvent,
    ) -> Result<usize, broadcast::error::SendError<ScanEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ScanEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_without_subscribers_is_error() {
        let bus = EventBus::new(10);
        let result = bus.emit(ScanEvent::TargetStarted {
            path: PathBuf::from("/games/Foo"),
            platform: "pc".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_emit_reaches_every_subscriber() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let delivered = bus
            .emit(ScanEvent::TargetCompleted {
                path: PathBuf::from("/games/Foo"),
                outcome: "Skipped".to_string(),
            })
            .unwrap();
        assert_eq!(delivered, 2);

        assert!(matches!(rx1.try_recv(), Ok(ScanEvent::TargetCompleted { .. })));
        assert!(matches!(rx2.try_recv(), Ok(ScanEvent::TargetCompleted { .. })));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ScanEvent::CandidatesFound {
            provider: "RAWG".to_string(),
            count: 3,
            filter_reverted: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CandidatesFound");
        assert_eq!(json["count"], 3);
    }
}
