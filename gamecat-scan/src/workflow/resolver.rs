//! Interactive resolution
//!
//! The scan worker never talks to a user directly. Whenever a decision is
//! needed it calls an [`InteractiveResolver`] and suspends until the answer
//! arrives. [`ChannelResolver`] implements that as a cross-task rendezvous:
//! the request travels over an mpsc channel to the front end together with
//! a oneshot reply slot.

use crate::models::{CandidateSummary, LibraryDef, Platform};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Answer to a disambiguation prompt
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverChoice {
    /// Use this candidate (must be one of the offered candidates)
    Select(CandidateSummary),
    /// Search again under another name
    RetryWithName(String),
    /// Leave the path for now
    Skip,
    /// Never scan the path again
    Exclude,
    /// Continue without data from this (optional) provider
    ProceedWithout,
}

/// Everything a front end needs to present one ambiguity
#[derive(Debug, Clone, PartialEq)]
pub struct DisambiguationPrompt {
    pub provider: String,
    pub searched_name: String,
    pub path: PathBuf,
    pub platform: Platform,
    /// May be empty (no results)
    pub candidates: Vec<CandidateSummary>,
    /// "Proceed without" is offered for optional providers only
    pub can_proceed_without: bool,
}

/// Resolver failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolverError {
    /// Nobody is left to answer (channel closed or reply dropped)
    #[error("Interactive front end is gone")]
    FrontendGone,

    /// A second request was issued while one is still pending
    #[error("A resolver request is already outstanding")]
    AlreadyPending,
}

/// Source of user decisions
#[async_trait]
pub trait InteractiveResolver: Send + Sync {
    /// Offer to register `path` as a library; `None` declines
    async fn choose_library_creation(
        &self,
        path: &Path,
        children: &[PathBuf],
        default_platform: Platform,
    ) -> Result<Option<LibraryDef>, ResolverError>;

    /// Ask the user to resolve an ambiguous (or empty) search result
    async fn resolve_ambiguity(
        &self,
        prompt: DisambiguationPrompt,
    ) -> Result<ResolverChoice, ResolverError>;
}

/// Request delivered to the front end
#[derive(Debug)]
pub enum ResolverRequest {
    CreateLibrary {
        path: PathBuf,
        children: Vec<PathBuf>,
        default_platform: Platform,
        reply: oneshot::Sender<Option<LibraryDef>>,
    },
    Disambiguate {
        prompt: DisambiguationPrompt,
        reply: oneshot::Sender<ResolverChoice>,
    },
}

/// Clears the outstanding flag when the request finishes or is abandoned
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Resolver backed by a request channel to a front end task
pub struct ChannelResolver {
    tx: mpsc::Sender<ResolverRequest>,
    pending: AtomicBool,
}

impl ChannelResolver {
    /// Create the resolver and the receiving end for the front end
    pub fn new() -> (Self, mpsc::Receiver<ResolverRequest>) {
        // At most one request is ever outstanding
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                tx,
                pending: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// True while a request awaits its answer
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    async fn ask<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> ResolverRequest,
    ) -> Result<T, ResolverError> {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ResolverError::AlreadyPending);
        }
        let _guard = PendingGuard(&self.pending);

        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| ResolverError::FrontendGone)?;

        debug!("Waiting for front end answer");
        reply_rx.await.map_err(|_| ResolverError::FrontendGone)
    }
}

#[async_trait]
impl InteractiveResolver for ChannelResolver {
    async fn choose_library_creation(
        &self,
        path: &Path,
        children: &[PathBuf],
        default_platform: Platform,
    ) -> Result<Option<LibraryDef>, ResolverError> {
        self.ask(|reply| ResolverRequest::CreateLibrary {
            path: path.to_path_buf(),
            children: children.to_vec(),
            default_platform,
            reply,
        })
        .await
    }

    async fn resolve_ambiguity(
        &self,
        prompt: DisambiguationPrompt,
    ) -> Result<ResolverChoice, ResolverError> {
        self.ask(|reply| ResolverRequest::Disambiguate { prompt, reply })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn prompt() -> DisambiguationPrompt {
        DisambiguationPrompt {
            provider: "RAWG".to_string(),
            searched_name: "Stronghold".to_string(),
            path: PathBuf::from("/games/Stronghold"),
            platform: Platform::Pc,
            candidates: Vec::new(),
            can_proceed_without: false,
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (resolver, mut rx) = ChannelResolver::new();

        let front_end = tokio::spawn(async move {
            match rx.recv().await {
                Some(ResolverRequest::Disambiguate { prompt, reply }) => {
                    assert_eq!(prompt.searched_name, "Stronghold");
                    reply.send(ResolverChoice::Skip).unwrap();
                }
                other => panic!("unexpected request: {:?}", other),
            }
        });

        let choice = resolver.resolve_ambiguity(prompt()).await.unwrap();
        assert_eq!(choice, ResolverChoice::Skip);
        assert!(!resolver.is_pending());
        front_end.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_channel_is_frontend_gone() {
        let (resolver, rx) = ChannelResolver::new();
        drop(rx);

        let result = resolver.resolve_ambiguity(prompt()).await;
        assert_eq!(result, Err(ResolverError::FrontendGone));
        assert!(!resolver.is_pending());
    }

    #[tokio::test]
    async fn test_dropped_reply_is_frontend_gone() {
        let (resolver, mut rx) = ChannelResolver::new();

        tokio::spawn(async move {
            // Receive and drop the request without answering
            let _ = rx.recv().await;
        });

        let result = resolver
            .choose_library_creation(Path::new("/games"), &[], Platform::Pc)
            .await;
        assert_eq!(result, Err(ResolverError::FrontendGone));
    }

    #[tokio::test]
    async fn test_second_concurrent_request_rejected() {
        let (resolver, mut rx) = ChannelResolver::new();
        let resolver = Arc::new(resolver);

        let first = {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve_ambiguity(prompt()).await })
        };

        // Wait until the first request reached the front end
        let request = rx.recv().await.unwrap();
        assert!(resolver.is_pending());

        let second = resolver.resolve_ambiguity(prompt()).await;
        assert_eq!(second, Err(ResolverError::AlreadyPending));

        if let ResolverRequest::Disambiguate { reply, .. } = request {
            reply.send(ResolverChoice::Exclude).unwrap();
        }
        assert_eq!(first.await.unwrap(), Ok(ResolverChoice::Exclude));
    }
}
