//! Scan Pipeline
//!
//! Drives one scan target to a terminal outcome.
//!
//! # Stages
//! 0. **Stop check**: a stopped scan never starts a new target
//! 1. **Classify**: known, excluded, library candidate or game candidate
//! 2. **Library offer**: library candidates go to the resolver
//! 3. **Normalize**: folder name → search string
//! 4. **Primary round**: disambiguate against the primary provider
//! 5. **Secondary round**: optional, seeded with the primary record's name
//! 6. **Reconcile**: field-wise merge into one record
//! 7. **Persist**: attach the game to its closest tracked library
//!
//! # Error Handling
//! - Control signals (skip, exclude, stop) are outcomes, not errors
//! - Provider, filesystem and catalog errors fail the current target only
//! - Nothing is persisted once the stop signal is observed

use super::disambiguation::{Disambiguator, Resolution};
use super::resolver::{InteractiveResolver, ResolverError};
use crate::catalog::Catalog;
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::models::{PathClassification, PipelineOutcome, ProviderRecord, ScanTarget};
use crate::providers::MetadataProvider;
use crate::services::{classify_path, normalize_name, reconcile, SearchContext};
use gamecat_common::{EventBus, ScanEvent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Collaborators used by the pipeline
#[derive(Clone)]
pub struct ScanServices {
    pub catalog: Arc<dyn Catalog>,
    pub primary: Arc<dyn MetadataProvider>,
    pub secondary: Option<Arc<dyn MetadataProvider>>,
    pub resolver: Arc<dyn InteractiveResolver>,
    pub config: Arc<dyn ScanConfig>,
    pub events: EventBus,
    pub cancel: CancellationToken,
}

/// Outcome of one provider round, from the pipeline's point of view
enum Round {
    Record(Option<ProviderRecord>),
    Done(PipelineOutcome),
}

/// Scan pipeline orchestrator
pub struct ScanPipeline {
    services: ScanServices,
}

impl ScanPipeline {
    pub fn new(services: ScanServices) -> Self {
        Self { services }
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.services.catalog
    }

    pub fn events(&self) -> &EventBus {
        &self.services.events
    }

    /// Token observed by every stage; cancelling it stops the scan
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.services.cancel
    }

    /// Process one target, reporting completion or failure as events
    pub async fn process(&self, target: &ScanTarget) -> ScanResult<PipelineOutcome> {
        let result = self.run(target).await;

        match &result {
            Ok(outcome) => {
                info!(path = %target.path.display(), outcome = outcome.name(), "Target completed");
                self.services.events.emit_lossy(ScanEvent::TargetCompleted {
                    path: target.path.clone(),
                    outcome: outcome.name().to_string(),
                });
            }
            Err(e) => {
                match e {
                    ScanError::ContractViolation(_) => {
                        error!(path = %target.path.display(), error = %e, "Target failed")
                    }
                    _ => warn!(path = %target.path.display(), error = %e, "Target failed"),
                }
                self.services.events.emit_lossy(ScanEvent::TargetFailed {
                    path: target.path.clone(),
                    message: e.to_string(),
                });
            }
        }

        result
    }

    async fn run(&self, target: &ScanTarget) -> ScanResult<PipelineOutcome> {
        if self.services.cancel.is_cancelled() {
            return Ok(PipelineOutcome::Stopped);
        }

        self.services.events.emit_lossy(ScanEvent::TargetStarted {
            path: target.path.clone(),
            platform: target.platform.slug().to_string(),
        });

        let classification = classify_path(&target.path, self.services.catalog.as_ref()).await?;
        debug!(path = %target.path.display(), classification = classification.name(), "Classified");
        self.services.events.emit_lossy(ScanEvent::TargetClassified {
            path: target.path.clone(),
            classification: classification.name().to_string(),
        });

        match classification {
            PathClassification::AlreadyGame | PathClassification::AlreadyLibrary => {
                Ok(PipelineOutcome::AlreadyTracked)
            }
            PathClassification::Excluded => Ok(PipelineOutcome::Excluded),
            PathClassification::LibraryCandidate { children } => {
                self.offer_library(target, children).await
            }
            PathClassification::GameCandidate => self.scan_game(target).await,
        }
    }

    async fn offer_library(
        &self,
        target: &ScanTarget,
        children: Vec<PathBuf>,
    ) -> ScanResult<PipelineOutcome> {
        if self.services.cancel.is_cancelled() {
            return Ok(PipelineOutcome::Stopped);
        }

        let answer = tokio::select! {
            biased;
            _ = self.services.cancel.cancelled() => return Ok(PipelineOutcome::Stopped),
            answer = self.services.resolver.choose_library_creation(
                &target.path,
                &children,
                target.platform,
            ) => answer,
        };

        let def = match answer {
            Ok(Some(def)) => def,
            Ok(None) => {
                debug!(path = %target.path.display(), "Library creation declined");
                return Ok(PipelineOutcome::Skipped);
            }
            Err(ResolverError::FrontendGone) => return Ok(PipelineOutcome::Stopped),
            Err(e @ ResolverError::AlreadyPending) => {
                return Err(ScanError::contract_violation(e.to_string()))
            }
        };

        if def.path != target.path {
            return Err(ScanError::contract_violation(format!(
                "library definition for {} points at {}",
                target.path.display(),
                def.path.display()
            )));
        }

        if self.services.cancel.is_cancelled() {
            return Ok(PipelineOutcome::Stopped);
        }

        let library = self.services.catalog.create_library(&def).await?;
        Ok(PipelineOutcome::LibraryCreated(library))
    }

    async fn scan_game(&self, target: &ScanTarget) -> ScanResult<PipelineOutcome> {
        let folder_name = target.folder_name();
        let Some(name) = normalize_name(&folder_name) else {
            info!(path = %target.path.display(), "Nothing searchable in folder name, skipping");
            return Ok(PipelineOutcome::Skipped);
        };
        debug!(raw = %folder_name, normalized = %name, "Normalized folder name");

        let mut ctx = SearchContext::new(target.clone());

        let primary = match self
            .round(self.services.primary.as_ref(), &mut ctx, &name)
            .await?
        {
            Round::Record(Some(record)) => record,
            Round::Record(None) => {
                return Err(ScanError::contract_violation(
                    "primary provider resolved without data",
                ))
            }
            Round::Done(outcome) => return Ok(outcome),
        };

        let secondary = match &self.services.secondary {
            Some(provider) => {
                let seed = primary.name.clone();
                match self.round(provider.as_ref(), &mut ctx, &seed).await? {
                    Round::Record(record) => record,
                    Round::Done(outcome) => return Ok(outcome),
                }
            }
            None => None,
        };

        let unified = reconcile(primary, secondary);

        if self.services.cancel.is_cancelled() {
            return Ok(PipelineOutcome::Stopped);
        }

        let library = self
            .services
            .catalog
            .owning_library(&target.path)
            .await?
            .ok_or_else(|| ScanError::NoOwningLibrary(target.path.clone()))?;

        let game = self
            .services
            .catalog
            .create_game(&unified, &target.path, library)
            .await?;

        info!(
            path = %target.path.display(),
            name = %unified.name,
            game = %game,
            library = %library,
            "Game added"
        );
        Ok(PipelineOutcome::Added(library))
    }

    /// Run one provider round and map its resolution
    async fn round(
        &self,
        provider: &dyn MetadataProvider,
        ctx: &mut SearchContext,
        name: &str,
    ) -> ScanResult<Round> {
        let disambiguator = Disambiguator::new(
            provider,
            self.services.resolver.as_ref(),
            self.services.config.as_ref(),
            &self.services.events,
            &self.services.cancel,
        );

        let resolution = disambiguator.resolve(ctx, name).await?;
        debug!(
            provider = %provider.descriptor().name,
            resolution = resolution.name(),
            "Provider round finished"
        );

        match resolution {
            Resolution::Selected { record, .. } => Ok(Round::Record(Some(record))),
            Resolution::ProceedWithout => Ok(Round::Record(None)),
            Resolution::Skip => Ok(Round::Done(PipelineOutcome::Skipped)),
            Resolution::Stopped => Ok(Round::Done(PipelineOutcome::Stopped)),
            Resolution::Exclude => {
                self.services
                    .catalog
                    .record_exclusion(&ctx.target.path)
                    .await?;
                info!(path = %ctx.target.path.display(), "Path excluded");
                Ok(Round::Done(PipelineOutcome::Excluded))
            }
        }
    }
}
