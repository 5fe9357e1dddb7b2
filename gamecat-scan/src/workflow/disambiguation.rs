//! Per-provider disambiguation
//!
//! Drives one provider round for one scan attempt:
//! search → filter against the exclusion ledger → auto-resolve a single
//! hit, auto-skip when configured, or suspend on the interactive resolver.
//! Retries loop back to the search with the user-supplied name.
//!
//! The stop signal is checked before every search, before prompting, and
//! raced against the pending resolver answer.

use super::resolver::{DisambiguationPrompt, InteractiveResolver, ResolverChoice, ResolverError};
use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::models::{CandidateSummary, ProviderRecord};
use crate::providers::{MetadataProvider, ProviderDescriptor};
use crate::services::SearchContext;
use gamecat_common::{EventBus, ScanEvent};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Terminal result of one provider round
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Selected {
        candidate: CandidateSummary,
        record: ProviderRecord,
    },
    Skip,
    Exclude,
    ProceedWithout,
    Stopped,
}

impl Resolution {
    pub fn name(&self) -> &'static str {
        match self {
            Resolution::Selected { .. } => "Selected",
            Resolution::Skip => "Skip",
            Resolution::Exclude => "Exclude",
            Resolution::ProceedWithout => "ProceedWithout",
            Resolution::Stopped => "Stopped",
        }
    }
}

/// One provider's disambiguation state machine
pub struct Disambiguator<'a> {
    provider: &'a dyn MetadataProvider,
    resolver: &'a dyn InteractiveResolver,
    config: &'a dyn ScanConfig,
    events: &'a EventBus,
    cancel: &'a CancellationToken,
    descriptor: ProviderDescriptor,
}

impl<'a> Disambiguator<'a> {
    pub fn new(
        provider: &'a dyn MetadataProvider,
        resolver: &'a dyn InteractiveResolver,
        config: &'a dyn ScanConfig,
        events: &'a EventBus,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            descriptor: provider.descriptor(),
            provider,
            resolver,
            config,
            events,
            cancel,
        }
    }

    /// Resolve `name` against the provider
    ///
    /// The context's ledger grows with every candidate the user passes over;
    /// it is shared with later provider rounds of the same attempt.
    pub async fn resolve(&self, ctx: &mut SearchContext, name: &str) -> ScanResult<Resolution> {
        let provider = self.descriptor.name.as_str();
        let mut query = name.trim().to_string();

        loop {
            if self.cancel.is_cancelled() {
                return Ok(Resolution::Stopped);
            }

            self.events.emit_lossy(ScanEvent::ProviderSearchStarted {
                provider: provider.to_string(),
                searched_name: query.clone(),
                excluded_names: ctx.excluded_names.names(),
            });
            debug!(provider = %provider, name = %query, "Provider search");

            let found = self
                .provider
                .search(&query, ctx.target.platform)
                .await
                .map_err(|e| {
                    warn!(provider = %provider, name = %query, error = %e, "Provider search failed");
                    ScanError::provider(provider, e)
                })?;

            let filtered = ctx.excluded_names.filter(found);
            if filtered.reverted {
                debug!(provider = %provider, "All candidates previously rejected; showing them again");
            }
            self.events.emit_lossy(ScanEvent::CandidatesFound {
                provider: provider.to_string(),
                count: filtered.candidates.len(),
                filter_reverted: filtered.reverted,
            });

            let candidates = filtered.candidates;

            if let [single] = candidates.as_slice() {
                debug!(provider = %provider, candidate = %single.name, "Single candidate, resolved without prompt");
                return self.select(single.clone()).await;
            }

            if candidates.len() > 1 && self.config.is_auto_skip_enabled() {
                info!(
                    provider = %provider,
                    name = %query,
                    count = candidates.len(),
                    "Ambiguous result skipped (auto-skip enabled)"
                );
                return Ok(Resolution::Skip);
            }

            if self.cancel.is_cancelled() {
                return Ok(Resolution::Stopped);
            }

            self.events.emit_lossy(ScanEvent::ResolutionRequested {
                provider: provider.to_string(),
                candidate_names: candidates.iter().map(|c| c.name.clone()).collect(),
            });

            let prompt = DisambiguationPrompt {
                provider: provider.to_string(),
                searched_name: query.clone(),
                path: ctx.target.path.clone(),
                platform: ctx.target.platform,
                candidates: candidates.clone(),
                can_proceed_without: self.descriptor.optional,
            };

            let answer = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!(provider = %provider, "Stop requested while awaiting resolution");
                    return Ok(Resolution::Stopped);
                }
                answer = self.resolver.resolve_ambiguity(prompt) => answer,
            };

            let choice = match answer {
                Ok(choice) => choice,
                Err(ResolverError::FrontendGone) => {
                    warn!(provider = %provider, "Front end gone while awaiting resolution");
                    return Ok(Resolution::Stopped);
                }
                Err(e @ ResolverError::AlreadyPending) => {
                    return Err(ScanError::contract_violation(e.to_string()));
                }
            };

            match choice {
                ResolverChoice::Select(chosen) => {
                    let Some(offered) = candidates
                        .iter()
                        .find(|c| c.provider_ref == chosen.provider_ref)
                        .cloned()
                    else {
                        return Err(ScanError::contract_violation(format!(
                            "{} candidate '{}' ({}) was not offered",
                            provider, chosen.name, chosen.provider_ref
                        )));
                    };

                    // Ledger is keyed by name: a namesake of the choice must not exclude it
                    ctx.excluded_names.extend_from(
                        candidates.iter().filter(|c| c.name != offered.name),
                    );
                    return self.select(offered).await;
                }
                ResolverChoice::RetryWithName(new_name) => {
                    let new_name = new_name.trim();
                    if new_name.is_empty() {
                        return Err(ScanError::contract_violation(format!(
                            "empty retry name for {}",
                            provider
                        )));
                    }
                    ctx.excluded_names.extend_from(&candidates);
                    debug!(provider = %provider, name = %new_name, "Retrying search");
                    query = new_name.to_string();
                }
                ResolverChoice::Skip => return Ok(Resolution::Skip),
                ResolverChoice::Exclude => return Ok(Resolution::Exclude),
                ResolverChoice::ProceedWithout => {
                    if !self.descriptor.optional {
                        return Err(ScanError::contract_violation(format!(
                            "proceed-without chosen for mandatory provider {}",
                            provider
                        )));
                    }
                    return Ok(Resolution::ProceedWithout);
                }
            }
        }
    }

    async fn select(&self, candidate: CandidateSummary) -> ScanResult<Resolution> {
        let provider = self.descriptor.name.as_str();
        let record = self.provider.fetch(&candidate).await.map_err(|e| {
            warn!(provider = %provider, candidate = %candidate.provider_ref, error = %e, "Provider fetch failed");
            ScanError::provider(provider, e)
        })?;
        Ok(Resolution::Selected { candidate, record })
    }
}
