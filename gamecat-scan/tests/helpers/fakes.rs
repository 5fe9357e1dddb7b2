//! Scripted collaborators: providers and resolvers with canned answers

use async_trait::async_trait;
use gamecat_scan::models::{CandidateSummary, LibraryDef, Platform, ProviderRecord};
use gamecat_scan::providers::{MetadataProvider, ProviderDescriptor, ProviderError};
use gamecat_scan::workflow::{
    DisambiguationPrompt, InteractiveResolver, ResolverChoice, ResolverError,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Provider answering from fixed tables
///
/// Unknown queries return no candidates. Fetching a candidate without a
/// scripted record yields a record built from the candidate itself.
pub struct ScriptedProvider {
    descriptor: ProviderDescriptor,
    results: HashMap<String, Vec<CandidateSummary>>,
    records: HashMap<String, ProviderRecord>,
    failing_queries: HashSet<String>,
    searched: Mutex<Vec<String>>,
    fetch_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(descriptor: ProviderDescriptor) -> Self {
        Self {
            descriptor,
            results: HashMap::new(),
            records: HashMap::new(),
            failing_queries: HashSet::new(),
            searched: Mutex::new(Vec::new()),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    /// Mandatory provider named "Primary"
    pub fn primary() -> Self {
        Self::new(ProviderDescriptor::mandatory("Primary"))
    }

    /// Optional provider named "Secondary"
    pub fn secondary() -> Self {
        Self::new(ProviderDescriptor::optional("Secondary"))
    }

    pub fn with_results(mut self, query: &str, candidates: Vec<CandidateSummary>) -> Self {
        self.results.insert(query.to_string(), candidates);
        self
    }

    /// Record returned when fetching the candidate with this provider ref
    pub fn with_record(mut self, provider_ref: &str, record: ProviderRecord) -> Self {
        self.records.insert(provider_ref.to_string(), record);
        self
    }

    /// Searching for `query` fails with a network error
    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing_queries.insert(query.to_string());
        self
    }

    pub fn name(&self) -> String {
        self.descriptor.name.clone()
    }

    pub fn search_count(&self) -> usize {
        self.searched.lock().unwrap().len()
    }

    pub fn searched_names(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    fn descriptor(&self) -> ProviderDescriptor {
        self.descriptor.clone()
    }

    async fn search(
        &self,
        name: &str,
        _platform: Platform,
    ) -> Result<Vec<CandidateSummary>, ProviderError> {
        self.searched.lock().unwrap().push(name.to_string());

        if self.failing_queries.contains(name) {
            return Err(ProviderError::Network("connection reset".to_string()));
        }
        Ok(self.results.get(name).cloned().unwrap_or_default())
    }

    async fn fetch(&self, candidate: &CandidateSummary) -> Result<ProviderRecord, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .records
            .get(&candidate.provider_ref.0)
            .cloned()
            .unwrap_or_else(|| super::fixtures::record(&candidate.name)))
    }
}

/// One scripted answer to a disambiguation prompt
#[derive(Debug, Clone)]
pub enum Answer {
    Choice(ResolverChoice),
    /// Select the n-th offered candidate (0-based)
    SelectIndex(usize),
    /// Never answer
    Hang,
    /// Behave like a closed front end
    Gone,
}

/// Resolver replaying scripted answers and recording every prompt
///
/// Running out of answers behaves like a vanished front end.
pub struct ScriptedResolver {
    answers: Mutex<VecDeque<Answer>>,
    library_answers: Mutex<VecDeque<Option<Platform>>>,
    prompts: Mutex<Vec<DisambiguationPrompt>>,
    library_prompts: Mutex<Vec<(PathBuf, Vec<PathBuf>)>>,
    /// Notified every time a disambiguation prompt arrives
    pub prompted: Notify,
}

impl ScriptedResolver {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            library_answers: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            library_prompts: Mutex::new(Vec::new()),
            prompted: Notify::new(),
        }
    }

    /// Resolver that must never be asked anything
    pub fn silent() -> Self {
        Self::new(Vec::new())
    }

    /// Answer library prompts in order: `Some(platform)` accepts, `None` declines
    pub fn with_library_answers(self, answers: Vec<Option<Platform>>) -> Self {
        *self.library_answers.lock().unwrap() = answers.into();
        self
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<DisambiguationPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn library_prompt_count(&self) -> usize {
        self.library_prompts.lock().unwrap().len()
    }

    pub fn library_prompts(&self) -> Vec<(PathBuf, Vec<PathBuf>)> {
        self.library_prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl InteractiveResolver for ScriptedResolver {
    async fn choose_library_creation(
        &self,
        path: &Path,
        children: &[PathBuf],
        _default_platform: Platform,
    ) -> Result<Option<LibraryDef>, ResolverError> {
        self.library_prompts
            .lock()
            .unwrap()
            .push((path.to_path_buf(), children.to_vec()));

        let answer = self.library_answers.lock().unwrap().pop_front();
        match answer {
            Some(Some(platform)) => Ok(Some(LibraryDef::for_folder(path, platform))),
            Some(None) => Ok(None),
            None => Err(ResolverError::FrontendGone),
        }
    }

    async fn resolve_ambiguity(
        &self,
        prompt: DisambiguationPrompt,
    ) -> Result<ResolverChoice, ResolverError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.prompted.notify_one();

        let answer = self.answers.lock().unwrap().pop_front();
        match answer {
            Some(Answer::Choice(choice)) => Ok(choice),
            Some(Answer::SelectIndex(index)) => Ok(ResolverChoice::Select(
                prompt.candidates[index].clone(),
            )),
            Some(Answer::Hang) => std::future::pending().await,
            Some(Answer::Gone) | None => Err(ResolverError::FrontendGone),
        }
    }
}
