//! Directory fixtures, model builders and the pipeline harness

use super::fakes::{ScriptedProvider, ScriptedResolver};
use gamecat_common::{EventBus, ScanEvent};
use gamecat_scan::catalog::{Catalog, MemoryCatalog};
use gamecat_scan::config::ScanSettings;
use gamecat_scan::models::{CandidateSummary, LibraryDef, Platform, ProviderRecord, ProviderRef};
use gamecat_scan::providers::MetadataProvider;
use gamecat_scan::workflow::{ScanPipeline, ScanServices};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub fn candidate(id: &str, name: &str) -> CandidateSummary {
    CandidateSummary {
        provider_ref: ProviderRef(id.to_string()),
        name: name.to_string(),
        release_date: None,
        score: None,
    }
}

pub fn record(name: &str) -> ProviderRecord {
    let slug = name.to_lowercase().replace(' ', "-");
    ProviderRecord {
        name: name.to_string(),
        description: Some(format!("About {}", name)),
        release_date: None,
        critic_score: None,
        user_score: None,
        genres: Vec::new(),
        thumbnail: None,
        poster: None,
        detail_url: format!("https://example.test/games/{}", slug),
    }
}

/// Create an empty library root directory
pub fn library_root(parent: &Path, name: &str) -> PathBuf {
    let path = parent.join(name);
    std::fs::create_dir_all(&path).unwrap();
    path
}

/// Create a game folder holding one regular file
pub fn game_dir(parent: &Path, name: &str) -> PathBuf {
    let path = parent.join(name);
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(path.join("game.exe"), b"MZ").unwrap();
    path
}

/// Drain every event currently buffered in `rx`
pub fn collect_events(rx: &mut broadcast::Receiver<ScanEvent>) -> Vec<ScanEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Pipeline collaborators with inspection handles
pub struct Harness {
    pub catalog: Arc<MemoryCatalog>,
    pub primary: Arc<ScriptedProvider>,
    pub secondary: Option<Arc<ScriptedProvider>>,
    pub resolver: Arc<ScriptedResolver>,
    pub settings: Arc<ScanSettings>,
    pub events: EventBus,
    pub cancel: CancellationToken,
}

impl Harness {
    pub fn new(
        primary: ScriptedProvider,
        secondary: Option<ScriptedProvider>,
        resolver: ScriptedResolver,
    ) -> Self {
        Self {
            catalog: Arc::new(MemoryCatalog::new()),
            primary: Arc::new(primary),
            secondary: secondary.map(Arc::new),
            resolver: Arc::new(resolver),
            settings: Arc::new(ScanSettings::new(false)),
            events: EventBus::new(256),
            cancel: CancellationToken::new(),
        }
    }

    /// Register `path` as a PC library in the catalog
    pub async fn track_library(&self, path: &Path) {
        self.catalog
            .create_library(&LibraryDef::for_folder(path, Platform::Pc))
            .await
            .unwrap();
    }

    pub fn services(&self) -> ScanServices {
        ScanServices {
            catalog: self.catalog.clone(),
            primary: self.primary.clone(),
            secondary: self
                .secondary
                .clone()
                .map(|p| p as Arc<dyn MetadataProvider>),
            resolver: self.resolver.clone(),
            config: self.settings.clone(),
            events: self.events.clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn pipeline(&self) -> ScanPipeline {
        ScanPipeline::new(self.services())
    }
}
