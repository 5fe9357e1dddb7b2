//! Configuration resolution for gamecat-scan
//!
//! RAWG API key resolution uses CLI → ENV → TOML priority, with a warning
//! when more than one source is set. Scan behavior flags live in
//! [`ScanSettings`], which the pipeline reads through [`ScanConfig`].

use gamecat_common::config::{load_toml_config, write_toml_config, ScanToml, TomlConfig};
use gamecat_common::{Error, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Environment variable holding the RAWG API key
pub const RAWG_API_KEY_ENV: &str = "GAMECAT_RAWG_API_KEY";

/// Resolve the RAWG API key
///
/// **Priority:** CLI argument → `GAMECAT_RAWG_API_KEY` → TOML `rawg_api_key`
pub fn resolve_rawg_api_key(cli_key: Option<&str>, toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(RAWG_API_KEY_ENV).ok();
    let toml_key = toml_config.rawg_api_key.as_deref();

    let candidates = [
        ("command line", cli_key),
        ("environment", env_key.as_deref()),
        ("TOML", toml_key),
    ];

    let sources: Vec<&str> = candidates
        .iter()
        .filter(|(_, key)| key.is_some_and(is_valid_key))
        .map(|(source, _)| *source)
        .collect();

    if sources.len() > 1 {
        warn!(
            "RAWG API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    for (source, key) in candidates {
        if let Some(key) = key.filter(|k| is_valid_key(k)) {
            info!("RAWG API key loaded from {}", source);
            return Ok(key.trim().to_string());
        }
    }

    Err(Error::Config(format!(
        "RAWG API key not configured. Please configure using one of:\n\
         1. Command line: --rawg-api-key your-key-here\n\
         2. Environment: {}=your-key-here\n\
         3. TOML config: ~/.config/gamecat/gamecat.toml (rawg_api_key = \"your-key\")\n\
         \n\
         Obtain API key at: https://rawg.io/apidocs",
        RAWG_API_KEY_ENV
    )))
}

/// Store the RAWG API key in the TOML config, keeping every other setting
///
/// A missing file is created from defaults; an unreadable one is an error
/// rather than being overwritten.
pub fn save_rawg_api_key(key: &str, toml_path: &Path) -> Result<()> {
    if !is_valid_key(key) {
        return Err(Error::InvalidInput("RAWG API key is empty".to_string()));
    }

    let mut config = if toml_path.exists() {
        load_toml_config(toml_path)?
    } else {
        TomlConfig::default()
    };
    config.rawg_api_key = Some(key.trim().to_string());

    write_toml_config(&config, toml_path)?;
    info!("RAWG API key saved to {}", toml_path.display());
    Ok(())
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Scan behavior consulted while a batch runs
pub trait ScanConfig: Send + Sync {
    /// Skip ambiguous results instead of prompting
    fn is_auto_skip_enabled(&self) -> bool;
}

/// Runtime scan settings; the auto-skip flag may change mid-batch
#[derive(Debug, Default)]
pub struct ScanSettings {
    auto_skip: AtomicBool,
}

impl ScanSettings {
    pub fn new(auto_skip: bool) -> Self {
        Self {
            auto_skip: AtomicBool::new(auto_skip),
        }
    }

    pub fn from_toml(scan: &ScanToml) -> Self {
        Self::new(scan.auto_skip_ambiguous)
    }

    pub fn set_auto_skip(&self, enabled: bool) {
        self.auto_skip.store(enabled, Ordering::SeqCst);
    }
}

impl ScanConfig for ScanSettings {
    fn is_auto_skip_enabled(&self) -> bool {
        self.auto_skip.load(Ordering::SeqCst)
    }
}
