//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`GAMECAT_ROOT_FOLDER`, then `GAMECAT_ROOT`)
//! 3. TOML config file (`<config dir>/gamecat/<module>.toml`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or malformed TOML file never terminates the program: it is
//! reported with a warning and compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary environment variable for the root folder
pub const ROOT_FOLDER_ENV: &str = "GAMECAT_ROOT_FOLDER";

/// Alternative environment variable for the root folder
pub const ROOT_ENV: &str = "GAMECAT_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "gamecat.db";

/// Compiled-in defaults used when no other configuration source applies
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    /// Default root folder (catalog database location)
    pub root_folder: PathBuf,
    /// Default log level
    pub log_level: String,
    /// Default log file (None = stdout only)
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    /// Defaults for the platform this binary was compiled for
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/gamecat
        dirs::data_local_dir()
            .map(|d| d.join("gamecat"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/gamecat"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/gamecat
        dirs::data_dir()
            .map(|d| d.join("gamecat"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/gamecat"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\gamecat
        dirs::data_local_dir()
            .map(|d| d.join("gamecat"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\gamecat"))
    } else {
        PathBuf::from("./gamecat_data")
    }
}

/// Logging section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridden by RUST_LOG)
    pub level: String,
    /// Optional log file path
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Scan policy section of the TOML config
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanToml {
    /// Skip ambiguous provider matches instead of prompting
    pub auto_skip_ambiguous: bool,
    /// Platform slug used when none is given on the command line
    pub default_platform: Option<String>,
    /// Queue the children of a newly created library for scanning
    pub descend_into_new_libraries: bool,
    /// Query the secondary (enrichment) provider
    pub secondary_enabled: bool,
}

impl Default for ScanToml {
    fn default() -> Self {
        Self {
            auto_skip_ambiguous: false,
            default_platform: None,
            descend_into_new_libraries: true,
            secondary_enabled: true,
        }
    }
}

/// TOML configuration file contents
///
/// Every field is optional so that partial files load cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Root folder override
    pub root_folder: Option<PathBuf>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// RAWG API key
    pub rawg_api_key: Option<String>,
    /// Scan policy
    #[serde(default)]
    pub scan: ScanToml,
}

/// Load a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Load a TOML config file, falling back to defaults when missing or invalid
pub fn load_toml_config_or_default(path: &Path) -> TomlConfig {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return TomlConfig::default();
    }

    match load_toml_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using compiled defaults", e);
            TomlConfig::default()
        }
    }
}

/// Write a TOML config file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}

/// Resolves the root folder for one module
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
}

impl RootFolderResolver {
    /// Create a resolver for the named module (used for the config file name)
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
        }
    }

    /// Set the command-line override
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Path of this module's TOML config file, if a config directory exists
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| {
            d.join("gamecat")
                .join(format!("{}.toml", self.module_name))
        })
    }

    /// Resolve the root folder following the documented priority order
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        for var in [ROOT_FOLDER_ENV, ROOT_ENV] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(config_path) = self.config_file_path() {
            let config = load_toml_config_or_default(&config_path);
            if let Some(root_folder) = config.root_folder {
                return root_folder;
            }
        }

        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the root folder for use
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            debug!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the catalog database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_section_defaults() {
        let config: TomlConfig = toml::from_str("rawg_api_key = \"abc\"\n").unwrap();

        assert_eq!(config.rawg_api_key.as_deref(), Some("abc"));
        assert_eq!(config.logging, LoggingConfig::default());
        assert!(config.scan.descend_into_new_libraries);
        assert!(config.scan.secondary_enabled);
        assert!(!config.scan.auto_skip_ambiguous);
    }

    #[test]
    fn test_scan_section_parses() {
        let config: TomlConfig = toml::from_str(
            r#"
            [scan]
            auto_skip_ambiguous = true
            default_platform = "playstation-2"
            "#,
        )
        .unwrap();

        assert!(config.scan.auto_skip_ambiguous);
        assert_eq!(config.scan.default_platform.as_deref(), Some("playstation-2"));
        // Unspecified keys in a present section keep their defaults
        assert!(config.scan.secondary_enabled);
    }

    #[test]
    fn test_cli_arg_has_highest_priority() {
        let resolver = RootFolderResolver::new("test-module")
            .with_cli_arg(Some(PathBuf::from("/tmp/gamecat-cli-root")));
        assert_eq!(resolver.resolve(), PathBuf::from("/tmp/gamecat-cli-root"));
    }
}
