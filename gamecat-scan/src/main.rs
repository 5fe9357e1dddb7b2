//! gamecat-scan - Game folder scanner
//!
//! Classifies the given folders, resolves unknown game folders against RAWG
//! (and optionally the Steam store), asks on the console when a match is
//! ambiguous, and records the results in the catalog database.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gamecat_common::config::{load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig};
use gamecat_common::EventBus;
use gamecat_scan::catalog::{Catalog, MemoryCatalog, SqliteCatalog};
use gamecat_scan::config::{resolve_rawg_api_key, save_rawg_api_key, ScanSettings};
use gamecat_scan::models::{Platform, PipelineOutcome, ScanTarget};
use gamecat_scan::providers::{MetadataProvider, RawgClient, SteamStoreClient};
use gamecat_scan::workflow::{
    log_events, BatchReport, ChannelResolver, ScanPipeline, ScanServices, ScanWorker, WorkerOptions,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod console;

/// Config file module name (`<config dir>/gamecat/gamecat.toml`)
const CONFIG_MODULE: &str = "gamecat";

/// Command-line arguments for gamecat-scan
#[derive(Parser, Debug)]
#[command(name = "gamecat-scan")]
#[command(about = "Scan game folders into the gamecat catalog")]
#[command(version)]
struct Args {
    /// Folders to scan (game folders or library roots)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Platform of the scanned folders (e.g. pc, playstation-2, nintendo-switch)
    #[arg(short, long)]
    platform: Option<Platform>,

    /// Skip ambiguous matches instead of asking
    #[arg(long)]
    auto_skip: bool,

    /// Root folder holding the catalog database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// RAWG API key (overrides GAMECAT_RAWG_API_KEY and the config file)
    #[arg(long)]
    rawg_api_key: Option<String>,

    /// Store the given --rawg-api-key in the config file for later runs
    #[arg(long, requires = "rawg_api_key")]
    save_api_key: bool,

    /// Do not query the Steam store
    #[arg(long)]
    no_secondary: bool,

    /// Use an in-memory catalog; nothing is written to disk
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(CONFIG_MODULE).with_cli_arg(args.root_folder.clone());
    let config_path = resolver.config_file_path();

    // Load before tracing starts (log level lives in the file); report afterwards
    let (toml_config, config_error) = match &config_path {
        Some(path) if path.exists() => match load_toml_config(path) {
            Ok(config) => (config, None),
            Err(e) => (TomlConfig::default(), Some(e)),
        },
        _ => (TomlConfig::default(), None),
    };

    init_tracing(&toml_config)?;

    info!("Starting gamecat-scan v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        warn!("{}; using compiled defaults", e);
    }

    let platform = resolve_platform(args.platform, &toml_config);
    info!("Platform: {}", platform);

    let settings = Arc::new(ScanSettings::from_toml(&toml_config.scan));
    if args.auto_skip {
        settings.set_auto_skip(true);
    }

    // The SQLite handle is kept for the post-batch game count
    let (catalog, sqlite): (Arc<dyn Catalog>, Option<Arc<SqliteCatalog>>) = if args.dry_run {
        info!("Dry run: using in-memory catalog");
        (Arc::new(MemoryCatalog::new()), None)
    } else {
        let initializer = RootFolderInitializer::new(resolver.resolve());
        initializer
            .ensure_directory_exists()
            .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;

        let db_path = initializer.database_path();
        info!("Database: {}", db_path.display());
        let sqlite = Arc::new(
            SqliteCatalog::open(&db_path)
                .await
                .context("Failed to open catalog database")?,
        );
        let catalog: Arc<dyn Catalog> = sqlite.clone();
        (catalog, Some(sqlite))
    };

    let api_key = resolve_rawg_api_key(args.rawg_api_key.as_deref(), &toml_config)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if args.save_api_key {
        match &config_path {
            Some(path) => {
                if let Err(e) = save_rawg_api_key(&api_key, path) {
                    warn!("RAWG API key not saved: {}", e);
                }
            }
            None => warn!("No config directory available; RAWG API key not saved"),
        }
    }
    let primary: Arc<dyn MetadataProvider> =
        Arc::new(RawgClient::new(Some(api_key)).context("Failed to build RAWG client")?);

    let secondary: Option<Arc<dyn MetadataProvider>> =
        if args.no_secondary || !toml_config.scan.secondary_enabled {
            info!("Secondary provider disabled");
            None
        } else {
            Some(Arc::new(
                SteamStoreClient::new().context("Failed to build Steam client")?,
            ))
        };

    let (channel_resolver, requests) = ChannelResolver::new();
    let cancel = CancellationToken::new();
    let events = EventBus::new(100);
    let event_log = tokio::spawn(log_events(events.subscribe()));

    let pipeline = Arc::new(ScanPipeline::new(ScanServices {
        catalog,
        primary,
        secondary,
        resolver: Arc::new(channel_resolver),
        config: settings,
        events,
        cancel: cancel.clone(),
    }));

    let targets: Vec<ScanTarget> = args
        .paths
        .iter()
        .map(|path| ScanTarget::new(absolute(path), platform))
        .collect();

    let options = WorkerOptions {
        descend_into_new_libraries: toml_config.scan.descend_into_new_libraries,
    };

    let worker = ScanWorker::spawn(pipeline, targets, options);

    // Not joined: it may sit in a terminal read after the batch ends
    std::thread::spawn(move || console::run(requests));

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, stopping scan");
            cancel.cancel();
        }
    });

    let report = worker.join().await.map_err(|e| anyhow::anyhow!("{}", e))?;
    // The worker dropped the pipeline, closing the bus; let the logger drain it
    if let Err(e) = event_log.await {
        warn!("Event logger task failed: {}", e);
    }
    print_summary(&report);

    if let Some(sqlite) = sqlite {
        match sqlite.game_count().await {
            Ok(count) => println!("Catalog now holds {} games", count),
            Err(e) => warn!("Could not count catalog games: {}", e),
        }
    }

    if report.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn init_tracing(config: &TomlConfig) -> Result<()> {
    let file_layer = match &config.logging.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    let default_directive = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

/// CLI platform, else TOML default, else PC
fn resolve_platform(cli: Option<Platform>, config: &TomlConfig) -> Platform {
    if let Some(platform) = cli {
        return platform;
    }
    match config.scan.default_platform.as_deref().map(str::parse::<Platform>) {
        Some(Ok(platform)) => platform,
        Some(Err(e)) => {
            warn!("Ignoring scan.default_platform: {}", e);
            Platform::default()
        }
        None => Platform::default(),
    }
}

fn absolute(path: &std::path::Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn print_summary(report: &BatchReport) {
    let stats = &report.statistics;

    println!();
    println!("Scan summary ({} targets)", stats.total());
    println!("  added:             {}", stats.added);
    println!("  already tracked:   {}", stats.already_tracked);
    println!("  libraries created: {}", stats.libraries_created);
    println!("  skipped:           {}", stats.skipped);
    println!("  excluded:          {}", stats.excluded);
    println!("  stopped:           {}", stats.stopped);
    println!("  failed:            {}", stats.failed);

    for entry in &report.results {
        match &entry.result {
            Err(e) => println!("  FAILED {}: {}", entry.target.path.display(), e),
            Ok(PipelineOutcome::Added(_)) => println!("  added  {}", entry.target.path.display()),
            Ok(_) => {}
        }
    }
}
