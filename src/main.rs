//! FSAF command line tool.
//!
//! Validates and generates configuration files, and scans local directories
//! through the document provider cache.

use clap::{Parser, Subcommand};
use fsaf_lib::config::{self, ConfigLoader, FsafConfig, LogConfig};
use fsaf_lib::error::{set_error_reporter, FsafError, FsafResult, TracingErrorReporter};
use fsaf_lib::file::AbstractFile;
use fsaf_lib::manager::BaseDirectory;
use fsaf_lib::provider::LocalDocumentProvider;
use fsaf_lib::FileManager;
use serde::Serialize;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::info;

/// Command line arguments for FSAF.
#[derive(Parser, Debug)]
#[clap(name = "fsaf", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },

    /// Snapshot a directory through the document provider and print it
    Scan {
        /// Directory to serve as the document tree
        dir: PathBuf,

        /// Descend into sub directories
        #[clap(short, long)]
        recursive: bool,

        /// Print JSON instead of text
        #[clap(long)]
        json: bool,
    },
}

/// One printed entry of a scan.
#[derive(Serialize, Debug)]
struct ScanEntry {
    name: String,
    uri: String,
    directory: bool,
    length: Option<u64>,
    last_modified: Option<u64>,
}

/// Initialize the logging system. `RUST_LOG` wins over the configured level.
fn init_logging(log: &LogConfig) -> FsafResult<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_line_number(true)
        .with_file(true)
        .with_thread_names(true);

    let result = if log.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| FsafError::Custom(format!("Failed to set global tracing subscriber: {e}")))
}

/// Walks the snapshot cache below `dir`.
fn collect_entries(
    manager: &FileManager<LocalDocumentProvider>,
    dir: &AbstractFile,
    recursive: bool,
    entries: &mut Vec<ScanEntry>,
) {
    for file in manager.list_snapshot_files(dir) {
        let directory = manager.is_directory(&file);
        entries.push(ScanEntry {
            name: manager.name(&file).unwrap_or_default(),
            uri: file.full_path(),
            directory,
            length: manager.length(&file),
            last_modified: manager.last_modified(&file),
        });

        if recursive && directory {
            collect_entries(manager, &file, recursive, entries);
        }
    }
}

fn scan(config: &FsafConfig, dir: PathBuf, recursive: bool, json: bool) -> FsafResult<()> {
    let provider = LocalDocumentProvider::new(&dir, config.provider.authority.as_str())
        .with_file_mime_type(config.provider.default_mime_type.as_str());
    let tree = provider.tree_uri();

    let manager = FileManager::new(provider, config);
    manager.register_base_directory(BaseDirectory::from_uri("scan", tree.clone()));

    let Some(root) = manager.from_uri(&tree) else {
        return Err(FsafError::NotADirectory(dir.display().to_string()));
    };

    let entries = manager.with_snapshot(&root, recursive, |manager| {
        let mut entries = Vec::new();
        collect_entries(manager, &root, recursive, &mut entries);
        entries
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            let kind = if entry.directory { "d" } else { "-" };
            println!(
                "{kind} {:>12} {}",
                entry.length.map(|len| len.to_string()).unwrap_or_default(),
                entry.uri
            );
        }
    }

    info!(entries = entries.len(), "scan finished");
    Ok(())
}

/// Main entry point for the application.
fn main() -> FsafResult<()> {
    let args = Args::parse();

    let config_loader = ConfigLoader::new(args.config.as_deref(), config::ENV_PREFIX);
    let loaded = config_loader.load();

    // Logging needs the configured level, so a broken config is logged with the defaults.
    let log = loaded
        .as_ref()
        .map(|config| config.log.clone())
        .unwrap_or_default();
    init_logging(&log)?;

    set_error_reporter(Arc::new(TracingErrorReporter));

    match args.command {
        Command::Validate => match loaded {
            Ok(_) => {
                info!("Configuration validated successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Configuration validation error: {}", e);
                process::exit(1);
            }
        },
        Command::GenConfig { output } => {
            info!("Generating default configuration");
            let default_config = FsafConfig::default();

            if let Some(parent) = output.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let toml = toml::to_string_pretty(&default_config)
                .map_err(|e| FsafError::Custom(format!("Failed to serialize config: {e}")))?;
            std::fs::write(&output, toml)?;

            info!("Default configuration written to {:?}", output);
            Ok(())
        }
        Command::Scan {
            dir,
            recursive,
            json,
        } => {
            let config = match loaded {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("Configuration error: {}", e);
                    process::exit(1);
                }
            };

            config::init_global_config(config);
            scan(config::get_global_config().get(), dir, recursive, json)
        }
    }
}
