use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use impm::config::SyncConfig;
use impm::export::{DEFAULT_EXPORT_DIR, ExportOptions, Exporter};
use impm::sync::compile_filter;
use impm::sync::engine::{SyncEngine, SyncOptions};
use impm::sync::proxy::DEFAULT_UPDATE_SCRIPT;

/// Immich Projects Manager
#[derive(Debug, Parser)]
#[command(name = "impm", version, about)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sync existing projects to Immich albums
    Sync {
        /// Only sync projects whose name matches this glob
        #[arg(long)]
        filter: Option<String>,
        /// Do not ask the server to rescan the library first
        #[arg(long)]
        skip_scan: bool,
        /// Where to write proxy path update statements
        #[arg(long, default_value = DEFAULT_UPDATE_SCRIPT)]
        output: PathBuf,
    },
    /// Write DaVinci Resolve import scripts from project albums
    Export {
        /// Only export projects whose name matches this glob
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value = DEFAULT_EXPORT_DIR)]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = SyncConfig::from_env().context("failed to load configuration")?;
    tracing::info!(
        library = %config.library_name,
        extensions = ?config.file_extensions,
        aliases = config.aliases.iter().count(),
        "configuration loaded"
    );

    match cli.command {
        Command::Sync {
            filter,
            skip_scan,
            output,
        } => {
            let options = SyncOptions {
                filter: compile_filter(filter.as_deref())?,
                scan: !skip_scan,
                update_script: output,
            };
            let engine = SyncEngine::from_config(&config)?;
            let report = engine.run(&options).await.context("sync failed")?;
            if report.assets_failed > 0 || report.albums_failed > 0 {
                tracing::warn!(
                    albums_failed = report.albums_failed,
                    assets_failed = report.assets_failed,
                    "sync completed with failures"
                );
            }
        }
        Command::Export { filter, out_dir } => {
            let options = ExportOptions {
                filter: compile_filter(filter.as_deref())?,
                out_dir,
            };
            let exporter = Exporter::from_config(&config)?;
            let written = exporter.run(&options).await.context("export failed")?;
            tracing::info!(scripts = written.len(), "export finished");
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = if verbose {
        EnvFilter::new(default_directive(true))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(false)))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "impm=debug" } else { "impm=info" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_defaults_to_scanning() {
        let cli = Cli::try_parse_from(["impm", "sync"]).unwrap();
        match cli.command {
            Command::Sync {
                filter,
                skip_scan,
                output,
            } => {
                assert!(filter.is_none());
                assert!(!skip_scan);
                assert_eq!(output, PathBuf::from(DEFAULT_UPDATE_SCRIPT));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn sync_accepts_filter_and_skip_scan() {
        let cli =
            Cli::try_parse_from(["impm", "sync", "--filter", "2024*", "--skip-scan"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Sync { filter: Some(ref f), skip_scan: true, .. } if f == "2024*"
        ));
    }

    #[test]
    fn export_takes_out_dir() {
        let cli = Cli::try_parse_from(["impm", "-v", "export", "--out-dir", "/tmp/out"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Export { ref out_dir, .. } if out_dir == &PathBuf::from("/tmp/out")
        ));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["impm", "offload"]).is_err());
    }

    #[test]
    fn default_log_directives() {
        assert_eq!(default_directive(false), "impm=info");
        assert_eq!(default_directive(true), "impm=debug");
    }
}
