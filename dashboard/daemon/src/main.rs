//! Dashboard Daemon
//!
//! Headless driver for the camera dashboard. Loads the camera list, lays the
//! cards out in a grid and runs the stream manager against operator commands
//! read from stdin (scrolling, stream limit, grid/map switch, filters).
//!
//! # Usage
//!
//! ```bash
//! # Run against an exported camera list
//! dashboard-daemon --catalog cameras.json
//!
//! # Allow six streams and two columns
//! dashboard-daemon --catalog cameras.json --max-streams 6 --columns 2
//!
//! # With verbose logging
//! RUST_LOG=debug dashboard-daemon --catalog cameras.json
//! ```
//!
//! # Environment Variables
//!
//! - `DASHBOARD_CONFIG`: Config file path
//! - `DASHBOARD_CATALOG`: Camera list path
//! - `DASHBOARD_MAX_STREAMS`: Concurrent stream limit
//! - `DASHBOARD_VISIBILITY_THRESHOLD`: Visible fraction needed to play
//! - `DASHBOARD_GRID_COLUMNS`: Grid columns
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)
//!
//! # Signals
//!
//! - SIGINT: stop every stream and exit

mod app;
mod commands;
mod host;
mod layout;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dashboard_core::{
    load_config, load_config_from_path, parse_catalog, CameraFeed, ConfigOverrides,
    DashboardConfig,
};

use crate::app::{Dashboard, Outcome};
use crate::commands::Command;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "dashboard-daemon", version, about)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(long, env = "DASHBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Camera list in the dashboard API format
    #[arg(long, env = "DASHBOARD_CATALOG")]
    catalog: PathBuf,

    /// Concurrent stream limit
    #[arg(long)]
    max_streams: Option<usize>,

    /// Grid columns
    #[arg(long)]
    columns: Option<usize>,

    /// Visible fraction needed before a card may play
    #[arg(long)]
    threshold: Option<f64>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(max) = self.max_streams {
            overrides = overrides.with_max_concurrent(max);
        }
        if let Some(columns) = self.columns {
            overrides = overrides.with_grid_columns(columns);
        }
        if let Some(threshold) = self.threshold {
            overrides = overrides.with_threshold(threshold);
        }
        overrides
    }
}

/// Load the config file and environment, then apply command line overrides
fn build_config(args: &Args) -> anyhow::Result<DashboardConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from_path(Some(path.clone()))?,
        None => load_config()?,
    };
    args.overrides().apply(&mut config);
    config.validate()?;
    info!(
        source = %config.source(),
        max_concurrent = config.max_concurrent,
        columns = config.grid_columns,
        "Configuration loaded"
    );
    Ok(config)
}

async fn load_catalog(path: &Path) -> anyhow::Result<Vec<CameraFeed>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read camera list {}", path.display()))?;
    let feeds = parse_catalog(&raw)
        .with_context(|| format!("Invalid camera list {}", path.display()))?;
    info!(cameras = feeds.len(), path = %path.display(), "Camera list loaded");
    Ok(feeds)
}

/// Filter used when `RUST_LOG` is unset or unparseable
const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter from a `RUST_LOG` value
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

async fn reply<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> anyhow::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays for command replies
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let args = Args::parse();
    info!("Starting Dashboard Daemon");

    let config = build_config(&args)?;
    let feeds = load_catalog(&args.catalog).await?;
    let mut dashboard = Dashboard::new(config, feeds)?;

    let mut stdout = tokio::io::stdout();
    reply(&mut stdout, &dashboard.summary()).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        reply(&mut stdout, &e.to_string()).await?;
                        continue;
                    }
                };
                match dashboard.execute(command) {
                    Ok(Outcome::Quit) => break,
                    Ok(Outcome::Continue(Some(text))) => reply(&mut stdout, &text).await?,
                    Ok(Outcome::Continue(None)) => {}
                    Err(e) => {
                        warn!(error = %e, "Command failed");
                        reply(&mut stdout, &e.to_string()).await?;
                    }
                }
            }
            _ = &mut ctrl_c => {
                info!("Received SIGINT, shutting down");
                break;
            }
        }
    }

    dashboard.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    fn args(config: &Path, catalog: &Path) -> Args {
        Args::parse_from([
            "dashboard-daemon",
            "--config",
            config.to_str().unwrap(),
            "--catalog",
            catalog.to_str().unwrap(),
        ])
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("dashboard.toml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "[streams]\nmax_concurrent = 2\n\n[grid]\ncolumns = 4").unwrap();

        let mut args = args(&config_path, &dir.path().join("cameras.json"));
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.grid_columns, 4);

        args.max_streams = Some(6);
        let config = build_config(&args).unwrap();
        assert_eq!(config.max_concurrent, 6);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("missing.toml");
        let mut args = args(&config_path, &dir.path().join("cameras.json"));
        args.max_streams = Some(0);
        assert!(build_config(&args).is_err());
    }

    #[tokio::test]
    async fn test_load_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cameras.json");
        std::fs::write(
            &path,
            r#"{"success": true, "count": 1, "data": [
                {"id": 1, "nama_lokasi": "A", "kecamatan": "K", "kecamatan_id": 1, "youtube_video_id": "a"}
            ]}"#,
        )
        .unwrap();
        let feeds = load_catalog(&path).await.unwrap();
        assert_eq!(feeds.len(), 1);

        assert!(load_catalog(&dir.path().join("absent.json")).await.is_err());
    }

    /// Whether core info and debug events pass `filter`
    fn core_levels(filter: EnvFilter) -> (bool, bool) {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            (
                tracing::enabled!(target: "dashboard_core::streaming::manager", tracing::Level::INFO),
                tracing::enabled!(target: "dashboard_core::streaming::manager", tracing::Level::DEBUG),
            )
        })
    }

    #[test]
    fn test_rust_log_debug_reaches_core_transitions() {
        assert_eq!(core_levels(log_filter(Some("debug"))), (true, true));
        assert_eq!(core_levels(log_filter(Some("dashboard_core=debug"))), (true, true));
    }

    #[test]
    fn test_default_log_filter_is_info() {
        for rust_log in [None, Some(""), Some("  ")] {
            assert_eq!(core_levels(log_filter(rust_log)), (true, false));
        }
    }

    #[tokio::test]
    async fn test_reply_appends_newline() {
        let mut out = Vec::new();
        reply(&mut out, "live=0/4").await.unwrap();
        assert_eq!(out, b"live=0/4\n");
    }
}
