//! `lumipoint-tui`: terminal dashboard for the lumipoint nightlight outlet.
//!
//! Built on [ratatui](https://ratatui.rs). Three tabs (Controls,
//! Telemetry, Settings) render the `lumipoint-core` controller's
//! snapshots; edits go back through the controller, which polls the
//! device and saves settings after a short debounce.
//!
//! Logs go to a file (default `/tmp/lumipoint-tui.log`) so they never
//! corrupt the terminal.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lumipoint_core::{Controller, ControllerConfig, parse_api_base};

use crate::app::App;

/// Terminal dashboard for the lumipoint nightlight outlet.
#[derive(Parser, Debug)]
#[command(name = "lumipoint-tui", version, about)]
struct Cli {
    /// Device API base URL (e.g. http://192.168.4.1). Overrides the config file.
    #[arg(short = 'a', long, env = "LUMIPOINT_API_BASE_URL")]
    api_base: Option<String>,

    /// Config file path
    #[arg(long, env = "LUMIPOINT_CONFIG")]
    config: Option<PathBuf>,

    /// Log file path
    #[arg(long, default_value = "/tmp/lumipoint-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-only tracing. Hold the returned guard until exit so buffered
/// lines are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("lumipoint_tui={level},lumipoint_core={level},lumipoint_api={level}"))
    });

    let dir = cli.log_file.parent().unwrap_or(Path::new("/tmp"));
    let file_name = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("lumipoint-tui.log"));
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Config file first, then `--api-base` on top. A broken config file is
/// logged and ignored so the dashboard still opens.
fn controller_config(cli: &Cli) -> Result<ControllerConfig> {
    let loaded = match &cli.config {
        Some(path) => lumipoint_config::load_config_from(path),
        None => lumipoint_config::load_config(),
    };
    let mut config = match loaded.and_then(|cfg| cfg.to_controller_config()) {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "ignoring unusable config file");
            ControllerConfig::default()
        }
    };

    if let Some(raw) = cli.api_base.as_deref() {
        config.api_base = parse_api_base(raw).wrap_err("invalid --api-base")?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;
    let _log_guard = setup_tracing(&cli);

    let config = controller_config(&cli)?;
    info!(
        api_base = config.api_base.as_ref().map_or("(not set)", url::Url::as_str),
        poll_ms = config.poll_interval.as_millis(),
        "starting lumipoint-tui"
    );

    let mut app = App::new(Controller::new(config));
    app.run().await
}
