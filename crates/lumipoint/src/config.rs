//! CLI configuration: thin wrapper around `lumipoint_config` that layers
//! `GlobalOpts` flag overrides (--api-base, --timeout, ...) on top.

use clap::ValueEnum;

use lumipoint_core::ControllerConfig;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use lumipoint_config::{Config, config_path, load_config_from};

/// The config file this invocation reads and writes.
pub fn active_path(global: &GlobalOpts) -> std::path::PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the file (if any) and apply flag overrides.
///
/// A missing file is not an error; every field has a default.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&active_path(global))?;
    if let Some(ref api_base) = global.api_base {
        cfg.api_base_url = Some(api_base.clone());
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
    Ok(cfg)
}

pub fn controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    Ok(resolve(global)?.to_controller_config()?)
}

/// `--output` wins; otherwise `[defaults] output`; otherwise table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}
