//! Shared configuration for the lumipoint CLI, TUI, and gateway.
//!
//! One TOML file plus `LUMIPOINT_*` environment overrides, translated to
//! `lumipoint_core::ControllerConfig` for the dashboard. Nested keys use a
//! double underscore in the environment: `LUMIPOINT_GATEWAY__UPSTREAM_URL`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lumipoint_core::{ControllerConfig, parse_api_base};
use lumipoint_gateway::GatewaySettings;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LUMIPOINT_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI, TUI, and gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Device-state API base for the dashboard (e.g. "http://192.168.4.1").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// CLI presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// State gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            poll_interval_ms: default_poll_interval_ms(),
            save_debounce_ms: default_save_debounce_ms(),
            timeout_secs: default_timeout_secs(),
            defaults: Defaults::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

/// `[gateway]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Listen address for `lumipoint serve`.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Remote device-control service. Unset means mock mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,

    /// Reject malformed PATCH bodies with 400 instead of treating them as
    /// empty updates.
    #[serde(default)]
    pub strict_patch: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream_url: None,
            strict_patch: false,
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_save_debounce_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_listen() -> String {
    "127.0.0.1:3000".into()
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Parsed dashboard API base. Blank strings count as unset.
    pub fn api_base(&self) -> Result<Option<Url>, ConfigError> {
        match self.api_base_url.as_deref() {
            None => Ok(None),
            Some(raw) => parse_api_base(raw).map_err(|e| ConfigError::Validation {
                field: "api_base_url".into(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the dashboard `ControllerConfig`. The poll interval is
    /// clamped by the controller itself.
    pub fn to_controller_config(&self) -> Result<ControllerConfig, ConfigError> {
        Ok(ControllerConfig {
            api_base: self.api_base()?,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            save_debounce: Duration::from_millis(self.save_debounce_ms),
            timeout: self.timeout(),
        })
    }

    /// Build the settings for `lumipoint serve`.
    pub fn to_gateway_settings(&self) -> Result<GatewaySettings, ConfigError> {
        Ok(GatewaySettings {
            listen: self.gateway.listen_addr()?,
            upstream: self.gateway.upstream()?,
            strict_patch: self.gateway.strict_patch,
            timeout: self.timeout(),
        })
    }
}

impl GatewayConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen.parse().map_err(|_| ConfigError::Validation {
            field: "gateway.listen".into(),
            reason: format!("expected host:port, got '{}'", self.listen),
        })
    }

    /// Parsed upstream URL; `None` selects mock mode.
    pub fn upstream(&self) -> Result<Option<Url>, ConfigError> {
        match self.upstream_url.as_deref() {
            None => Ok(None),
            Some(raw) => parse_api_base(raw).map_err(|e| ConfigError::Validation {
                field: "gateway.upstream_url".into(),
                reason: e.to_string(),
            }),
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$LUMIPOINT_CONFIG`, else XDG / platform
/// conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "lumipoint", "lumipoint").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lumipoint");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults, then the TOML file at `path`, then `LUMIPOINT_*` env vars.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LUMIPOINT_").split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from an explicit file + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
