// ── Runtime dashboard configuration ──
//
// Describes *where* the device lives and how often to talk to it.
// Never touches disk: the CLI/TUI builds a `ControllerConfig` (usually via
// `lumipoint-config`) and hands it in.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
/// Fastest poll cadence a user may select.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1000);
/// Slowest poll cadence a user may select.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_millis(10_000);
/// Step removed by "faster refresh".
pub const POLL_STEP: Duration = Duration::from_millis(500);
/// Quiet period before edits are written.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Configuration for a single dashboard session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Device-state API base (e.g. `http://192.168.4.1`). `None` disables
    /// all network traffic.
    pub api_base: Option<Url>,
    /// Poll cadence, clamped to `MIN_POLL_INTERVAL..=MAX_POLL_INTERVAL`.
    pub poll_interval: Duration,
    /// Debounce quiet period for settings writes.
    pub save_debounce: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Clamp a requested poll interval into the supported range.
pub fn clamp_poll_interval(interval: Duration) -> Duration {
    interval.clamp(MIN_POLL_INTERVAL, MAX_POLL_INTERVAL)
}

/// Parse user input for the API base. Blank input means "unset".
pub fn parse_api_base(raw: &str) -> Result<Option<Url>, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let url = Url::parse(trimmed).map_err(|e| CoreError::Config {
        message: format!("invalid API base '{trimmed}': {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::Config {
            message: format!("API base must be http or https, got '{}'", url.scheme()),
        });
    }
    Ok(Some(url))
}
