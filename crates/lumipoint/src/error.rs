//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use lumipoint_config::ConfigError;
use lumipoint_core::CoreError;
use lumipoint_gateway::GatewayError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const DEVICE: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the device at {url}")]
    #[diagnostic(
        code(lumipoint::connection_failed),
        help(
            "Check that the outlet (or `lumipoint serve`) is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(lumipoint::timeout),
        help("Increase the timeout with --timeout or check the device's network.")
    )]
    Timeout { url: String },

    #[error("No API base URL configured")]
    #[diagnostic(
        code(lumipoint::no_api_base),
        help(
            "Pass --api-base, set LUMIPOINT_API_BASE_URL, or run: lumipoint config init\n\
             Config file: {path}"
        )
    )]
    NoApiBase { path: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device request failed: {message}")]
    #[diagnostic(code(lumipoint::device_error))]
    Device { message: String },

    // ── Gateway ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(lumipoint::gateway),
        help("Another process may already be listening; try --listen with a different port.")
    )]
    Gateway(#[from] GatewayError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(lumipoint::validation))]
    Validation { field: String, reason: String },

    #[error("Nothing to change")]
    #[diagnostic(
        code(lumipoint::empty_update),
        help("Pass at least one of --night-light, --brightness, --off-timer.")
    )]
    EmptyUpdate,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(lumipoint::config),
        help("Inspect the effective values with: lumipoint config show")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(lumipoint::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Internal error: {0}")]
    #[diagnostic(code(lumipoint::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(lumipoint::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(lumipoint::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Device { .. } => exit_code::DEVICE,
            Self::NoApiBase { .. }
            | Self::Validation { .. }
            | Self::EmptyUpdate
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { url } => Self::Timeout { url },
            CoreError::NoApiBase => Self::NoApiBase {
                path: lumipoint_config::config_path().display().to_string(),
            },
            CoreError::Api { message, .. } => Self::Device { message },
            CoreError::Config { message } => Self::Validation {
                field: "api_base".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_status_errors_keep_the_request_line() {
        let err = CliError::from(CoreError::Api {
            message: "GET /state 500".into(),
            status: Some(500),
        });
        assert_eq!(err.to_string(), "Device request failed: GET /state 500");
        assert_eq!(err.exit_code(), exit_code::DEVICE);
    }

    #[test]
    fn missing_api_base_is_a_usage_error() {
        let err = CliError::from(CoreError::NoApiBase);
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn connection_failures_use_their_own_exit_code() {
        let err = CliError::from(CoreError::ConnectionFailed {
            url: "http://127.0.0.1:9/state".into(),
            reason: "refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }
}
