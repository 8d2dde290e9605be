use thiserror::Error;

/// Top-level error type for the `lumipoint-api` crate.
///
/// Covers every failure mode of the device-state API: transport,
/// non-success HTTP status, and response decoding. `lumipoint-core` maps
/// these into the dashboard's connection status.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// The device answered with a non-2xx status.
    ///
    /// Rendered as `"<METHOD> <path> <status>"`, e.g. `GET /state 500`.
    #[error("{method} {path} {status}")]
    Status {
        method: &'static str,
        path: &'static str,
        status: u16,
        body: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
