use std::net::SocketAddr;

use thiserror::Error;

/// Failures that stop the gateway from starting or serving.
///
/// Per-request problems never surface here; they become HTTP responses.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("cannot bind gateway to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("upstream client setup failed: {0}")]
    Upstream(#[from] lumipoint_api::Error),

    #[error("gateway I/O error: {0}")]
    Io(#[from] std::io::Error),
}
