// ── HTTP surface ──

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use lumipoint_api::TransportConfig;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use crate::error::GatewayError;
use crate::gateway::Gateway;

/// Everything `serve` needs.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub listen: SocketAddr,
    /// `Some` selects proxy mode.
    pub upstream: Option<Url>,
    pub strict_patch: bool,
    /// Upstream request timeout.
    pub timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream: None,
            strict_patch: false,
            timeout: Duration::from_secs(10),
        }
    }
}

type AppState = Arc<Gateway>;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    mode: &'static str,
    version: &'static str,
}

/// Routes: `GET|PATCH /state`, `POST /command`, `GET /healthz`.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/state", get(get_state).patch(patch_state))
        .route("/command", post(post_command))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(trace_request))
        .with_state(Arc::new(gateway))
}

/// Bind the configured address and serve until `shutdown` fires.
pub async fn serve(settings: GatewaySettings, shutdown: CancellationToken) -> Result<(), GatewayError> {
    let transport = TransportConfig::default().with_timeout(settings.timeout);
    let gateway = Gateway::from_upstream(settings.upstream.clone(), &transport, settings.strict_patch)?;

    let listener = TcpListener::bind(settings.listen)
        .await
        .map_err(|source| GatewayError::Bind {
            addr: settings.listen,
            source,
        })?;
    serve_on(listener, gateway, shutdown).await
}

/// Serve on an already-bound listener until `shutdown` fires.
pub async fn serve_on(
    listener: TcpListener,
    gateway: Gateway,
    shutdown: CancellationToken,
) -> Result<(), GatewayError> {
    let addr = listener.local_addr()?;
    match &gateway {
        Gateway::Proxy(proxy) => {
            info!(%addr, upstream = %proxy.upstream(), "gateway listening (proxy mode)");
        }
        Gateway::Mock(_) => info!(%addr, "gateway listening (mock mode)"),
    }

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("gateway stopped");
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────

async fn get_state(State(gateway): State<AppState>) -> Response {
    gateway.get_state().await
}

async fn patch_state(State(gateway): State<AppState>, body: Bytes) -> Response {
    gateway.patch_state(body).await
}

async fn post_command(State(gateway): State<AppState>, body: Bytes) -> Response {
    gateway.command(body).await
}

async fn healthz(State(gateway): State<AppState>) -> impl IntoResponse {
    Json(Health {
        status: "ok",
        mode: gateway.mode(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn trace_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let resp = next.run(req).await;
    debug!(%method, %path, status = resp.status().as_u16(), "request");
    resp
}
