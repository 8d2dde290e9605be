// ── Gateway strategies ──
//
// Chosen once at startup: `Proxy` relays every request to the remote
// device-control service byte for byte, `Mock` serves the in-process
// `DeviceStore`. Handlers never look at configuration again.

use std::sync::Arc;

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use lumipoint_api::{CommandRequest, DeviceClient, Method, StatePatch, TransportConfig};
use lumipoint_core::DeviceStore;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

// ── Gateway ──────────────────────────────────────────────────────

/// The two ways the gateway can answer.
pub enum Gateway {
    Proxy(ProxyGateway),
    Mock(MockGateway),
}

impl Gateway {
    /// Proxy when `upstream` is set, mock otherwise.
    pub fn from_upstream(
        upstream: Option<Url>,
        transport: &TransportConfig,
        strict_patch: bool,
    ) -> Result<Self, GatewayError> {
        Ok(match upstream {
            Some(url) => Self::Proxy(ProxyGateway::new(url, transport)?),
            None => Self::Mock(MockGateway::new(Arc::new(DeviceStore::new()), strict_patch)),
        })
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Self::Proxy(_) => "proxy",
            Self::Mock(_) => "mock",
        }
    }

    pub async fn get_state(&self) -> Response {
        match self {
            Self::Proxy(proxy) => proxy.relay(Method::GET, "/state", None).await,
            Self::Mock(mock) => mock.get_state(),
        }
    }

    pub async fn patch_state(&self, body: Bytes) -> Response {
        match self {
            Self::Proxy(proxy) => proxy.relay(Method::PATCH, "/state", Some(body)).await,
            Self::Mock(mock) => mock.patch_state(&body),
        }
    }

    pub async fn command(&self, body: Bytes) -> Response {
        match self {
            Self::Proxy(proxy) => proxy.relay(Method::POST, "/command", Some(body)).await,
            Self::Mock(mock) => mock.command(&body),
        }
    }
}

// ── Proxy ────────────────────────────────────────────────────────

/// Transparent pass-through to a remote device-control service.
pub struct ProxyGateway {
    client: DeviceClient,
}

impl ProxyGateway {
    pub fn new(upstream: Url, transport: &TransportConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            client: DeviceClient::new(upstream, transport)?,
        })
    }

    pub fn upstream(&self) -> &Url {
        self.client.base_url()
    }

    /// Forward and relay status + body unchanged, labelled as JSON.
    /// Only a transport failure produces a response of our own (502).
    async fn relay(&self, method: Method, path: &str, body: Option<Bytes>) -> Response {
        match self.client.forward(method.clone(), path, body).await {
            Ok(raw) => {
                let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
                debug!(%method, path, status = raw.status, "relayed upstream response");
                (status, [(header::CONTENT_TYPE, "application/json")], raw.body).into_response()
            }
            Err(e) => {
                warn!(%method, path, error = %e, "upstream unreachable");
                error_response(StatusCode::BAD_GATEWAY, format!("upstream request failed: {e}"))
            }
        }
    }
}

// ── Mock ─────────────────────────────────────────────────────────

/// In-memory device backed by a [`DeviceStore`].
pub struct MockGateway {
    store: Arc<DeviceStore>,
    strict_patch: bool,
}

impl MockGateway {
    pub fn new(store: Arc<DeviceStore>, strict_patch: bool) -> Self {
        Self {
            store,
            strict_patch,
        }
    }

    fn get_state(&self) -> Response {
        Json(self.store.get()).into_response()
    }

    /// Lenient mode applies every field whose value fits its type and
    /// skips the rest; a body that isn't a JSON object becomes an empty
    /// patch (the record is still re-stamped). Strict mode rejects both
    /// with 400.
    fn patch_state(&self, body: &[u8]) -> Response {
        if self.strict_patch {
            return match serde_json::from_slice::<StatePatch>(body) {
                Ok(patch) => Json(self.store.patch(&patch)).into_response(),
                Err(e) => error_response(StatusCode::BAD_REQUEST, format!("invalid patch body: {e}")),
            };
        }

        let patch = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => {
                let (patch, rejected) = StatePatch::from_object_lenient(&fields);
                if !rejected.is_empty() {
                    warn!(fields = ?rejected, "ignoring PATCH fields of the wrong type");
                }
                patch
            }
            Ok(other) => {
                warn!(body = %other, "ignoring PATCH body that is not an object");
                StatePatch::default()
            }
            Err(e) => {
                warn!(error = %e, "ignoring malformed PATCH body");
                StatePatch::default()
            }
        };
        Json(self.store.patch(&patch)).into_response()
    }

    fn command(&self, body: &[u8]) -> Response {
        match serde_json::from_slice::<CommandRequest>(body) {
            Ok(CommandRequest { action }) => {
                debug!(%action, "mock command");
                Json(self.store.apply_command(action)).into_response()
            }
            Err(e) => error_response(StatusCode::BAD_REQUEST, format!("invalid command: {e}")),
        }
    }
}
