// Device-state HTTP client
//
// Wraps `reqwest::Client` with URL construction against a configurable API
// base and the three device endpoints. `forward` exposes a raw byte-level
// request used by the gateway's proxy mode, where bodies and statuses must
// be relayed untouched.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{CommandAction, CommandRequest, DeviceState, Settings, StatePatch};
use crate::transport::TransportConfig;

const STATE_PATH: &str = "/state";
const COMMAND_PATH: &str = "/command";

/// Raw response relayed by [`DeviceClient::forward`].
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// HTTP client for a device-state endpoint.
///
/// The base URL may carry a path prefix (`http://host/api`); endpoint paths
/// are appended to it verbatim.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DeviceClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The configured API base.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}{path}` with exactly one slash at the seam.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /state`, bypassing any HTTP cache.
    pub async fn get_state(&self) -> Result<DeviceState, Error> {
        let url = self.endpoint(STATE_PATH)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .send()
            .await?;

        let body = Self::check_status(resp, "GET", STATE_PATH).await?;
        Self::decode(&body)
    }

    /// `PATCH /state` with a partial record, returning the merged record.
    pub async fn patch_state(&self, patch: &StatePatch) -> Result<DeviceState, Error> {
        let body = self.send_patch(patch).await?;
        Self::decode(&body)
    }

    /// `PATCH /state` with the user-writable settings.
    ///
    /// Only the status matters here; the response body is not inspected.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), Error> {
        self.send_patch(settings).await.map(drop)
    }

    /// `POST /command` with `{"action": ...}`. The acknowledgement is the
    /// status code alone.
    pub async fn send_command(&self, action: CommandAction) -> Result<(), Error> {
        let url = self.endpoint(COMMAND_PATH)?;
        debug!(%action, "POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&CommandRequest { action })
            .send()
            .await?;

        Self::check_status(resp, "POST", COMMAND_PATH).await.map(drop)
    }

    /// Send `body` to `{base}{path}` and hand back the status and body
    /// bytes exactly as received. Non-2xx statuses are not errors here.
    pub async fn forward(
        &self,
        method: Method,
        path: &str,
        body: Option<Bytes>,
    ) -> Result<RawResponse, Error> {
        let url = self.endpoint(path)?;
        debug!("{} {} (forward)", method, url);

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if method == Method::GET {
            builder = builder.header(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        Ok(RawResponse { status, body })
    }

    // ── Helpers ──────────────────────────────────────────────────────

    async fn send_patch(&self, body: &(impl serde::Serialize + Sync)) -> Result<String, Error> {
        let url = self.endpoint(STATE_PATH)?;
        debug!("PATCH {}", url);

        let resp = self.http.patch(url).json(body).send().await?;
        Self::check_status(resp, "PATCH", STATE_PATH).await
    }

    /// Read the body, turning a non-2xx status into `Error::Status`.
    async fn check_status(
        resp: reqwest::Response,
        method: &'static str,
        path: &'static str,
    ) -> Result<String, Error> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                method,
                path,
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.to_owned(),
            }
        })
    }
}
