//! Reactive data layer between `lumipoint-api` and UI consumers (CLI / TUI /
//! gateway).
//!
//! - **[`Controller`]**: dashboard facade. [`start()`](Controller::start)
//!   spawns a poll task (GET `/state` on an interval) and a debounced save
//!   task (PATCH `/state`), both restarted whenever the API base changes.
//!   [`Controller::oneshot()`] skips the tasks for single CLI invocations.
//!
//! - **[`DashboardStream`]**: subscription handle over the controller's
//!   `watch` channel. Exposes `current()` / `latest()` / `changed()` for TUI
//!   rendering.
//!
//! - **[`DeviceStore`]**: the mock device record served by the gateway when
//!   no upstream is configured. Lock-free read-copy-update merges.
//!
//! - **[`display`]**: shared telemetry formatting.

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    ControllerConfig, DEFAULT_POLL_INTERVAL, DEFAULT_SAVE_DEBOUNCE, MAX_POLL_INTERVAL,
    MIN_POLL_INTERVAL, clamp_poll_interval, parse_api_base,
};
pub use controller::{ConnectionStatus, Controller, DashboardSnapshot, MAX_BRIGHTNESS};
pub use error::CoreError;
pub use store::{DeviceStore, mock_device_state};
pub use stream::{DashboardStream, DashboardWatchStream};

// Wire types are part of the public surface.
pub use lumipoint_api::{
    CommandAction, CommandRequest, DeviceClient, DeviceState, RawResponse, Settings, StatePatch,
    TransportConfig,
};
