// lumipoint-api: Async Rust client for the nightlight outlet device-state API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DeviceClient, RawResponse};
pub use error::Error;
pub use models::{
    CommandAction, CommandRequest, DEFAULT_BRIGHTNESS, DEFAULT_OFF_TIMER_MS, DeviceState,
    Settings, StatePatch,
};
pub use transport::TransportConfig;

// Re-exported so the gateway can name forwarding methods without its own
// reqwest dependency.
pub use reqwest::Method;
