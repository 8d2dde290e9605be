//! Screen implementations. Each screen is a top-level [`Component`].

pub mod controls;
pub mod settings;
pub mod telemetry;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (ScreenId::Controls, Box::new(controls::ControlsScreen::new())),
        (ScreenId::Telemetry, Box::new(telemetry::TelemetryScreen::new())),
        (ScreenId::Settings, Box::new(settings::SettingsScreen::new())),
    ]
}

/// A snapshot with the mock device record, for screen tests.
#[cfg(test)]
pub(crate) fn test_snapshot() -> lumipoint_core::DashboardSnapshot {
    let device = lumipoint_core::mock_device_state();
    lumipoint_core::DashboardSnapshot {
        status: lumipoint_core::ConnectionStatus::Online,
        settings: device.settings(),
        device: Some(std::sync::Arc::new(device)),
        poll_interval: lumipoint_core::DEFAULT_POLL_INTERVAL,
        api_base: None,
    }
}
