//! `watch`: run the dashboard controller and print a line per change.

use std::time::Duration;

use lumipoint_core::display::{lux_label, motion_label, ms_to_label, on_off};
use lumipoint_core::{Controller, ControllerConfig, DashboardSnapshot};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output;

/// One status/telemetry line. Telemetry is omitted until the first poll.
pub fn snapshot_line(snap: &DashboardSnapshot, color: bool) -> String {
    let status = output::status_label(&snap.status, color);
    let settings = format!(
        "night-light={} brightness={} auto-off={}",
        on_off(snap.settings.is_night_light_mode),
        snap.settings.brightness,
        ms_to_label(snap.settings.off_timer_ms),
    );
    match snap.device.as_deref() {
        Some(device) => format!(
            "{status}  lux={} adc={} motion={} led={}  {settings}",
            lux_label(device.lux),
            device.adc,
            motion_label(device.motion),
            on_off(device.led_on),
        ),
        None => format!("{status}  {settings}"),
    }
}

pub async fn handle(
    mut config: ControllerConfig,
    args: &WatchArgs,
    color: bool,
    quiet: bool,
) -> Result<(), CliError> {
    if config.api_base.is_none() {
        return Err(lumipoint_core::CoreError::NoApiBase.into());
    }
    if let Some(ms) = args.interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }

    let controller = Controller::new(config);
    let mut stream = controller.subscribe();
    controller.start().await?;

    let mut last = String::new();
    loop {
        let line = snapshot_line(stream.current(), color);
        if line != last {
            output::print_output(&line, quiet);
            last = line;
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = stream.changed() => {
                if next.is_none() {
                    break;
                }
            }
        }
    }

    controller.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lumipoint_core::{ConnectionStatus, Settings, mock_device_state};

    use super::*;

    fn snapshot(device: bool) -> DashboardSnapshot {
        DashboardSnapshot {
            status: ConnectionStatus::Online,
            device: device.then(|| Arc::new(mock_device_state())),
            settings: Settings::default(),
            poll_interval: Duration::from_secs(2),
            api_base: None,
        }
    }

    #[test]
    fn line_includes_telemetry_once_polled() {
        let line = snapshot_line(&snapshot(true), false);
        assert!(line.starts_with("Online"));
        assert!(line.contains("lux=12.30 lx"));
        assert!(line.contains("motion=None"));
        assert!(line.contains("auto-off=5s"));
    }

    #[test]
    fn line_without_device_shows_settings_only() {
        let line = snapshot_line(&snapshot(false), false);
        assert!(!line.contains("lux="));
        assert!(line.contains("brightness=120"));
    }
}
