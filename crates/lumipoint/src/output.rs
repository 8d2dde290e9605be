//! Output formatting: table, JSON, YAML, plain.
//!
//! The device has a single record, so "table" is a two-column key/value
//! view rather than a list.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use lumipoint_core::display::{lux_label, motion_label, ms_to_label, on_off, updated_label};
use lumipoint_core::{ConnectionStatus, DeviceState};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status word for `watch` lines: green online, yellow connecting, red error.
pub fn status_label(status: &ConnectionStatus, color: bool) -> String {
    let text = match status {
        ConnectionStatus::Error(message) => format!("Error: {message}"),
        other => other.label().to_owned(),
    };
    if !color {
        return text;
    }
    match status {
        ConnectionStatus::Online => text.green().to_string(),
        ConnectionStatus::Connecting => text.yellow().to_string(),
        ConnectionStatus::Error(_) => text.red().to_string(),
    }
}

// ── Device record ────────────────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn device_rows(state: &DeviceState) -> Vec<FieldRow> {
    let row = |field, value: String| FieldRow { field, value };
    vec![
        row("Night light", on_off(state.is_night_light_mode).into()),
        row("Brightness", state.brightness.to_string()),
        row("Auto-off", ms_to_label(state.off_timer_ms)),
        row("Lux", lux_label(state.lux)),
        row("ADC", state.adc.to_string()),
        row("Motion", motion_label(state.motion).into()),
        row("LED", on_off(state.led_on).into()),
        row("Updated", updated_label(state.updated_at)),
    ]
}

/// `key=value` lines using the wire field names.
fn device_plain(state: &DeviceState) -> String {
    let updated = state
        .updated_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    [
        format!("isNightLightMode={}", state.is_night_light_mode),
        format!("brightness={}", state.brightness),
        format!("offTimerMs={}", state.off_timer_ms),
        format!("lux={}", state.lux),
        format!("adc={}", state.adc),
        format!("motion={}", state.motion),
        format!("ledOn={}", state.led_on),
        format!("updatedAt={updated}"),
    ]
    .join("\n")
}

/// Render the device record in the chosen format.
pub fn render_device(format: OutputFormat, state: &DeviceState) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(Table::new(device_rows(state))
            .with(Style::rounded())
            .to_string()),
        OutputFormat::Plain => Ok(device_plain(state)),
        structured => render_structured(structured, state),
    }
}

/// JSON / YAML rendering for any serializable value. `Table` and `Plain`
/// fall back to pretty JSON.
pub fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Json | OutputFormat::Table | OutputFormat::Plain => {
            serde_json::to_string_pretty(data)?
        }
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
mod tests {
    use lumipoint_core::mock_device_state;

    use super::*;

    #[test]
    fn table_shows_formatted_telemetry() {
        let out = render_device(OutputFormat::Table, &mock_device_state()).expect("render");
        assert!(out.contains("12.30 lx"));
        assert!(out.contains("Auto-off"));
        assert!(out.contains("5s"));
        assert!(out.contains("None"));
    }

    #[test]
    fn plain_uses_wire_names() {
        let out = render_device(OutputFormat::Plain, &mock_device_state()).expect("render");
        assert!(out.lines().any(|l| l == "brightness=120"));
        assert!(out.lines().any(|l| l == "ledOn=false"));
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_device(OutputFormat::JsonCompact, &mock_device_state()).expect("render");
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("\"offTimerMs\":5000"));
    }

    #[test]
    fn status_label_without_color_is_plain_text() {
        let status = ConnectionStatus::Error("GET /state 500".into());
        assert_eq!(status_label(&status, false), "Error: GET /state 500");
        assert_eq!(status_label(&ConnectionStatus::Online, false), "Online");
    }
}
