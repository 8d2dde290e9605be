// ── Display helpers ──
//
// Formatting shared by the CLI and the TUI so both render telemetry the
// same way.

use std::time::Duration;

use chrono::{DateTime, Local, Utc};

/// Auto-off choices offered by the dashboard, in milliseconds.
pub const OFF_TIMER_OPTIONS_MS: [i64; 8] =
    [2000, 5000, 10_000, 30_000, 60_000, 120_000, 300_000, 600_000];

/// Poll cadence choices offered by the dashboard, in milliseconds.
pub const REFRESH_OPTIONS_MS: [u64; 4] = [1000, 2000, 5000, 10_000];

/// Human label for a millisecond duration: `"750 ms"`, `"5s"`, `"2m"`,
/// `"1m 30s"`.
pub fn ms_to_label(ms: i64) -> String {
    if ms < 1000 {
        return format!("{ms} ms");
    }
    // Round half up to whole seconds.
    let secs = ms / 1000 + i64::from(ms % 1000 >= 500);
    if secs < 60 {
        return format!("{secs}s");
    }
    let (m, s) = (secs / 60, secs % 60);
    if s == 0 {
        format!("{m}m")
    } else {
        format!("{m}m {s}s")
    }
}

/// [`ms_to_label`] for a `Duration`.
pub fn duration_label(d: Duration) -> String {
    ms_to_label(i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
}

pub fn lux_label(lux: f64) -> String {
    format!("{lux:.2} lx")
}

pub fn on_off(on: bool) -> &'static str {
    if on { "On" } else { "Off" }
}

pub fn motion_label(motion: bool) -> &'static str {
    if motion { "Detected" } else { "None" }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

/// Local wall-clock time of an update stamp, or a placeholder dash.
pub fn updated_label(updated_at: Option<DateTime<Utc>>) -> String {
    updated_at.map_or_else(
        || "—".to_owned(),
        |t| t.with_timezone(&Local).format("%H:%M:%S").to_string(),
    )
}

/// Index of the option closest to `value`, for select widgets.
pub fn nearest_option<T>(options: &[T], value: T) -> usize
where
    T: Copy + Into<i128>,
{
    let target: i128 = value.into();
    options
        .iter()
        .enumerate()
        .min_by_key(|(_, o)| (Into::<i128>::into(**o) - target).abs())
        .map_or(0, |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_values_show_millis() {
        assert_eq!(ms_to_label(0), "0 ms");
        assert_eq!(ms_to_label(999), "999 ms");
    }

    #[test]
    fn seconds_round_to_nearest() {
        assert_eq!(ms_to_label(1000), "1s");
        assert_eq!(ms_to_label(1499), "1s");
        assert_eq!(ms_to_label(1500), "2s");
        assert_eq!(ms_to_label(5000), "5s");
        assert_eq!(ms_to_label(59_400), "59s");
    }

    #[test]
    fn minutes_drop_zero_seconds() {
        assert_eq!(ms_to_label(59_500), "1m");
        assert_eq!(ms_to_label(60_000), "1m");
        assert_eq!(ms_to_label(90_000), "1m 30s");
        assert_eq!(ms_to_label(600_000), "10m");
    }

    #[test]
    fn extreme_timers_do_not_overflow() {
        assert_eq!(ms_to_label(i64::MAX), "153722867280912m 56s");
        assert_eq!(ms_to_label(i64::MIN), "-9223372036854775808 ms");
        assert_eq!(duration_label(Duration::MAX), "153722867280912m 56s");
    }

    #[test]
    fn every_offered_timer_has_a_short_label() {
        let labels: Vec<_> = OFF_TIMER_OPTIONS_MS.iter().map(|ms| ms_to_label(*ms)).collect();
        assert_eq!(labels, ["2s", "5s", "10s", "30s", "1m", "2m", "5m", "10m"]);
    }

    #[test]
    fn telemetry_labels() {
        assert_eq!(lux_label(12.3), "12.30 lx");
        assert_eq!(on_off(false), "Off");
        assert_eq!(motion_label(true), "Detected");
        assert_eq!(yes_no(false), "No");
        assert_eq!(updated_label(None), "—");
    }

    #[test]
    fn nearest_option_snaps_unknown_values() {
        assert_eq!(nearest_option(&OFF_TIMER_OPTIONS_MS, 5000), 1);
        assert_eq!(nearest_option(&OFF_TIMER_OPTIONS_MS, 7000), 1);
        assert_eq!(nearest_option(&OFF_TIMER_OPTIONS_MS, 9_000_000), 7);
        assert_eq!(nearest_option(&REFRESH_OPTIONS_MS, 3000), 1);
    }
}
