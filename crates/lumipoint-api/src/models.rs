// Device-state wire types
//
// JSON shapes exchanged with the nightlight outlet (or the gateway standing
// in for it). Keys are camelCase on the wire. Every field of `DeviceState`
// carries `#[serde(default)]` because firmware builds disagree about which
// telemetry fields they report.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

/// Brightness used when the device omits the field.
pub const DEFAULT_BRIGHTNESS: i64 = 120;
/// Auto-off delay used when the device omits the field.
pub const DEFAULT_OFF_TIMER_MS: i64 = 5000;

// ── Device state ─────────────────────────────────────────────────────

/// Full device-state record returned by `GET /state` and `PATCH /state`.
///
/// Integer fields are wide and signed so out-of-range values reported by
/// the device (or written by a careless client) survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceState {
    /// Night-light mode forces the LED to a fixed brightness, ignoring motion.
    pub is_night_light_mode: bool,
    /// Nominally 0–255.
    pub brightness: i64,
    pub off_timer_ms: i64,
    pub led_on: bool,
    pub lux: f64,
    pub adc: i64,
    pub motion: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            is_night_light_mode: false,
            brightness: DEFAULT_BRIGHTNESS,
            off_timer_ms: DEFAULT_OFF_TIMER_MS,
            led_on: false,
            lux: 0.0,
            adc: 0,
            motion: false,
            updated_at: None,
        }
    }
}

impl DeviceState {
    /// The user-writable subset of this record.
    pub fn settings(&self) -> Settings {
        Settings {
            is_night_light_mode: self.is_night_light_mode,
            brightness: self.brightness,
            off_timer_ms: self.off_timer_ms,
        }
    }
}

// ── Partial update ───────────────────────────────────────────────────

/// Partial device state accepted by `PATCH /state`.
///
/// Unset fields are omitted on the wire and leave the stored value alone.
/// Unknown keys are ignored when parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_night_light_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub off_timer_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_on: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lux: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adc: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatePatch {
    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Field-by-field parse of a JSON object. Each known key whose value
    /// fits its field type is kept; the names of keys that don't fit are
    /// returned alongside. Unknown keys are ignored.
    pub fn from_object_lenient(fields: &Map<String, Value>) -> (Self, Vec<String>) {
        let mut rejected = Vec::new();
        let patch = Self {
            is_night_light_mode: lenient_field(fields, "isNightLightMode", &mut rejected),
            brightness: lenient_field(fields, "brightness", &mut rejected),
            off_timer_ms: lenient_field(fields, "offTimerMs", &mut rejected),
            led_on: lenient_field(fields, "ledOn", &mut rejected),
            lux: lenient_field(fields, "lux", &mut rejected),
            adc: lenient_field(fields, "adc", &mut rejected),
            motion: lenient_field(fields, "motion", &mut rejected),
            updated_at: lenient_field(fields, "updatedAt", &mut rejected),
        };
        (patch, rejected)
    }

    /// Shallow-merge the set fields over `base`.
    ///
    /// `updated_at` is copied like any other field; stamping the merge time
    /// is the store's job.
    pub fn merged_into(&self, base: &DeviceState) -> DeviceState {
        DeviceState {
            is_night_light_mode: self.is_night_light_mode.unwrap_or(base.is_night_light_mode),
            brightness: self.brightness.unwrap_or(base.brightness),
            off_timer_ms: self.off_timer_ms.unwrap_or(base.off_timer_ms),
            led_on: self.led_on.unwrap_or(base.led_on),
            lux: self.lux.unwrap_or(base.lux),
            adc: self.adc.unwrap_or(base.adc),
            motion: self.motion.unwrap_or(base.motion),
            updated_at: self.updated_at.or(base.updated_at),
        }
    }
}

fn lenient_field<T: DeserializeOwned>(
    fields: &Map<String, Value>,
    key: &str,
    rejected: &mut Vec<String>,
) -> Option<T> {
    let value = fields.get(key)?;
    match Option::<T>::deserialize(value) {
        Ok(parsed) => parsed,
        Err(_) => {
            rejected.push(key.to_owned());
            None
        }
    }
}

// ── Settings ─────────────────────────────────────────────────────────

/// The user-writable triple persisted by the dashboard's debounced save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub is_night_light_mode: bool,
    pub brightness: i64,
    pub off_timer_ms: i64,
}

impl Default for Settings {
    fn default() -> Self {
        DeviceState::default().settings()
    }
}

impl From<Settings> for StatePatch {
    fn from(s: Settings) -> Self {
        Self {
            is_night_light_mode: Some(s.is_night_light_mode),
            brightness: Some(s.brightness),
            off_timer_ms: Some(s.off_timer_ms),
            ..Self::default()
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────

/// One-shot device command sent to `POST /command`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandAction {
    LedOn,
    LedOff,
    Reboot,
}

/// Request body for `POST /command`: `{"action": "LED_ON"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub action: CommandAction,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn device_state_uses_camel_case_keys() {
        let state: DeviceState = serde_json::from_value(json!({
            "isNightLightMode": true,
            "brightness": 200,
            "offTimerMs": 30000,
            "ledOn": true,
            "lux": 4.5,
            "adc": 300,
            "motion": true,
            "updatedAt": "2026-03-01T12:00:00Z"
        }))
        .expect("valid state");

        assert!(state.is_night_light_mode);
        assert_eq!(state.brightness, 200);
        assert_eq!(state.off_timer_ms, 30000);
        assert!(state.updated_at.is_some());
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let state: DeviceState =
            serde_json::from_value(json!({ "lux": 1.0, "ledOn": true })).expect("valid state");
        assert_eq!(state.brightness, DEFAULT_BRIGHTNESS);
        assert_eq!(state.off_timer_ms, DEFAULT_OFF_TIMER_MS);
        assert!(!state.is_night_light_mode);
        assert!(state.led_on);
    }

    #[test]
    fn patch_skips_unset_fields_and_ignores_unknown_keys() {
        let patch: StatePatch =
            serde_json::from_value(json!({ "brightness": 42, "colour": "red" })).expect("patch");
        assert_eq!(patch.brightness, Some(42));
        assert_eq!(serde_json::to_value(&patch).expect("ser"), json!({ "brightness": 42 }));
    }

    #[test]
    fn merge_overwrites_only_set_fields() {
        let base = DeviceState {
            lux: 12.3,
            adc: 87,
            ..DeviceState::default()
        };
        let patch = StatePatch {
            brightness: Some(300),
            motion: Some(true),
            ..StatePatch::default()
        };
        let merged = patch.merged_into(&base);
        assert_eq!(merged.brightness, 300);
        assert!(merged.motion);
        assert_eq!(merged.adc, 87);
        assert!((merged.lux - 12.3).abs() < f64::EPSILON);
    }

    #[test]
    fn settings_convert_to_full_patch() {
        let patch = StatePatch::from(Settings {
            is_night_light_mode: true,
            brightness: 10,
            off_timer_ms: 2000,
        });
        assert_eq!(
            serde_json::to_value(&patch).expect("ser"),
            json!({ "isNightLightMode": true, "brightness": 10, "offTimerMs": 2000 })
        );
        assert!(!patch.is_empty());
        assert!(StatePatch::default().is_empty());
    }

    #[test]
    fn lenient_parse_keeps_fields_that_fit() {
        let body = json!({
            "brightness": 200,
            "lux": "bright",
            "adc": 127.5,
            "ledOn": null,
            "colour": "red"
        });
        let fields = body.as_object().expect("object");

        let (patch, mut rejected) = StatePatch::from_object_lenient(fields);
        rejected.sort();

        assert_eq!(
            patch,
            StatePatch {
                brightness: Some(200),
                ..StatePatch::default()
            }
        );
        assert_eq!(rejected, ["adc", "lux"]);
    }

    #[test]
    fn command_actions_serialize_screaming_snake() {
        let body = CommandRequest {
            action: CommandAction::LedOff,
        };
        assert_eq!(serde_json::to_value(body).expect("ser"), json!({ "action": "LED_OFF" }));
        assert_eq!(CommandAction::Reboot.to_string(), "REBOOT");
        assert_eq!("LED_ON".parse::<CommandAction>().ok(), Some(CommandAction::LedOn));
    }
}
