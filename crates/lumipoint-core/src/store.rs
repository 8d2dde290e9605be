// ── Device state store ──
//
// Process-local, non-durable device record served by the gateway in mock
// mode. The whole record is replaced on every write; the merge runs as a
// read-copy-update over `ArcSwap` so overlapping requests never lose an
// update.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, TimeDelta, Utc};
use lumipoint_api::{CommandAction, DeviceState, StatePatch};
use tokio::sync::watch;
use tracing::debug;

/// Record served by a freshly started mock device.
pub fn mock_device_state() -> DeviceState {
    DeviceState {
        is_night_light_mode: false,
        brightness: 120,
        off_timer_ms: 5000,
        led_on: false,
        lux: 12.3,
        adc: 87,
        motion: false,
        updated_at: Some(Utc::now()),
    }
}

/// Holder of the single device-state record.
pub struct DeviceStore {
    record: ArcSwap<DeviceState>,
    changes: watch::Sender<Arc<DeviceState>>,
}

impl DeviceStore {
    /// Store seeded with [`mock_device_state`].
    pub fn new() -> Self {
        Self::with_state(mock_device_state())
    }

    /// Store seeded with an explicit record.
    pub fn with_state(state: DeviceState) -> Self {
        let state = Arc::new(state);
        let (changes, _) = watch::channel(Arc::clone(&state));
        Self {
            record: ArcSwap::new(state),
            changes,
        }
    }

    /// Snapshot of the current record.
    pub fn get(&self) -> DeviceState {
        DeviceState::clone(&self.record.load())
    }

    /// Shallow-merge `patch`, stamp `updated_at`, and return the new record.
    ///
    /// No range validation is performed. The stamp is always strictly later
    /// than the previous one.
    pub fn patch(&self, patch: &StatePatch) -> DeviceState {
        let mut stored = None;
        self.record.rcu(|current| {
            let mut next = patch.merged_into(current);
            next.updated_at = Some(next_stamp(current.updated_at));
            let next = Arc::new(next);
            stored = Some(Arc::clone(&next));
            next
        });

        let latest = self.record.load_full();
        self.changes.send_replace(Arc::clone(&latest));

        let merged = stored.unwrap_or(latest);
        debug!(brightness = merged.brightness, led_on = merged.led_on, "device record patched");
        DeviceState::clone(&merged)
    }

    /// Apply a device command to the mock record.
    pub fn apply_command(&self, action: CommandAction) -> DeviceState {
        let patch = match action {
            CommandAction::LedOn => StatePatch {
                led_on: Some(true),
                ..StatePatch::default()
            },
            CommandAction::LedOff => StatePatch {
                led_on: Some(false),
                ..StatePatch::default()
            },
            CommandAction::Reboot => StatePatch {
                led_on: Some(false),
                motion: Some(false),
                ..StatePatch::default()
            },
        };
        self.patch(&patch)
    }

    /// Subscribe to record replacements.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DeviceState>> {
        self.changes.subscribe()
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

fn next_stamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_serves_mock_defaults() {
        let store = DeviceStore::new();
        let state = store.get();
        assert_eq!(state.brightness, 120);
        assert_eq!(state.off_timer_ms, 5000);
        assert_eq!(state.adc, 87);
        assert!((state.lux - 12.3).abs() < f64::EPSILON);
        assert!(!state.led_on);
        assert!(state.updated_at.is_some());
    }

    #[test]
    fn patch_changes_only_named_field_and_bumps_stamp() {
        let store = DeviceStore::new();
        let before = store.get();

        let after = store.patch(&StatePatch {
            brightness: Some(200),
            ..StatePatch::default()
        });

        assert_eq!(after.brightness, 200);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            DeviceState {
                brightness: before.brightness,
                updated_at: before.updated_at,
                ..after.clone()
            },
            before
        );
        assert_eq!(store.get(), after);
    }

    #[test]
    fn patch_does_not_validate_ranges() {
        let store = DeviceStore::new();
        let after = store.patch(&StatePatch {
            brightness: Some(-40),
            off_timer_ms: Some(i64::MAX),
            ..StatePatch::default()
        });
        assert_eq!(after.brightness, -40);
        assert_eq!(after.off_timer_ms, i64::MAX);
    }

    #[test]
    fn empty_patch_still_stamps() {
        let store = DeviceStore::new();
        let before = store.get();
        let after = store.patch(&StatePatch::default());
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.brightness, before.brightness);
    }

    #[test]
    fn stamp_is_monotonic_even_if_clock_lags() {
        let future = Utc::now() + TimeDelta::hours(1);
        let store = DeviceStore::with_state(DeviceState {
            updated_at: Some(future),
            ..DeviceState::default()
        });
        let after = store.patch(&StatePatch::default());
        assert_eq!(after.updated_at, Some(future + TimeDelta::microseconds(1)));
    }

    #[test]
    fn commands_drive_led_state() {
        let store = DeviceStore::new();
        assert!(store.apply_command(CommandAction::LedOn).led_on);
        assert!(!store.apply_command(CommandAction::LedOff).led_on);

        store.patch(&StatePatch {
            led_on: Some(true),
            motion: Some(true),
            ..StatePatch::default()
        });
        let rebooted = store.apply_command(CommandAction::Reboot);
        assert!(!rebooted.led_on);
        assert!(!rebooted.motion);
    }

    #[test]
    fn subscribers_see_replacements() {
        let store = DeviceStore::new();
        let mut rx = store.subscribe();
        store.patch(&StatePatch {
            adc: Some(512),
            ..StatePatch::default()
        });
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(rx.borrow_and_update().adc, 512);
    }

    #[test]
    fn concurrent_patches_each_get_a_distinct_stamp() {
        let store = Arc::new(DeviceStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| {
                            store
                                .patch(&StatePatch {
                                    brightness: Some(i),
                                    ..StatePatch::default()
                                })
                                .updated_at
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut stamps: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread panicked"))
            .collect();
        stamps.sort();
        stamps.dedup();
        assert_eq!(stamps.len(), 800);
        assert_eq!(store.get().updated_at, stamps.last().copied().flatten());
    }
}
