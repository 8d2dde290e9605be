// ── Dashboard controller ──
//
// Client-side view state for one outlet: local mirrors of the writable
// settings, the last polled device record, connection status, and poll
// cadence. Two background tasks do the talking: a poll task (GET /state on
// an interval) and a save task (debounced PATCH /state). Both are bound to
// a generation; changing the API base bumps it and restarts them, and any
// result carrying an older generation is dropped on the floor.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use lumipoint_api::{
    CommandAction, DeviceClient, DeviceState, Settings, StatePatch, TransportConfig,
};
use strum::IntoStaticStr;
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ControllerConfig, MIN_POLL_INTERVAL, POLL_STEP, clamp_poll_interval};
use crate::error::CoreError;
use crate::stream::DashboardStream;

/// Upper bound of the brightness slider.
pub const MAX_BRIGHTNESS: i64 = 255;

// ── ConnectionStatus ─────────────────────────────────────────────

/// Connection status observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
pub enum ConnectionStatus {
    /// No response yet (or no API base configured).
    Connecting,
    /// The last fetch succeeded.
    Online,
    /// The last fetch, save, or command failed.
    Error(String),
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        self.into()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

// ── DashboardSnapshot ────────────────────────────────────────────

/// Everything a dashboard needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub status: ConnectionStatus,
    /// Last successfully polled record (telemetry source). `None` until
    /// the first poll of the current API base succeeds.
    pub device: Option<Arc<DeviceState>>,
    /// Local mirror of the writable settings.
    pub settings: Settings,
    pub poll_interval: Duration,
    pub api_base: Option<Url>,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. A controller that has been
/// [`shutdown`](Self::shutdown) cannot be started again.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    transport: TransportConfig,
    snapshot: watch::Sender<DashboardSnapshot>,
    client: ArcSwapOption<DeviceClient>,
    /// Bumped on every API base change.
    generation: AtomicU64,
    started: AtomicBool,
    /// Signalled on every local settings edit.
    edits: Notify,
    /// Guards result application against concurrent API base changes.
    sync: Mutex<SyncState>,
    cancel: CancellationToken,
    poll_task: Mutex<Option<TaskSlot>>,
    save_task: Mutex<Option<TaskSlot>>,
}

#[derive(Default)]
struct SyncState {
    /// Settings the device is known to hold: the last successful PATCH
    /// payload or the settings reported by the last poll.
    last_sent: Option<Settings>,
}

struct TaskSlot {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TaskSlot {
    async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT touch the
    /// network; call [`start()`](Self::start) to begin polling.
    pub fn new(config: ControllerConfig) -> Self {
        let (snapshot, _) = watch::channel(DashboardSnapshot {
            status: ConnectionStatus::Connecting,
            device: None,
            settings: Settings::default(),
            poll_interval: clamp_poll_interval(config.poll_interval),
            api_base: config.api_base.clone(),
        });
        let transport = TransportConfig::default().with_timeout(config.timeout);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                transport,
                snapshot,
                client: ArcSwapOption::empty(),
                generation: AtomicU64::new(0),
                started: AtomicBool::new(false),
                edits: Notify::new(),
                sync: Mutex::new(SyncState::default()),
                cancel: CancellationToken::new(),
                poll_task: Mutex::new(None),
                save_task: Mutex::new(None),
            }),
        }
    }

    /// A controller with its client ready but no background tasks, for
    /// single CLI invocations.
    pub fn oneshot(config: ControllerConfig) -> Result<Self, CoreError> {
        let controller = Self::new(config);
        let client = controller.build_client(controller.inner.config.api_base.as_ref())?;
        controller.inner.client.store(client);
        Ok(controller)
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> DashboardStream {
        DashboardStream::new(self.inner.snapshot.subscribe())
    }

    pub fn status(&self) -> ConnectionStatus {
        self.inner.snapshot.borrow().status.clone()
    }

    pub fn settings(&self) -> Settings {
        self.inner.snapshot.borrow().settings
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start polling the configured API base. With no API base the
    /// controller stays idle in `Connecting`.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let api_base = self.inner.config.api_base.clone();
        self.set_api_base(api_base).await
    }

    /// Cancel both background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.stop_tasks().await;
        debug!("controller shut down");
    }

    /// Point the dashboard at a new API base (or none).
    ///
    /// Cancels both tasks, forgets the device record and save baseline,
    /// resets status to `Connecting`, then restarts the tasks if the
    /// controller is running.
    pub async fn set_api_base(&self, api_base: Option<Url>) -> Result<(), CoreError> {
        let client = self.build_client(api_base.as_ref())?;
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.stop_tasks().await;
        self.inner.client.store(client);

        {
            let mut sync = self.inner.sync.lock().await;
            sync.last_sent = None;
            self.inner.snapshot.send_modify(|s| {
                s.api_base.clone_from(&api_base);
                s.device = None;
                s.status = ConnectionStatus::Connecting;
            });
        }

        match &api_base {
            Some(url) => info!(api_base = %url, generation, "API base set"),
            None => info!(generation, "API base cleared; polling disabled"),
        }

        if self.inner.started.load(Ordering::SeqCst) {
            self.spawn_tasks(generation).await;
        }
        Ok(())
    }

    /// Change the poll cadence (clamped to 1–10 s) and restart polling.
    /// Returns the interval actually applied.
    pub async fn set_poll_interval(&self, interval: Duration) -> Duration {
        let interval = clamp_poll_interval(interval);
        let changed = self.inner.snapshot.send_if_modified(|s| {
            if s.poll_interval == interval {
                return false;
            }
            s.poll_interval = interval;
            true
        });
        if changed && self.inner.started.load(Ordering::SeqCst) {
            if let Some(client) = self.inner.client.load_full() {
                let generation = self.inner.generation.load(Ordering::SeqCst);
                self.spawn_poll(client, generation, interval).await;
            }
        }
        interval
    }

    /// Shorten the poll cadence by one step, never below 1 s.
    pub async fn faster_refresh(&self) -> Duration {
        let current = self.inner.snapshot.borrow().poll_interval;
        let next = current.saturating_sub(POLL_STEP).max(MIN_POLL_INTERVAL);
        self.set_poll_interval(next).await
    }

    // ── Local edits ──────────────────────────────────────────────

    pub fn set_night_light_mode(&self, on: bool) {
        self.edit(|s| s.is_night_light_mode = on);
    }

    pub fn toggle_night_light_mode(&self) {
        self.edit(|s| s.is_night_light_mode = !s.is_night_light_mode);
    }

    /// Set brightness, clamped to `0..=255`.
    pub fn set_brightness(&self, brightness: i64) {
        self.edit(|s| s.brightness = brightness.clamp(0, MAX_BRIGHTNESS));
    }

    pub fn adjust_brightness(&self, delta: i64) {
        self.edit(|s| s.brightness = s.brightness.saturating_add(delta).clamp(0, MAX_BRIGHTNESS));
    }

    pub fn set_off_timer_ms(&self, off_timer_ms: i64) {
        self.edit(|s| s.off_timer_ms = off_timer_ms.max(0));
    }

    /// Replace all three settings at once.
    pub fn update_settings(&self, settings: Settings) {
        self.edit(|s| *s = settings);
    }

    fn edit(&self, f: impl FnOnce(&mut Settings)) {
        self.inner.snapshot.send_modify(|snap| f(&mut snap.settings));
        self.inner.edits.notify_one();
    }

    // ── Requests ─────────────────────────────────────────────────

    /// POST a one-shot command. No local state changes optimistically; the
    /// next poll shows the device's answer.
    pub async fn send_command(&self, action: CommandAction) -> Result<(), CoreError> {
        let client = self.inner.client.load_full().ok_or(CoreError::NoApiBase)?;
        let generation = self.inner.generation.load(Ordering::SeqCst);
        info!(%action, "sending command");

        let result = client.send_command(action).await.map_err(CoreError::from);
        if self.inner.generation.load(Ordering::SeqCst) == generation {
            match &result {
                Ok(()) => self.clear_error(),
                Err(e) => {
                    warn!(%action, error = %e, "command failed");
                    self.set_status(ConnectionStatus::Error(e.to_string()));
                }
            }
        }
        result
    }

    /// Poll once, outside the regular cadence.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let client = self.inner.client.load_full().ok_or(CoreError::NoApiBase)?;
        let generation = self.inner.generation.load(Ordering::SeqCst);
        let result = client.get_state().await.map_err(CoreError::from);
        self.apply_poll(generation, &self.inner.cancel, result).await
    }

    /// Fetch the device record without touching dashboard state.
    pub async fn fetch_state(&self) -> Result<DeviceState, CoreError> {
        let client = self.inner.client.load_full().ok_or(CoreError::NoApiBase)?;
        Ok(client.get_state().await?)
    }

    /// Write a partial record immediately (no debounce) and return the
    /// device's merged record.
    pub async fn patch_state(&self, patch: &StatePatch) -> Result<DeviceState, CoreError> {
        let client = self.inner.client.load_full().ok_or(CoreError::NoApiBase)?;
        Ok(client.patch_state(patch).await?)
    }

    // ── Result application ───────────────────────────────────────

    fn is_current(&self, generation: u64, cancel: &CancellationToken) -> bool {
        !cancel.is_cancelled() && self.inner.generation.load(Ordering::SeqCst) == generation
    }

    async fn apply_poll(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        result: Result<DeviceState, CoreError>,
    ) -> Result<(), CoreError> {
        let mut sync = self.inner.sync.lock().await;
        if !self.is_current(generation, cancel) {
            debug!(generation, "discarding superseded poll result");
            return Ok(());
        }

        match result {
            Ok(device) => {
                let settings = device.settings();
                sync.last_sent = Some(settings);
                let device = Arc::new(device);
                self.inner.snapshot.send_modify(|s| {
                    s.settings = settings;
                    s.device = Some(device);
                    s.status = ConnectionStatus::Online;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "poll failed");
                self.set_status(ConnectionStatus::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Write the local settings if a baseline exists and they differ from
    /// what the device already holds. `sync` is not held across the PATCH.
    async fn flush_settings(
        &self,
        client: &DeviceClient,
        generation: u64,
        cancel: &CancellationToken,
    ) {
        let payload = {
            let sync = self.inner.sync.lock().await;
            let (has_baseline, payload) = {
                let snap = self.inner.snapshot.borrow();
                (snap.device.is_some(), snap.settings)
            };
            if !has_baseline {
                debug!("no device baseline yet; skipping save");
                return;
            }
            if sync.last_sent == Some(payload) {
                debug!("settings unchanged; skipping save");
                return;
            }
            payload
        };

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = client.save_settings(&payload) => result,
        };

        let mut sync = self.inner.sync.lock().await;
        if !self.is_current(generation, cancel) {
            debug!(generation, "discarding superseded save result");
            return;
        }

        match result {
            Ok(()) => {
                debug!(?payload, "settings saved");
                sync.last_sent = Some(payload);
                self.clear_error();
            }
            Err(e) => {
                let e = CoreError::from(e);
                warn!(error = %e, "save failed");
                self.set_status(ConnectionStatus::Error(e.to_string()));
            }
        }
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.inner.snapshot.send_if_modified(|s| {
            if s.status == status {
                return false;
            }
            s.status = status;
            true
        });
    }

    /// Drop an error status, falling back to `Online` when a device record
    /// is known and `Connecting` otherwise.
    fn clear_error(&self) {
        self.inner.snapshot.send_if_modified(|s| {
            if !s.status.is_error() {
                return false;
            }
            s.status = if s.device.is_some() {
                ConnectionStatus::Online
            } else {
                ConnectionStatus::Connecting
            };
            true
        });
    }

    // ── Task management ──────────────────────────────────────────

    fn build_client(&self, api_base: Option<&Url>) -> Result<Option<Arc<DeviceClient>>, CoreError> {
        let client = api_base
            .map(|url| DeviceClient::new(url.clone(), &self.inner.transport))
            .transpose()?;
        Ok(client.map(Arc::new))
    }

    async fn spawn_tasks(&self, generation: u64) {
        let Some(client) = self.inner.client.load_full() else {
            debug!("no API base; background tasks idle");
            return;
        };

        let interval = self.inner.snapshot.borrow().poll_interval;
        self.spawn_poll(Arc::clone(&client), generation, interval)
            .await;

        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(save_task(
            self.clone(),
            client,
            generation,
            self.inner.config.save_debounce,
            cancel.clone(),
        ));
        if let Some(old) = self
            .inner
            .save_task
            .lock()
            .await
            .replace(TaskSlot { cancel, handle })
        {
            old.stop().await;
        }
    }

    async fn spawn_poll(&self, client: Arc<DeviceClient>, generation: u64, interval: Duration) {
        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(poll_task(
            self.clone(),
            client,
            generation,
            interval,
            cancel.clone(),
        ));
        debug!(generation, ?interval, "poll task started");

        let old = self
            .inner
            .poll_task
            .lock()
            .await
            .replace(TaskSlot { cancel, handle });
        if let Some(old) = old {
            old.stop().await;
        }
    }

    /// Cancel both tasks before joining either, so neither waits on the
    /// other's in-flight request.
    async fn stop_tasks(&self) {
        let poll = self.inner.poll_task.lock().await.take();
        let save = self.inner.save_task.lock().await.take();
        let slots: Vec<TaskSlot> = [poll, save].into_iter().flatten().collect();
        for slot in &slots {
            slot.cancel.cancel();
        }
        for slot in slots {
            let _ = slot.handle.await;
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// GET /state immediately, then once per `period`.
async fn poll_task(
    controller: Controller,
    client: Arc<DeviceClient>,
    generation: u64,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        debug!(generation, "poll tick");
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = client.get_state() => result.map_err(CoreError::from),
        };
        let _ = controller.apply_poll(generation, &cancel, result).await;
    }
}

/// Wait for an edit, then for `debounce` of quiet, then flush.
async fn save_task(
    controller: Controller,
    client: Arc<DeviceClient>,
    generation: u64,
    debounce: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = controller.inner.edits.notified() => {}
        }

        // Every further edit restarts the quiet period.
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return,
                () = controller.inner.edits.notified() => {}
                () = tokio::time::sleep(debounce) => break,
            }
        }

        controller
            .flush_settings(&client, generation, &cancel)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels() {
        assert_eq!(ConnectionStatus::Connecting.label(), "Connecting");
        assert_eq!(ConnectionStatus::Online.label(), "Online");
        let err = ConnectionStatus::Error("GET /state 500".into());
        assert_eq!(err.label(), "Error");
        assert_eq!(err.error_message(), Some("GET /state 500"));
    }

    #[tokio::test]
    async fn edits_clamp_and_update_snapshot() {
        let controller = Controller::new(ControllerConfig::default());
        controller.set_brightness(999);
        assert_eq!(controller.settings().brightness, MAX_BRIGHTNESS);
        controller.adjust_brightness(-300);
        assert_eq!(controller.settings().brightness, 0);
        controller.set_off_timer_ms(-5);
        assert_eq!(controller.settings().off_timer_ms, 0);
        controller.toggle_night_light_mode();
        assert!(controller.settings().is_night_light_mode);

        let replaced = Settings {
            is_night_light_mode: false,
            brightness: 42,
            off_timer_ms: 30_000,
        };
        controller.update_settings(replaced);
        assert_eq!(controller.settings(), replaced);
    }

    #[tokio::test]
    async fn poll_interval_is_clamped_without_api_base() {
        let controller = Controller::new(ControllerConfig::default());
        controller.start().await.expect("start");
        assert_eq!(
            controller.set_poll_interval(Duration::from_millis(200)).await,
            MIN_POLL_INTERVAL
        );
        assert_eq!(
            controller.set_poll_interval(Duration::from_secs(3)).await,
            Duration::from_secs(3)
        );
        assert_eq!(controller.faster_refresh().await, Duration::from_millis(2500));
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn faster_refresh_stops_at_floor() {
        let controller = Controller::new(ControllerConfig::default());
        for _ in 0..10 {
            controller.faster_refresh().await;
        }
        assert_eq!(controller.snapshot().poll_interval, MIN_POLL_INTERVAL);
    }

    #[tokio::test]
    async fn commands_without_api_base_are_rejected() {
        let controller = Controller::new(ControllerConfig::default());
        let result = controller.send_command(CommandAction::Reboot).await;
        assert!(matches!(result, Err(CoreError::NoApiBase)));
        assert_eq!(controller.status(), ConnectionStatus::Connecting);
    }
}
