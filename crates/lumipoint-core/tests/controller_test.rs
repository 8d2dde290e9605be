#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` polling, debounced saves, and commands.

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lumipoint_core::display::on_off;
use lumipoint_core::{
    CommandAction, ConnectionStatus, Controller, ControllerConfig, CoreError, DashboardSnapshot,
    MAX_POLL_INTERVAL,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn device_json(brightness: i64, led_on: bool) -> Value {
    json!({
        "isNightLightMode": false,
        "brightness": brightness,
        "offTimerMs": 5000,
        "ledOn": led_on,
        "lux": 12.3,
        "adc": 87,
        "motion": false,
        "updatedAt": "2026-03-01T08:30:00Z"
    })
}

/// Slow polls so only the immediate first poll lands inside a test, and a
/// short debounce to keep tests quick.
fn config_for(server: &MockServer) -> ControllerConfig {
    ControllerConfig {
        api_base: Some(Url::parse(&server.uri()).unwrap()),
        poll_interval: MAX_POLL_INTERVAL,
        save_debounce: Duration::from_millis(200),
        timeout: Duration::from_secs(5),
    }
}

async fn mount_state(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn wait_for(
    controller: &Controller,
    pred: impl Fn(&DashboardSnapshot) -> bool,
) -> DashboardSnapshot {
    let mut stream = controller.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snap = stream.latest();
            if pred(&snap) {
                return snap;
            }
            stream.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}

async fn requests(server: &MockServer, verb: &str) -> Vec<wiremock::Request> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == verb)
        .collect()
}

fn body(req: &wiremock::Request) -> Value {
    serde_json::from_slice(&req.body).unwrap()
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_first_poll_fills_mirrors_and_goes_online() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(77, true)).await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();

    let snap = wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;
    assert_eq!(snap.settings.brightness, 77);
    assert_eq!(snap.settings.off_timer_ms, 5000);
    assert!(snap.device.as_ref().unwrap().led_on);

    controller.shutdown().await;
}

#[tokio::test]
async fn test_poll_failure_sets_error_and_keeps_local_settings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.set_brightness(33);
    controller.set_night_light_mode(true);
    let before = controller.settings();

    controller.start().await.unwrap();
    let snap = wait_for(&controller, |s| s.status.is_error()).await;

    assert_eq!(snap.status.error_message(), Some("GET /state 500"));
    assert_eq!(snap.settings, before);
    assert!(snap.device.is_none());

    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_api_base_never_leaves_connecting() {
    let controller = Controller::new(ControllerConfig::default());
    controller.start().await.unwrap();
    controller.set_brightness(200);

    tokio::time::sleep(Duration::from_secs(60)).await;

    let snap = controller.snapshot();
    assert_eq!(snap.status, ConnectionStatus::Connecting);
    assert!(snap.device.is_none());
    assert!(matches!(controller.refresh().await, Err(CoreError::NoApiBase)));

    controller.shutdown().await;
}

// ── Debounced save ──────────────────────────────────────────────────

#[tokio::test]
async fn test_edit_burst_produces_one_patch_with_final_values() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(120, false)).await;
    Mock::given(method("PATCH"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_json(30, false)))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;

    for level in [10, 20, 30] {
        controller.set_brightness(level);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(700)).await;

    let patches = requests(&server, "PATCH").await;
    assert_eq!(patches.len(), 1);
    assert_eq!(
        body(&patches[0]),
        json!({ "isNightLightMode": false, "brightness": 30, "offTimerMs": 5000 })
    );

    controller.shutdown().await;
}

#[tokio::test]
async fn test_unchanged_payload_is_not_resent() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(120, false)).await;
    Mock::given(method("PATCH"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;

    // Same value the device already reported.
    controller.set_brightness(120);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(requests(&server, "PATCH").await.is_empty());

    controller.set_brightness(50);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(requests(&server, "PATCH").await.len(), 1);

    // Wander off and come back within one quiet period.
    controller.set_brightness(60);
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.set_brightness(50);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(requests(&server, "PATCH").await.len(), 1);

    controller.shutdown().await;
}

#[tokio::test]
async fn test_edits_before_baseline_are_not_written() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status.is_error()).await;

    controller.set_off_timer_ms(30_000);
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert!(requests(&server, "PATCH").await.is_empty());
    assert_eq!(controller.settings().off_timer_ms, 30_000);

    controller.shutdown().await;
}

#[tokio::test]
async fn test_save_failure_sets_error_without_rollback() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(120, false)).await;
    Mock::given(method("PATCH"))
        .and(path("/state"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;

    controller.set_brightness(250);
    let snap = wait_for(&controller, |s| s.status.is_error()).await;

    assert_eq!(snap.status.error_message(), Some("PATCH /state 500"));
    assert_eq!(snap.settings.brightness, 250);

    controller.shutdown().await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reboot_then_poll_shows_led_off() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(120, false)).await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;

    controller.send_command(CommandAction::Reboot).await.unwrap();
    assert!(!controller.status().is_error());

    let posted = requests(&server, "POST").await;
    assert_eq!(body(&posted[0]), json!({ "action": "REBOOT" }));

    controller.refresh().await.unwrap();
    let snap = controller.snapshot();
    let led = snap.device.as_ref().unwrap().led_on;
    assert_eq!(format!("LED: {}", on_off(led)), "LED: Off");

    controller.shutdown().await;
}

#[tokio::test]
async fn test_command_failure_then_success_clears_error() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(120, true)).await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;

    let err = controller.send_command(CommandAction::LedOff).await.unwrap_err();
    assert_eq!(err.to_string(), "POST /command 500");
    assert_eq!(
        controller.status(),
        ConnectionStatus::Error("POST /command 500".into())
    );

    controller.send_command(CommandAction::LedOff).await.unwrap();
    assert_eq!(controller.status(), ConnectionStatus::Online);

    controller.shutdown().await;
}

// ── API base changes ────────────────────────────────────────────────

#[tokio::test]
async fn test_api_base_change_resets_and_repolls() {
    let first = MockServer::start().await;
    mount_state(&first, device_json(10, false)).await;
    let second = MockServer::start().await;
    mount_state(&second, device_json(222, true)).await;

    let controller = Controller::new(config_for(&first));
    controller.start().await.unwrap();
    let snap = wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;
    assert_eq!(snap.settings.brightness, 10);

    controller.set_api_base(None).await.unwrap();
    let snap = controller.snapshot();
    assert_eq!(snap.status, ConnectionStatus::Connecting);
    assert!(snap.device.is_none());
    assert!(snap.api_base.is_none());

    let second_url = Url::parse(&second.uri()).unwrap();
    controller
        .set_api_base(Some(second_url.clone()))
        .await
        .unwrap();
    let snap = wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;
    assert_eq!(snap.settings.brightness, 222);
    assert_eq!(snap.api_base, Some(second_url));

    controller.shutdown().await;
}

#[tokio::test]
async fn test_slow_poll_from_previous_base_is_discarded() {
    let first = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/state"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(device_json(10, false))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&first)
        .await;
    let second = MockServer::start().await;
    mount_state(&second, device_json(222, true)).await;

    let controller = Controller::new(config_for(&first));
    controller.start().await.unwrap();
    let in_flight = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    controller
        .set_api_base(Some(Url::parse(&second.uri()).unwrap()))
        .await
        .unwrap();
    let snap = wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;
    assert_eq!(snap.settings.brightness, 222);

    // The old base answers late; its record must not land.
    in_flight.await.unwrap().unwrap();
    let snap = controller.snapshot();
    assert_eq!(snap.settings.brightness, 222);
    assert_eq!(snap.device.as_ref().map(|d| d.brightness), Some(222));
    assert_eq!(snap.status, ConnectionStatus::Online);

    controller.shutdown().await;
}

#[tokio::test]
async fn test_api_base_change_does_not_wait_for_slow_save() {
    let server = MockServer::start().await;
    mount_state(&server, device_json(10, false)).await;
    Mock::given(method("PATCH"))
        .and(path("/state"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(device_json(11, false))
                .set_delay(Duration::from_secs(4)),
        )
        .mount(&server)
        .await;

    let controller = Controller::new(ControllerConfig {
        poll_interval: Duration::from_secs(1),
        ..config_for(&server)
    });
    controller.start().await.unwrap();
    wait_for(&controller, |s| s.status == ConnectionStatus::Online).await;

    // Save goes out after the debounce; the next poll lands while it hangs.
    controller.adjust_brightness(1);
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(requests(&server, "PATCH").await.len(), 1);

    let started = std::time::Instant::now();
    controller.set_api_base(None).await.unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "set_api_base took {:?}",
        started.elapsed()
    );
    assert_eq!(controller.status(), ConnectionStatus::Connecting);

    controller.shutdown().await;
}

#[tokio::test]
async fn test_stream_yields_snapshots() {
    use tokio_stream::StreamExt;

    let server = MockServer::start().await;
    mount_state(&server, device_json(99, false)).await;

    let controller = Controller::new(config_for(&server));
    let mut stream = controller.subscribe().into_stream();
    controller.start().await.unwrap();

    let online = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(snap) = stream.next().await {
            if snap.status == ConnectionStatus::Online {
                return Some(snap);
            }
        }
        None
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(online.settings.brightness, 99);

    controller.shutdown().await;
}
