//! Application core: event loop, screen switching, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Tabs},
};
use throbber_widgets_tui::ThrobberState;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use lumipoint_core::display::duration_label;
use lumipoint_core::{CommandAction, ConnectionStatus, Controller, DashboardSnapshot};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::status_badge::render_status_badge;

/// How long a toast stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Latest controller snapshot, for the status bar.
    snapshot: Option<Arc<DashboardSnapshot>>,
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    throbber: ThrobberState,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            active_screen: ScreenId::default(),
            screens: create_screens().into_iter().collect(),
            running: true,
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            snapshot: None,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
            throbber: ThrobberState::default(),
        }
    }

    /// Run until the user quits. Starts the controller's poll and save
    /// tasks and shuts them down on the way out.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        self.controller.start().await?;
        tokio::spawn(crate::data_bridge::spawn_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // spinner + toast expiry
            Duration::from_millis(33),  // ~30 FPS
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render | Event::Resize => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        self.controller.shutdown().await;
        tui.exit();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key to an action. Dialogs and text entry take precedence over
    /// the global shortcuts; anything left goes to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };
        if screen.captures_keys() {
            return screen.handle_key_event(key);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(Some(Action::Quit)),
            KeyCode::Char('?') => return Ok(Some(Action::ToggleHelp)),
            KeyCode::Char(c @ '1'..='9') => {
                let target = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(ScreenId::from_number);
                return Ok(target.map(Action::SwitchScreen));
            }
            KeyCode::Tab => return Ok(Some(Action::SwitchScreen(self.active_screen.next()))),
            KeyCode::BackTab => return Ok(Some(Action::SwitchScreen(self.active_screen.prev()))),
            _ => {}
        }

        screen.handle_key_event(key)
    }

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Render => {}

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() > NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
                if self.status() == ConnectionStatus::Connecting {
                    self.throbber.calc_next();
                }
            }

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    self.active_screen = *target;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            // Every screen keeps its own copy so tab switches render at once.
            Action::SnapshotUpdated(snapshot) => {
                self.snapshot = Some(Arc::clone(snapshot));
                for screen in self.screens.values_mut() {
                    if let Some(follow_up) = screen.update(action)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }

            // ── Local edits: applied immediately, saved after the debounce ──
            Action::ToggleNightLight => self.controller.toggle_night_light_mode(),
            Action::AdjustBrightness(delta) => self.controller.adjust_brightness(*delta),
            Action::SetOffTimer(ms) => self.controller.set_off_timer_ms(*ms),

            Action::SetRefresh(interval) => self.change_refresh(Some(*interval)),
            Action::FasterRefresh => self.change_refresh(None),
            Action::ApplyApiBase(api_base) => self.apply_api_base(api_base.clone()),

            Action::SendCommand(command) => self.execute_command(*command),
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(*confirm),
            Action::ConfirmYes => {
                if let Some(ConfirmAction::Command(command)) = self.pending_confirm.take() {
                    self.execute_command(command);
                }
            }
            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),
        }
        Ok(())
    }

    fn status(&self) -> ConnectionStatus {
        self.snapshot
            .as_ref()
            .map_or(ConnectionStatus::Connecting, |s| s.status.clone())
    }

    // ── Controller calls ─────────────────────────────────────────

    /// Spawn a command POST. The toast reports the outcome; the next poll
    /// shows the device's new state.
    fn execute_command(&self, command: CommandAction) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match controller.send_command(command).await {
                Ok(()) => Notification::success(format!("Sent {command}")),
                Err(e) => {
                    warn!(%command, error = %e, "command failed");
                    Notification::error(format!("{command} failed: {e}"))
                }
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    /// `None` steps one notch faster; `Some` picks an exact interval.
    fn change_refresh(&self, interval: Option<Duration>) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let applied = match interval {
                Some(interval) => controller.set_poll_interval(interval).await,
                None => controller.faster_refresh().await,
            };
            let _ = tx.send(Action::Notify(Notification::info(format!(
                "Refreshing every {}",
                duration_label(applied)
            ))));
        });
    }

    fn apply_api_base(&self, api_base: Option<Url>) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match controller.set_api_base(api_base.clone()).await {
                Ok(()) => match api_base {
                    Some(url) => Notification::success(format!("Polling {url}")),
                    None => Notification::info("API base cleared; polling stopped"),
                },
                Err(e) => {
                    warn!(error = %e, "failed to apply API base");
                    Notification::error(e.to_string())
                }
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // [screen content] [tab bar] [status bar]
        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }
        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays, last is topmost.
        if let Some((ref notification, _)) = self.notification {
            render_notification(frame, area, notification);
        }
        if let Some(ref confirm) = self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", id.number(), id.label()), style))
            })
            .collect();

        let selected = ScreenId::ALL
            .iter()
            .position(|&s| s == self.active_screen)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(selected);
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let columns =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

        let badge_area = Rect {
            x: columns[0].x + 1,
            width: columns[0].width.saturating_sub(1),
            ..columns[0]
        };
        render_status_badge(frame, badge_area, &self.status(), &self.throbber);

        let (interval, api_base) = self.snapshot.as_ref().map_or_else(
            || (String::new(), "no API base".to_owned()),
            |s| {
                (
                    duration_label(s.poll_interval),
                    s.api_base
                        .as_ref()
                        .map_or_else(|| "no API base".to_owned(), ToString::to_string),
                )
            },
        );
        let hints = Line::from(vec![
            Span::styled(format!("⟳ {interval}  "), theme::key_hint()),
            Span::styled(format!("{api_base}  "), theme::label()),
            Span::styled("? ", theme::key_hint_key()),
            Span::styled("help  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit ", theme::key_hint()),
        ])
        .right_aligned();
        frame.render_widget(Paragraph::new(hints), columns[1]);
    }
}

// ── Overlays ─────────────────────────────────────────────────────────

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 58, 20);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_PANEL)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::AMBER));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(format!("  {text}"), Style::default().fg(theme::MOONLIGHT)))
    };
    let row = |keys: &'static str, text: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<12}"), theme::key_hint_key()),
            Span::styled(text, theme::key_hint()),
        ])
    };

    let help_text = vec![
        Line::from(""),
        heading("Navigation"),
        row("1-3", "Jump to tab"),
        row("Tab/S-Tab", "Next / previous tab"),
        row("q", "Quit"),
        Line::from(""),
        heading("Controls"),
        row("n", "Toggle night-light mode"),
        row("←/→", "Brightness ±1 (Shift or PgUp/PgDn ±16)"),
        row("[ / ]", "Auto-off timer"),
        row("o / f", "LED on / off"),
        row("r", "Reboot (asks first)"),
        row("+", "Faster refresh"),
        Line::from(""),
        heading("Settings"),
        row("e", "Edit API base, Enter to apply"),
        row("Ctrl-U", "Clear the input"),
        Line::from(""),
        Line::from(Span::styled("                 Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered(area, 54, 5);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_PANEL)),
        dialog_area,
    );

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::CAUTION_YELLOW));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(format!("  {confirm}"), theme::tab_inactive())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the tab and status bars.
fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let msg_len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
    let height = 3u16;
    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

    let (color, icon) = match notification.level {
        NotificationLevel::Success => (theme::ONLINE_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Info => (theme::MOONLIGHT, "·"),
    };

    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_PANEL)),
        toast_area,
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(color)),
        Span::styled(notification.message.clone(), theme::tab_inactive()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
mod tests {
    use lumipoint_core::ControllerConfig;
    use pretty_assertions::assert_eq;

    use super::*;

    fn app() -> App {
        App::new(Controller::new(ControllerConfig::default()))
    }

    fn press(app: &mut App, code: KeyCode) -> Option<Action> {
        app.handle_key_event(KeyEvent::from(code)).expect("key handling")
    }

    #[test]
    fn number_keys_and_tab_switch_screens() {
        let mut app = app();
        assert_eq!(
            press(&mut app, KeyCode::Char('2')),
            Some(Action::SwitchScreen(ScreenId::Telemetry))
        );
        assert_eq!(press(&mut app, KeyCode::Char('7')), None);
        assert_eq!(
            press(&mut app, KeyCode::BackTab),
            Some(Action::SwitchScreen(ScreenId::Settings))
        );
    }

    #[test]
    fn screen_keys_fall_through_to_the_active_screen() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char('n')), Some(Action::ToggleNightLight));
    }

    #[test]
    fn confirm_dialog_captures_input() {
        let mut app = app();
        app.process_action(&Action::ShowConfirm(ConfirmAction::Command(CommandAction::Reboot)))
            .expect("process");

        assert_eq!(press(&mut app, KeyCode::Char('q')), None);
        assert_eq!(press(&mut app, KeyCode::Char('y')), Some(Action::ConfirmYes));
        assert_eq!(press(&mut app, KeyCode::Esc), Some(Action::ConfirmNo));

        app.process_action(&Action::ConfirmNo).expect("process");
        assert!(app.pending_confirm.is_none());
        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(Action::Quit));
    }

    #[test]
    fn text_entry_swallows_global_shortcuts() {
        let mut app = app();
        app.process_action(&Action::SwitchScreen(ScreenId::Settings))
            .expect("process");
        assert_eq!(press(&mut app, KeyCode::Char('e')), None);

        assert_eq!(press(&mut app, KeyCode::Char('q')), None);
        assert_eq!(press(&mut app, KeyCode::Char('1')), None);
        assert_eq!(press(&mut app, KeyCode::Esc), None);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Some(Action::Quit));
    }

    #[test]
    fn edits_reach_the_controller() {
        let mut app = app();
        let before = app.controller.settings();
        app.process_action(&Action::ToggleNightLight).expect("process");
        app.process_action(&Action::AdjustBrightness(300)).expect("process");
        app.process_action(&Action::SetOffTimer(30_000)).expect("process");

        let after = app.controller.settings();
        assert_eq!(after.is_night_light_mode, !before.is_night_light_mode);
        assert_eq!(after.brightness, 255);
        assert_eq!(after.off_timer_ms, 30_000);
    }

    #[test]
    fn snapshot_updates_drive_the_status() {
        let mut app = app();
        assert_eq!(app.status(), ConnectionStatus::Connecting);

        let snapshot = Arc::new(crate::screens::test_snapshot());
        app.process_action(&Action::SnapshotUpdated(snapshot))
            .expect("process");
        assert_eq!(app.status(), ConnectionStatus::Online);
    }
}
