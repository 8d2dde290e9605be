//! Settings tab: API base text input and a danger zone with the device
//! commands.
//!
//! The input is idle until `e` or Enter starts editing. While editing it
//! captures every key; Enter applies, Ctrl-U clears, Esc discards.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tui_input::{Input, InputRequest};

use lumipoint_core::display::duration_label;
use lumipoint_core::{CommandAction, DashboardSnapshot, parse_api_base};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;

#[derive(Default)]
pub struct SettingsScreen {
    snapshot: Option<Arc<DashboardSnapshot>>,
    api_input: Input,
    editing: bool,
    error: Option<String>,
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_api_base(&self) -> String {
        self.snapshot
            .as_ref()
            .and_then(|s| s.api_base.as_ref())
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn reset_input(&mut self) {
        self.api_input = Input::new(self.current_api_base());
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => match parse_api_base(self.api_input.value()) {
                Ok(url) => {
                    self.editing = false;
                    self.error = None;
                    return Some(Action::ApplyApiBase(url));
                }
                Err(e) => self.error = Some(e.to_string()),
            },
            KeyCode::Esc => {
                self.editing = false;
                self.error = None;
                self.reset_input();
            }
            KeyCode::Char('u') if ctrl => {
                self.api_input.reset();
                self.error = None;
            }
            _ => {
                if let Some(request) = input_request(key) {
                    self.api_input.handle(request);
                    self.error = None;
                }
            }
        }
        None
    }

    fn render_api_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Device API ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "API base URL (blank disables polling)",
                theme::label(),
            )),
            rows[0],
        );
        self.render_input(frame, rows[1]);

        let feedback = match &self.error {
            Some(msg) => Span::styled(msg.clone(), Style::default().fg(theme::ERROR_RED)),
            None => {
                let refresh = self
                    .snapshot
                    .as_ref()
                    .map(|s| duration_label(s.poll_interval))
                    .unwrap_or_default();
                Span::styled(format!("Polling every {refresh}"), theme::label())
            }
        };
        frame.render_widget(Paragraph::new(feedback), rows[2]);

        let hints = if self.editing {
            vec![
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("apply  ", theme::key_hint()),
                Span::styled("Ctrl-U ", theme::key_hint_key()),
                Span::styled("clear  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]
        } else {
            vec![
                Span::styled("e ", theme::key_hint_key()),
                Span::styled("edit", theme::key_hint()),
            ]
        };
        frame.render_widget(Paragraph::new(Line::from(hints)), rows[3]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let border = if self.editing {
            Style::default().fg(theme::AMBER)
        } else {
            theme::border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = usize::from(inner.width.saturating_sub(1));
        let scroll = self.api_input.visual_scroll(width);
        let scroll_cols = u16::try_from(scroll).unwrap_or(u16::MAX);
        frame.render_widget(
            Paragraph::new(self.api_input.value().to_owned())
                .style(theme::value())
                .scroll((0, scroll_cols)),
            inner,
        );

        if self.editing {
            let offset = self.api_input.visual_cursor().saturating_sub(scroll);
            let x = inner.x + u16::try_from(offset).unwrap_or(inner.width);
            frame.set_cursor_position(Position::new(x.min(inner.right()), inner.y));
        }
    }

    #[allow(clippy::unused_self)]
    fn render_danger_zone(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Danger zone ")
            .title_style(Style::default().fg(theme::ERROR_RED))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_danger());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let row = |key: &'static str, text: &'static str| {
            Line::from(vec![
                Span::styled(format!("{key:<3}"), theme::key_hint_key()),
                Span::styled(text, theme::tab_inactive()),
            ])
        };
        frame.render_widget(
            Paragraph::new(vec![
                row("o", "Turn the LED on"),
                row("f", "Turn the LED off"),
                row("r", "Reboot the outlet (asks first)"),
            ]),
            inner,
        );
    }
}

/// Text-editing keys understood by the API base input.
fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            return Ok(self.handle_editing_key(key));
        }
        let action = match key.code {
            KeyCode::Char('e') | KeyCode::Enter => {
                self.reset_input();
                self.editing = true;
                return Ok(None);
            }
            KeyCode::Char('o') => Action::SendCommand(CommandAction::LedOn),
            KeyCode::Char('f') => Action::SendCommand(CommandAction::LedOff),
            KeyCode::Char('r') => Action::ShowConfirm(ConfirmAction::Command(CommandAction::Reboot)),
            _ => return Ok(None),
        };
        Ok(Some(action))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            self.snapshot = Some(Arc::clone(snapshot));
            if !self.editing {
                self.reset_input();
            }
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(9), Constraint::Length(5), Constraint::Min(0)])
            .split(area);
        self.render_api_panel(frame, rows[0]);
        self.render_danger_zone(frame, rows[1]);
    }

    fn captures_keys(&self) -> bool {
        self.editing
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use url::Url;

    use super::*;

    fn key(screen: &mut SettingsScreen, code: KeyCode) -> Option<Action> {
        screen.handle_key_event(KeyEvent::from(code)).expect("key handling")
    }

    fn type_text(screen: &mut SettingsScreen, text: &str) {
        for c in text.chars() {
            assert_eq!(key(screen, KeyCode::Char(c)), None);
        }
    }

    #[test]
    fn enter_applies_a_valid_url() {
        let mut screen = SettingsScreen::new();
        key(&mut screen, KeyCode::Char('e'));
        assert!(screen.captures_keys());

        type_text(&mut screen, "http://10.0.0.5");
        let action = key(&mut screen, KeyCode::Enter);

        let expected = Url::parse("http://10.0.0.5").expect("url");
        assert_eq!(action, Some(Action::ApplyApiBase(Some(expected))));
        assert!(!screen.captures_keys());
    }

    #[test]
    fn invalid_url_stays_in_edit_mode_with_an_error() {
        let mut screen = SettingsScreen::new();
        key(&mut screen, KeyCode::Enter);
        type_text(&mut screen, "ftp://device");

        assert_eq!(key(&mut screen, KeyCode::Enter), None);
        assert!(screen.captures_keys());
        assert!(screen.error.as_deref().is_some_and(|e| e.contains("http")));
    }

    #[test]
    fn ctrl_u_clears_and_blank_unsets_the_base() {
        let mut screen = SettingsScreen::new();
        key(&mut screen, KeyCode::Char('e'));
        type_text(&mut screen, "http://10.0.0.5");
        screen
            .handle_key_event(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
            .expect("key handling");
        assert_eq!(screen.api_input.value(), "");

        assert_eq!(key(&mut screen, KeyCode::Enter), Some(Action::ApplyApiBase(None)));
    }

    #[test]
    fn esc_restores_the_current_base() {
        let mut screen = SettingsScreen::new();
        let mut snapshot = crate::screens::test_snapshot();
        snapshot.api_base = Some(Url::parse("http://192.168.4.1").expect("url"));
        screen
            .update(&Action::SnapshotUpdated(Arc::new(snapshot)))
            .expect("update");

        key(&mut screen, KeyCode::Char('e'));
        type_text(&mut screen, "junk");
        key(&mut screen, KeyCode::Esc);

        assert!(!screen.captures_keys());
        assert_eq!(screen.api_input.value(), "http://192.168.4.1/");
    }

    #[test]
    fn danger_zone_keys_work_when_not_editing() {
        let mut screen = SettingsScreen::new();
        assert_eq!(
            key(&mut screen, KeyCode::Char('r')),
            Some(Action::ShowConfirm(ConfirmAction::Command(CommandAction::Reboot)))
        );
        assert_eq!(
            key(&mut screen, KeyCode::Char('o')),
            Some(Action::SendCommand(CommandAction::LedOn))
        );
    }
}
