//! Controls tab: night-light switch, brightness slider, auto-off select,
//! quick actions, and the current status card.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use lumipoint_core::display::{
    OFF_TIMER_OPTIONS_MS, lux_label, motion_label, ms_to_label, nearest_option, on_off,
    updated_label,
};
use lumipoint_core::{CommandAction, DashboardSnapshot, MAX_BRIGHTNESS, Settings};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::metric::field_line;
use crate::widgets::select::{self, option_strip};
use crate::widgets::slider::slider;
use crate::widgets::switch::switch_line;

/// Brightness change for Shift+arrow and PgUp/PgDn.
const COARSE_STEP: i64 = 16;

#[derive(Default)]
pub struct ControlsScreen {
    snapshot: Option<Arc<DashboardSnapshot>>,
}

impl ControlsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn settings(&self) -> Settings {
        self.snapshot
            .as_ref()
            .map(|s| s.settings)
            .unwrap_or_default()
    }

    fn render_settings(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Settings ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1), // switch
            Constraint::Length(1),
            Constraint::Length(1), // brightness label
            Constraint::Length(1), // slider
            Constraint::Length(1),
            Constraint::Length(1), // auto-off label
            Constraint::Length(1), // auto-off options
            Constraint::Length(1),
            Constraint::Length(1), // quick actions
            Constraint::Min(0),
        ])
        .split(inner);

        let settings = self.settings();
        frame.render_widget(
            Paragraph::new(switch_line("Night-light", settings.is_night_light_mode)),
            rows[0],
        );

        frame.render_widget(Paragraph::new(Span::styled("Brightness", theme::label())), rows[2]);
        frame.render_widget(slider(settings.brightness, MAX_BRIGHTNESS), rows[3]);

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Auto-off after {}", ms_to_label(settings.off_timer_ms)),
                theme::label(),
            )),
            rows[5],
        );
        let labels: Vec<String> = OFF_TIMER_OPTIONS_MS.iter().map(|&ms| ms_to_label(ms)).collect();
        let active = nearest_option(&OFF_TIMER_OPTIONS_MS, settings.off_timer_ms);
        frame.render_widget(Paragraph::new(option_strip(&labels, active)), rows[6]);

        frame.render_widget(Paragraph::new(quick_actions_line()), rows[8]);
        frame.render_widget(Paragraph::new(edit_hints_line()), rows[9]);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Current status ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let device = self.snapshot.as_ref().and_then(|s| s.device.as_deref());
        let lines = match device {
            Some(d) => vec![
                field_line("Lux", lux_label(d.lux)),
                field_line("ADC", d.adc.to_string()),
                field_line("Motion", motion_label(d.motion)),
                field_line("LED", on_off(d.led_on)),
                field_line("Updated", updated_label(d.updated_at)),
            ],
            None => ["Lux", "ADC", "Motion", "LED", "Updated"]
                .into_iter()
                .map(|label| field_line(label, updated_label(None)))
                .collect(),
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Next auto-off choice from the current value, stopping at either end.
pub fn step_off_timer(current_ms: i64, forward: bool) -> i64 {
    let index = nearest_option(&OFF_TIMER_OPTIONS_MS, current_ms);
    let next = select::step(index, OFF_TIMER_OPTIONS_MS.len(), forward);
    OFF_TIMER_OPTIONS_MS.get(next).copied().unwrap_or(current_ms)
}

fn quick_actions_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("o ", theme::key_hint_key()),
        Span::styled("LED on  ", theme::key_hint()),
        Span::styled("f ", theme::key_hint_key()),
        Span::styled("LED off  ", theme::key_hint()),
        Span::styled("r ", theme::key_hint_key()),
        Span::styled("reboot  ", theme::key_hint()),
        Span::styled("+ ", theme::key_hint_key()),
        Span::styled("faster refresh", theme::key_hint()),
    ])
}

fn edit_hints_line() -> Line<'static> {
    Line::from(vec![
        Span::styled("n ", theme::key_hint_key()),
        Span::styled("night-light  ", theme::key_hint()),
        Span::styled("←/→ ", theme::key_hint_key()),
        Span::styled("brightness (Shift ±16)  ", theme::key_hint()),
        Span::styled("[/] ", theme::key_hint_key()),
        Span::styled("auto-off", theme::key_hint()),
    ])
}

impl Component for ControlsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let off_timer = self.settings().off_timer_ms;
        let action = match key.code {
            KeyCode::Char('n') => Action::ToggleNightLight,
            KeyCode::Left if shift => Action::AdjustBrightness(-COARSE_STEP),
            KeyCode::Right if shift => Action::AdjustBrightness(COARSE_STEP),
            KeyCode::Left => Action::AdjustBrightness(-1),
            KeyCode::Right => Action::AdjustBrightness(1),
            KeyCode::PageDown => Action::AdjustBrightness(-COARSE_STEP),
            KeyCode::PageUp => Action::AdjustBrightness(COARSE_STEP),
            KeyCode::Char('[') => Action::SetOffTimer(step_off_timer(off_timer, false)),
            KeyCode::Char(']') => Action::SetOffTimer(step_off_timer(off_timer, true)),
            KeyCode::Char('o') => Action::SendCommand(CommandAction::LedOn),
            KeyCode::Char('f') => Action::SendCommand(CommandAction::LedOff),
            KeyCode::Char('r') => Action::ShowConfirm(ConfirmAction::Command(CommandAction::Reboot)),
            KeyCode::Char('+') => Action::FasterRefresh,
            _ => return Ok(None),
        };
        Ok(Some(action))
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnapshotUpdated(snapshot) = action {
            self.snapshot = Some(Arc::clone(snapshot));
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let columns =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).split(area);
        self.render_settings(frame, columns[0]);
        self.render_status(frame, columns[1]);
    }
}
