//! Telemetry tab: refresh-interval select and one tile per sensor reading.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Color,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use lumipoint_core::display::{
    REFRESH_OPTIONS_MS, duration_label, lux_label, nearest_option, on_off, updated_label, yes_no,
};
use lumipoint_core::{DashboardSnapshot, DeviceState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::metric::render_metric_tile;
use crate::widgets::select::{self, option_strip};

#[derive(Default)]
pub struct TelemetryScreen {
    snapshot: Option<Arc<DashboardSnapshot>>,
}

/// Title, value and accent for each tile, left to right.
pub fn tiles(device: Option<&DeviceState>) -> [(&'static str, String, Color); 4] {
    let Some(d) = device else {
        let blank = updated_label(None);
        return [
            ("Lux", blank.clone(), theme::MUTED),
            ("ADC", blank.clone(), theme::MUTED),
            ("Motion", blank.clone(), theme::MUTED),
            ("LED", blank, theme::MUTED),
        ];
    };
    [
        ("Lux", lux_label(d.lux), theme::MOONLIGHT),
        ("ADC", d.adc.to_string(), theme::SOFT_VIOLET),
        (
            "Motion",
            yes_no(d.motion).to_owned(),
            if d.motion { theme::AMBER } else { theme::TEXT },
        ),
        (
            "LED",
            on_off(d.led_on).to_owned(),
            if d.led_on { theme::ONLINE_GREEN } else { theme::MUTED },
        ),
    ]
}

/// Neighbouring refresh choice, stopping at either end.
pub fn step_refresh(current: Duration, forward: bool) -> Duration {
    let current_ms = u64::try_from(current.as_millis()).unwrap_or(u64::MAX);
    let index = nearest_option(&REFRESH_OPTIONS_MS, current_ms);
    let next = select::step(index, REFRESH_OPTIONS_MS.len(), forward);
    Duration::from_millis(REFRESH_OPTIONS_MS.get(next).copied().unwrap_or(current_ms))
}

impl TelemetryScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn poll_interval(&self) -> Duration {
        self.snapshot
            .as_ref()
            .map_or(lumipoint_core::DEFAULT_POLL_INTERVAL, |s| s.poll_interval)
    }

    fn render_refresh(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Refresh ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let interval = self.poll_interval();
        let labels: Vec<String> = REFRESH_OPTIONS_MS
            .iter()
            .map(|&ms| duration_label(Duration::from_millis(ms)))
            .collect();
        let current_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        let active = nearest_option(&REFRESH_OPTIONS_MS, current_ms);

        let lines = vec![
            option_strip(&labels, active),
            Line::from(vec![
                Span::styled("←/→ ", theme::key_hint_key()),
                Span::styled("change  ", theme::key_hint()),
                Span::styled("+ ", theme::key_hint_key()),
                Span::styled("faster", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for TelemetryScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let current = self.poll_interval();
        let action = match key.code {
            KeyCode::Left | KeyCode::Char('[') => Action::SetRefresh(step_refresh(current, false)),
            KeyCode::Right | KeyCode::Char(']') => Action::SetRefresh(step_refresh(current, true)),
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
        let rows = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);
        self.render_refresh(frame, rows[0]);

        let device = self.snapshot.as_ref().and_then(|s| s.device.as_deref());
        let cells = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(rows[1]);
        for ((title, value, accent), cell) in tiles(device).into_iter().zip(cells.iter()) {
            render_metric_tile(frame, *cell, title, &value, accent);
        }

        let updated = updated_label(device.and_then(|d| d.updated_at));
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Last update ", theme::label()),
                Span::styled(updated, theme::value()),
            ])),
            rows[2],
        );
    }
}
