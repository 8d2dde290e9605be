//! Connection badge: spinner while connecting, red error text, green
//! "Online".

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use throbber_widgets_tui::{Throbber, ThrobberState};

use lumipoint_core::ConnectionStatus;

use crate::theme;

/// Static badge for `Online` and `Error`. `Connecting` is animated and
/// has no static form.
pub fn badge_line(status: &ConnectionStatus) -> Option<Line<'static>> {
    match status {
        ConnectionStatus::Connecting => None,
        ConnectionStatus::Online => Some(Line::from(Span::styled(
            "● Online",
            Style::default().fg(theme::ONLINE_GREEN),
        ))),
        ConnectionStatus::Error(message) => Some(Line::from(Span::styled(
            format!("✗ {message}"),
            Style::default().fg(theme::ERROR_RED),
        ))),
    }
}

pub fn render_status_badge(
    frame: &mut Frame,
    area: Rect,
    status: &ConnectionStatus,
    throbber_state: &ThrobberState,
) {
    if let Some(line) = badge_line(status) {
        frame.render_widget(Paragraph::new(line), area);
        return;
    }
    let throbber = Throbber::default()
        .label("Connecting…")
        .style(Style::default().fg(theme::CAUTION_YELLOW))
        .throbber_style(Style::default().fg(theme::CAUTION_YELLOW));
    frame.render_stateful_widget(throbber, area, &mut throbber_state.clone());
}
