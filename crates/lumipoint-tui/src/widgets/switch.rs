//! On/off switch rendered as a single line: `Night-light  ━━●  On`.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use crate::theme;

pub fn switch_line(label: &str, on: bool) -> Line<'static> {
    let (track, color, word) = if on {
        ("━━●", theme::AMBER, "On")
    } else {
        ("●━━", theme::MUTED, "Off")
    };
    Line::from(vec![
        Span::styled(format!("{label:<14}"), theme::label()),
        Span::styled(track, Style::default().fg(color)),
        Span::raw("  "),
        Span::styled(word, theme::value()),
    ])
}
