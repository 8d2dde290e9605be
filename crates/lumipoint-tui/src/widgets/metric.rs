//! Telemetry cards: a bordered tile holding one big value, and the
//! label/value rows used by the status card.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::theme;

pub fn render_metric_tile(frame: &mut Frame, area: Rect, title: &str, value: &str, accent: Color) {
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::label())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Vertically centre the single value line.
    let y = inner.y + inner.height.saturating_sub(1) / 2;
    let line_area = Rect::new(inner.x, y, inner.width, 1.min(inner.height));
    frame.render_widget(
        Paragraph::new(Span::styled(
            value.to_owned(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        line_area,
    );
}

/// `Lux        12.30 lx`
pub fn field_line(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<10}"), theme::label()),
        Span::styled(value.into(), theme::value()),
    ])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::widgets::line_text;

    #[test]
    fn field_labels_are_padded_into_a_column() {
        assert_eq!(line_text(&field_line("ADC", "512")), "ADC       512");
    }
}
