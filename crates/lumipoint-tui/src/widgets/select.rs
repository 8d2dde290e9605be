//! Inline option strip for select controls: `2s  [5s]  10s ...`.

use ratatui::style::Modifier;
use ratatui::text::{Line, Span};

use crate::theme;

/// Render every option on one line with the chosen one bracketed.
pub fn option_strip(labels: &[String], active_index: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(labels.len() * 2);
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", theme::key_hint()));
        }
        if i == active_index {
            spans.push(Span::styled(
                format!("[{label}]"),
                theme::tab_active().add_modifier(Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::styled(label.clone(), theme::tab_inactive()));
        }
    }
    Line::from(spans)
}

/// Move `index` by one step in `forward` direction, stopping at the ends.
pub fn step(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        (index + 1).min(len.saturating_sub(1))
    } else {
        index.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::widgets::line_text;

    #[test]
    fn active_option_is_bracketed() {
        let labels: Vec<String> = ["1s", "2s", "5s"].map(String::from).to_vec();
        assert_eq!(line_text(&option_strip(&labels, 1)), "1s  [2s]  5s");
    }

    #[test]
    fn step_stops_at_both_ends() {
        assert_eq!(step(0, 4, false), 0);
        assert_eq!(step(3, 4, true), 3);
        assert_eq!(step(1, 4, true), 2);
        assert_eq!(step(0, 0, true), 0);
    }
}
