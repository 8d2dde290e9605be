//! Stateless presentational widgets. Each one renders values handed to
//! it and holds no dashboard state of its own.

pub mod metric;
pub mod select;
pub mod slider;
pub mod status_badge;
pub mod switch;

/// Concatenated text of a line, for assertions.
#[cfg(test)]
pub(crate) fn line_text(line: &ratatui::text::Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
