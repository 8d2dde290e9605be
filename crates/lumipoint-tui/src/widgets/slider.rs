//! Horizontal slider drawn with a `LineGauge`.

use ratatui::style::Style;
use ratatui::widgets::LineGauge;

use crate::theme;

/// Fill ratio for `value` on a `0..=max` scale, clamped to `0.0..=1.0`.
pub fn ratio(value: i64, max: i64) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    let value = u32::try_from(value.clamp(0, max)).unwrap_or(u32::MAX);
    let max = u32::try_from(max).unwrap_or(u32::MAX);
    f64::from(value) / f64::from(max)
}

pub fn slider(value: i64, max: i64) -> LineGauge<'static> {
    LineGauge::default()
        .ratio(ratio(value, max))
        .label(format!("{value:>3}/{max}"))
        .style(theme::value())
        .filled_style(Style::default().fg(theme::AMBER))
        .unfilled_style(Style::default().fg(theme::TRACK))
}
