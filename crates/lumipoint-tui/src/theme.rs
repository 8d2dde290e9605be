//! Fixed palette and semantic styles.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const AMBER: Color = Color::Rgb(255, 184, 76); // #ffb84c
pub const MOONLIGHT: Color = Color::Rgb(138, 180, 248); // #8ab4f8
pub const SOFT_VIOLET: Color = Color::Rgb(187, 134, 252); // #bb86fc
pub const CAUTION_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const ONLINE_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

pub const TEXT: Color = Color::Rgb(205, 208, 220); // #cdd0dc
pub const MUTED: Color = Color::Rgb(110, 118, 150); // #6e7696
pub const TRACK: Color = Color::Rgb(58, 62, 82); // #3a3e52
pub const BG_PANEL: Color = Color::Rgb(28, 29, 38); // #1c1d26

// ── Semantic styles ───────────────────────────────────────────────────

pub fn title_style() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn border() -> Style {
    Style::default().fg(MUTED)
}

pub fn border_danger() -> Style {
    Style::default().fg(ERROR_RED)
}

pub fn label() -> Style {
    Style::default().fg(MUTED)
}

pub fn value() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(TEXT)
}

/// Key hint text (e.g. "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

pub fn key_hint_key() -> Style {
    Style::default().fg(MOONLIGHT).add_modifier(Modifier::BOLD)
}
