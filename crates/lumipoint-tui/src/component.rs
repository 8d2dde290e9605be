//! Component trait implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

use crate::action::Action;

/// A screen: turns keys into [`Action`]s, reacts to dispatched actions,
/// and draws itself. Screens never call the controller directly.
pub trait Component: Send {
    /// Map a key press to an action, or `None` to ignore it.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// React to a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// While `true`, the app routes every key here instead of treating
    /// `q`, digits and Tab as global shortcuts (text entry).
    fn captures_keys(&self) -> bool {
        false
    }
}
