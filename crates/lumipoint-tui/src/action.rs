//! Every state change in the TUI is expressed as an [`Action`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use lumipoint_core::{CommandAction, DashboardSnapshot};
use url::Url;

use crate::screen::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast shown in the bottom-right corner for a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// An action waiting on a y/n answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Command(CommandAction),
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(CommandAction::Reboot) => {
                write!(f, "Reboot the outlet? It drops offline briefly.")
            }
            Self::Command(action) => write!(f, "Send {action}?"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Controller state ──────────────────────────────────────────
    SnapshotUpdated(Arc<DashboardSnapshot>),

    // ── Local edits (debounced save) ──────────────────────────────
    ToggleNightLight,
    AdjustBrightness(i64),
    SetOffTimer(i64),

    // ── Polling ───────────────────────────────────────────────────
    SetRefresh(Duration),
    FasterRefresh,
    ApplyApiBase(Option<Url>),

    // ── Commands ──────────────────────────────────────────────────
    SendCommand(CommandAction),
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
