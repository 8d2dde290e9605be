//! Screen identifiers, in tab-bar order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Controls, // 1
    Telemetry, // 2
    Settings,  // 3
}

impl ScreenId {
    pub const ALL: [ScreenId; 3] = [Self::Controls, Self::Telemetry, Self::Settings];

    /// Number key (1-3) that jumps to this screen.
    pub fn number(self) -> u8 {
        match self {
            Self::Controls => 1,
            Self::Telemetry => 2,
            Self::Settings => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|&s| s == self).unwrap_or(0)
    }

    /// Next screen, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous screen, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Controls => "Controls",
            Self::Telemetry => "Telemetry",
            Self::Settings => "Settings",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn number_keys_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(4), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Settings.next(), ScreenId::Controls);
        assert_eq!(ScreenId::Controls.prev(), ScreenId::Settings);
        assert_eq!(ScreenId::Controls.next(), ScreenId::Telemetry);
    }
}
