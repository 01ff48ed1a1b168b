//! Keyboard event phases a handler can be registered for.

use enum_map::Enum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Native keyboard event moment a handler applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeyEventType {
    /// Key pressed
    #[default]
    KeyDown,

    /// Key released
    KeyUp,

    /// Character-producing key pressed (auto-repeats)
    KeyPress,
}

impl KeyEventType {
    pub const ALL: [Self; 3] = [Self::KeyDown, Self::KeyUp, Self::KeyPress];

    /// DOM-style event name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::KeyPress => "keypress",
        }
    }
}

impl fmt::Display for KeyEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
