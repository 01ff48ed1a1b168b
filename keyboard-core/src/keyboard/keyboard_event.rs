//! Keyboard event payload and accelerator normalization.
//!
//! Terminal key events from `crossterm` are folded into [`KeyboardEvent`], a
//! DOM-like record (`key` + modifier flags). Its [`KeyboardEvent::accelerator`]
//! string is what handlers are registered under.

use compact_str::CompactString;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::fmt;

use super::event_type::KeyEventType;

/// Modifier tokens in the order they appear in an accelerator
const CTRL_TOKEN: &str = "Ctrl";
const ALT_TOKEN: &str = "Alt";
const SHIFT_TOKEN: &str = "Shift";
const META_TOKEN: &str = "Meta";

/// Keyboard event passed to registered handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyboardEvent {
    pub event_type: KeyEventType,
    pub key: CompactString,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyboardEvent {
    pub fn new(event_type: KeyEventType, key: impl Into<CompactString>) -> Self {
        Self {
            event_type,
            key: key.into(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    #[must_use]
    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Canonical combination string, e.g. `Ctrl+Shift+S`.
    ///
    /// Modifiers are emitted as `Ctrl`, `Alt`, `Shift`, `Meta` in that order.
    /// Single ASCII letters are upper-cased; everything else is kept verbatim.
    pub fn accelerator(&self) -> CompactString {
        let mut accelerator = CompactString::with_capacity(self.key.len() + 16);

        for (active, token) in [
            (self.ctrl, CTRL_TOKEN),
            (self.alt, ALT_TOKEN),
            (self.shift, SHIFT_TOKEN),
            (self.meta, META_TOKEN),
        ] {
            if active {
                accelerator.push_str(token);
                accelerator.push('+');
            }
        }

        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                accelerator.push(c.to_ascii_uppercase());
            }
            _ => accelerator.push_str(&self.key),
        }

        accelerator
    }

    /// Normalize a terminal key event. Keys without a name yield `None`.
    pub fn from_crossterm(event: &KeyEvent) -> Option<Self> {
        let event_type = match event.kind {
            KeyEventKind::Press => KeyEventType::KeyDown,
            KeyEventKind::Repeat => KeyEventType::KeyPress,
            KeyEventKind::Release => KeyEventType::KeyUp,
        };

        let mut shift = event.modifiers.contains(KeyModifiers::SHIFT);
        let key: CompactString = match event.code {
            KeyCode::Char(' ') => CompactString::const_new("Space"),
            KeyCode::Char(c) => {
                let mut key = CompactString::default();
                key.push(c);
                key
            }
            KeyCode::F(n) => compact_str::format_compact!("F{n}"),
            KeyCode::BackTab => {
                shift = true;
                CompactString::const_new("Tab")
            }
            code => CompactString::const_new(named_key(code)?),
        };

        Some(Self {
            event_type,
            key,
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
            shift,
            meta: event
                .modifiers
                .intersects(KeyModifiers::SUPER | KeyModifiers::META),
        })
    }

    /// Parse the key as a single ASCII digit (`"0"`..`"9"`)
    pub fn digit(&self) -> Option<u32> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.to_digit(10),
            _ => None,
        }
    }
}

impl fmt::Display for KeyboardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.event_type, self.accelerator())
    }
}

impl TryFrom<&KeyEvent> for KeyboardEvent {
    type Error = crate::error::KeyboardError;

    fn try_from(event: &KeyEvent) -> Result<Self, Self::Error> {
        Self::from_crossterm(event).ok_or_else(|| {
            crate::error::KeyboardError::invalid_accelerator(
                format!("{:?}", event.code),
                "key has no accelerator name",
            )
        })
    }
}

fn named_key(code: KeyCode) -> Option<&'static str> {
    let name = match code {
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab => "Tab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Esc => "Escape",
        KeyCode::CapsLock => "CapsLock",
        KeyCode::ScrollLock => "ScrollLock",
        KeyCode::NumLock => "NumLock",
        KeyCode::PrintScreen => "PrintScreen",
        KeyCode::Pause => "Pause",
        KeyCode::Menu => "ContextMenu",
        _ => return None,
    };
    Some(name)
}
