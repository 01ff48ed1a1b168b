//! KeyboardManager: turns terminal key events into registry dispatches
//!
//! Owns the [`KeyboardRegistrationManager`] for one keyboard context and is
//! handed down the UI through [`KeyboardContext`] instead of living in a
//! global.

use std::sync::Arc;

use crossterm::event::Event as TerminalEvent;
use tracing::{debug, trace};

use super::event_type::KeyEventType;
use super::keyboard_event::KeyboardEvent;
use super::registration_manager::{Deregistration, KeyHandler, KeyboardRegistrationManager};
use crate::error::KeyboardError;

pub type KeyboardRegistry = KeyboardRegistrationManager<KeyboardEvent>;

#[derive(Debug, Default)]
pub struct KeyboardManager {
    registry: KeyboardRegistry,
}

impl KeyboardManager {
    pub fn new() -> Self {
        Self {
            registry: KeyboardRegistry::new(),
        }
    }

    /// Register a `KeyDown` handler for a single accelerator
    pub fn add_handler(
        &self,
        accelerator: &str,
        handler: KeyHandler<KeyboardEvent>,
    ) -> Deregistration {
        self.registry
            .add_handler(KeyEventType::KeyDown, [accelerator], handler)
    }

    /// Register a handler for several accelerators of one event type
    pub fn add_handlers<I, S>(
        &self,
        event_type: KeyEventType,
        accelerators: I,
        handler: KeyHandler<KeyboardEvent>,
    ) -> Deregistration
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.add_handler(event_type, accelerators, handler)
    }

    /// Dispatch an already normalized event. Returns how many handlers ran.
    pub fn dispatch(&self, event: &KeyboardEvent) -> Result<usize, KeyboardError> {
        let accelerator = event.accelerator();
        trace!(event_type = %event.event_type, accelerator = %accelerator, "Dispatching key");

        self.registry
            .invoke_handlers(event.event_type, &accelerator, event)
    }

    /// Normalize and dispatch a terminal event.
    ///
    /// Returns `true` when at least one handler ran. Non-key events and keys
    /// without an accelerator name are ignored.
    pub fn handle_event(&self, event: &TerminalEvent) -> Result<bool, KeyboardError> {
        let TerminalEvent::Key(key_event) = event else {
            return Ok(false);
        };

        let Some(keyboard_event) = KeyboardEvent::from_crossterm(key_event) else {
            debug!(code = ?key_event.code, "Ignoring key without accelerator name");
            return Ok(false);
        };

        Ok(self.dispatch(&keyboard_event)? > 0)
    }

    pub fn registry(&self) -> &KeyboardRegistry {
        &self.registry
    }
}

/// Explicitly propagated handle to the keyboard manager of a UI subtree.
///
/// A context without a manager is valid; bindings mounted against it are
/// inert.
#[derive(Debug, Clone, Default)]
pub struct KeyboardContext {
    keyboard: Option<Arc<KeyboardManager>>,
}

impl KeyboardContext {
    pub fn new(keyboard: Arc<KeyboardManager>) -> Self {
        Self {
            keyboard: Some(keyboard),
        }
    }

    /// Context with no keyboard manager
    pub fn detached() -> Self {
        Self { keyboard: None }
    }

    pub fn keyboard(&self) -> Option<&Arc<KeyboardManager>> {
        self.keyboard.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::registration_manager::key_handler;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use parking_lot::Mutex;

    #[test]
    fn test_handle_event_dispatches_ctrl_digit() {
        let manager = KeyboardManager::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);

        manager.add_handler(
            "Ctrl+1",
            key_handler(move |event: &KeyboardEvent| {
                received_clone.lock().push(event.clone());
                Ok(())
            }),
        );

        let terminal_event =
            TerminalEvent::Key(KeyEvent::new(KeyCode::Char('1'), KeyModifiers::CONTROL));
        assert!(manager.handle_event(&terminal_event).unwrap());

        let received = received.lock();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].key, "1");
        assert!(received[0].ctrl);
    }

    #[test]
    fn test_handle_event_respects_event_type() {
        let manager = KeyboardManager::new();
        let count = Arc::new(Mutex::new(0));
        let count_clone = Arc::clone(&count);

        manager.add_handlers(
            KeyEventType::KeyUp,
            ["Escape"],
            key_handler(move |_| {
                *count_clone.lock() += 1;
                Ok(())
            }),
        );

        let press = TerminalEvent::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        let release = TerminalEvent::Key(KeyEvent::new_with_kind(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));

        assert!(!manager.handle_event(&press).unwrap());
        assert!(manager.handle_event(&release).unwrap());
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_handle_event_matches_non_ascii_binding() {
        let manager = KeyboardManager::new();
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = Arc::clone(&hits);

        manager.add_handler(
            "Ctrl+ß",
            key_handler(move |_| {
                *hits_clone.lock() += 1;
                Ok(())
            }),
        );

        let terminal_event =
            TerminalEvent::Key(KeyEvent::new(KeyCode::Char('ß'), KeyModifiers::CONTROL));
        assert!(manager.handle_event(&terminal_event).unwrap());
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_handle_event_ignores_non_key_events() {
        let manager = KeyboardManager::new();
        assert!(!manager.handle_event(&TerminalEvent::Resize(80, 24)).unwrap());
        assert!(!manager.handle_event(&TerminalEvent::FocusGained).unwrap());
    }

    #[test]
    fn test_handle_event_propagates_handler_error() {
        let manager = KeyboardManager::new();
        manager.add_handler("Ctrl+S", key_handler(|_| Err(anyhow::anyhow!("disk full"))));

        let terminal_event =
            TerminalEvent::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        let err = manager.handle_event(&terminal_event).unwrap_err();

        assert!(err.to_string().contains("Ctrl+S"));
    }

    #[test]
    fn test_context_propagation() {
        let manager = Arc::new(KeyboardManager::new());
        let context = KeyboardContext::new(Arc::clone(&manager));
        let child_context = context.clone();

        let keyboard = child_context.keyboard().unwrap();
        assert!(Arc::ptr_eq(keyboard, &manager));
        assert!(KeyboardContext::detached().keyboard().is_none());
    }
}
