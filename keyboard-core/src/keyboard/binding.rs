//! KeyboardBinding: scoped `KeyDown` binding tied to a [`KeyboardContext`].
//!
//! Mounting registers the handler; unmounting (explicitly or on drop)
//! deregisters it exactly once.

use compact_str::CompactString;
use tracing::{debug, warn};

use super::keyboard_event::KeyboardEvent;
use super::keyboard_manager::KeyboardContext;
use super::registration_manager::{Deregistration, KeyHandler};

#[derive(Debug)]
pub struct KeyboardBinding {
    accelerator: CompactString,
    deregistration: Option<Deregistration>,
}

impl KeyboardBinding {
    /// Bind `on_key_down` to `accelerator` in the context's keyboard manager.
    pub fn mount(
        context: &KeyboardContext,
        accelerator: &str,
        on_key_down: KeyHandler<KeyboardEvent>,
    ) -> Self {
        let deregistration = match context.keyboard() {
            Some(keyboard) => Some(keyboard.add_handler(accelerator, on_key_down)),
            None => {
                warn!(
                    accelerator,
                    "Keyboard manager context cannot be found - keyboard binding has NOT been set"
                );
                None
            }
        };

        Self {
            accelerator: CompactString::new(accelerator),
            deregistration,
        }
    }

    pub fn accelerator(&self) -> &str {
        &self.accelerator
    }

    /// `true` while the handler is registered
    pub fn is_bound(&self) -> bool {
        self.deregistration
            .as_ref()
            .is_some_and(Deregistration::is_active)
    }

    /// Deregister now instead of at drop
    pub fn unmount(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(deregistration) = self.deregistration.take() {
            deregistration.deregister();
            debug!(accelerator = %self.accelerator, "Keyboard binding unmounted");
        }
    }
}

impl Drop for KeyboardBinding {
    fn drop(&mut self) {
        self.release();
    }
}
