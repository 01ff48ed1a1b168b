//! Tag hotkeys: `<modifier>+0`..`<modifier>+9` toggle palette tags on the
//! selected regions.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::tags::{EditorState, HOTKEY_TAG_SLOTS};
use crate::keyboard::binding::KeyboardBinding;
use crate::keyboard::keyboard_event::KeyboardEvent;
use crate::keyboard::keyboard_manager::KeyboardContext;
use crate::keyboard::registration_manager::{KeyHandler, key_handler};

pub const DEFAULT_TAG_MODIFIER: &str = "Ctrl";

/// The ten tag bindings of one editor. Dropping it unmounts all of them.
#[derive(Debug)]
pub struct TagHotkeys {
    bindings: Vec<KeyboardBinding>,
}

impl TagHotkeys {
    pub fn mount(context: &KeyboardContext, state: Arc<Mutex<EditorState>>) -> Self {
        Self::mount_with_modifier(context, DEFAULT_TAG_MODIFIER, state)
    }

    pub fn mount_with_modifier(
        context: &KeyboardContext,
        modifier: &str,
        state: Arc<Mutex<EditorState>>,
    ) -> Self {
        let on_key_down = Self::tag_handler(state);

        let bindings = (0..HOTKEY_TAG_SLOTS)
            .map(|index| {
                KeyboardBinding::mount(
                    context,
                    &format!("{modifier}+{index}"),
                    Arc::clone(&on_key_down),
                )
            })
            .collect();

        Self { bindings }
    }

    fn tag_handler(state: Arc<Mutex<EditorState>>) -> KeyHandler<KeyboardEvent> {
        key_handler(move |event: &KeyboardEvent| {
            let Some(digit) = event.digit() else {
                return Ok(());
            };
            let touched = state.lock().apply_digit(digit);
            debug!(digit, ?touched, "Tag hotkey");
            Ok(())
        })
    }

    pub fn accelerators(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(KeyboardBinding::accelerator)
    }

    pub fn is_bound(&self) -> bool {
        self.bindings.iter().all(KeyboardBinding::is_bound)
    }
}
