pub mod error;

pub mod config;

pub mod keyboard {
    pub mod event_type;
    pub use event_type::KeyEventType;

    pub mod keyboard_event;
    pub use keyboard_event::KeyboardEvent;

    pub mod registration_manager;
    pub use registration_manager::{
        Deregistration, KeyHandler, KeyboardRegistrationManager, key_handler,
    };

    pub mod keyboard_manager;
    pub use keyboard_manager::{KeyboardContext, KeyboardManager, KeyboardRegistry};

    pub mod binding;
    pub use binding::KeyboardBinding;
}

pub mod editor {
    pub mod tags;
    pub use tags::{AssetState, EditorState, Region, Tag, tag_for_digit, tag_for_hotkey};

    pub mod tag_hotkeys;
    pub use tag_hotkeys::TagHotkeys;
}

pub mod logging;
pub use logging::LoggerBuilder;

pub use error::KeyboardError;

pub use keyboard::{KeyEventType, KeyboardContext, KeyboardManager, KeyboardRegistrationManager};
