//! src/error.rs
//! ============================================================================
//! # `KeyboardError`: Unified Error Type for the Keyboard Layer
//!
//! Every fallible operation in the crate returns `Result<T, KeyboardError>`.
//! Lookup misses and redundant deregistrations are not errors and never show
//! up here.

use std::{io, path::PathBuf};
use thiserror::Error;

use crate::keyboard::event_type::KeyEventType;

/// Unified error type for registration, dispatch and configuration.
#[derive(Debug, Error)]
pub enum KeyboardError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// TOML config serialization error.
    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config file I/O error with path.
    #[error("Failed to access config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Platform config directory could not be resolved.
    #[error("Could not determine config directory")]
    ConfigDirUnavailable,

    /// Accelerator string that cannot be used for a binding.
    #[error("Invalid accelerator '{accelerator}': {reason}")]
    InvalidAccelerator { accelerator: String, reason: String },

    /// A handler returned an error during dispatch. Remaining handlers for
    /// the same dispatch were not run.
    #[error("Handler for {event_type:?} '{accelerator}' failed: {source}")]
    HandlerFailed {
        event_type: KeyEventType,
        accelerator: String,
        #[source]
        source: anyhow::Error,
    },

    /// Any other error, with description.
    #[error("Unexpected error: {0}")]
    Other(String),
}

impl KeyboardError {
    #[must_use]
    /// Attach extra context to an error.
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        Self::Other(format!("{}: {}", ctx.into(), self))
    }

    /// Create an invalid accelerator error
    pub fn invalid_accelerator<S1: Into<String>, S2: Into<String>>(
        accelerator: S1,
        reason: S2,
    ) -> Self {
        Self::InvalidAccelerator {
            accelerator: accelerator.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a handler failure with the cell it was dispatched for
    pub fn handler_failed<S: Into<String>>(
        event_type: KeyEventType,
        accelerator: S,
        source: anyhow::Error,
    ) -> Self {
        Self::HandlerFailed {
            event_type,
            accelerator: accelerator.into(),
            source,
        }
    }

    /// Create a config I/O error bound to a path
    pub fn config_io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }
}

// Allow conversion from `anyhow::Error` as fallback.
impl From<anyhow::Error> for KeyboardError {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(e.to_string())
    }
}
