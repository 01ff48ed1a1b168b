//! src/config.rs
//! ============================================================================
//! # Config: Application Configuration Loader and Saver
//!
//! Loads and saves settings as TOML from the platform config path resolved
//! with [`directories`](https://docs.rs/directories).
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use compact_str::CompactString;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::editor::tags::Tag;
use crate::editor::tag_hotkeys::DEFAULT_TAG_MODIFIER;
use crate::error::KeyboardError;
use crate::logging::LoggerConfig;

/// Keyboard shortcut settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeymapConfig {
    /// Modifier combined with `0`..`9` for tag hotkeys
    pub tag_modifier: CompactString,

    /// Accelerators that quit the terminal editor
    pub quit: Vec<CompactString>,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            tag_modifier: CompactString::const_new(DEFAULT_TAG_MODIFIER),
            quit: vec![
                CompactString::const_new("Escape"),
                CompactString::const_new("Ctrl+C"),
            ],
        }
    }
}

/// Terminal editor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Redraw interval
    #[serde(with = "humantime_serde")]
    pub tick_rate: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub keymap: KeymapConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggerConfig,

    #[serde(default = "default_tags")]
    pub tags: Vec<Tag>,
}

fn default_tags() -> Vec<Tag> {
    [
        ("person", "#e6194b"),
        ("vehicle", "#3cb44b"),
        ("animal", "#ffe119"),
        ("sign", "#4363d8"),
    ]
    .into_iter()
    .map(|(name, color)| Tag::new(name, color))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keymap: KeymapConfig::default(),
            ui: UiConfig::default(),
            logging: LoggerConfig::default(),
            tags: default_tags(),
        }
    }
}

impl Config {
    /// Loads config from the platform config dir, or writes and returns
    /// defaults when no file exists yet.
    pub async fn load() -> Result<Self, KeyboardError> {
        Self::load_from(&Self::config_path()?).await
    }

    /// Saves config to the platform config dir.
    pub async fn save(&self) -> Result<(), KeyboardError> {
        self.save_to(&Self::config_path()?).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, KeyboardError> {
        if path.exists() {
            info!("Loading config from {}", path.display());
            let text = TokioFs::read_to_string(path)
                .await
                .map_err(|e| KeyboardError::config_io(path, e))?;
            let cfg: Self = toml::from_str(&text)?;

            Ok(cfg)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(path).await?;

            Ok(default_config)
        }
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), KeyboardError> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| KeyboardError::config_io(parent, e))?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str)
            .await
            .map_err(|e| KeyboardError::config_io(path, e))?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> Result<PathBuf, KeyboardError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the config directory (without filename).
    pub fn config_dir() -> Result<PathBuf, KeyboardError> {
        let proj_dirs = ProjectDirs::from("org", "keyboard-core", "KeyboardCore")
            .ok_or(KeyboardError::ConfigDirUnavailable)?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(config.keymap.tag_modifier, "Ctrl");
        assert_eq!(config.tags.len(), 4);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.keymap.tag_modifier = CompactString::const_new("Alt");
        config.ui.tick_rate = Duration::from_secs(1);
        config.save_to(&path).await.unwrap();

        let reloaded = Config::load_from(&path).await.unwrap();
        assert_eq!(reloaded.keymap.tag_modifier, "Alt");
        assert_eq!(reloaded.ui.tick_rate, Duration::from_secs(1));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r##"
            [[tags]]
            name = "crack"
            color = "#ff0000"
            "##,
        )
        .unwrap();

        assert_eq!(config.tags.len(), 1);
        assert_eq!(config.tags[0].name, "crack");
        assert_eq!(config.keymap.quit.len(), 2);
        assert_eq!(config.ui.tick_rate, Duration::from_millis(250));
    }

    #[test]
    fn test_humantime_tick_rate() {
        let config: Config = toml::from_str("[ui]\ntick_rate = \"100ms\"\n").unwrap();
        assert_eq!(config.ui.tick_rate, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "keymap = [").await.unwrap();

        let err = Config::load_from(&path).await.unwrap_err();
        assert!(matches!(err, KeyboardError::Config(_)));
    }
}
