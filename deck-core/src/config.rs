//! Editor configuration.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```
//! use deck_core::EditorConfig;
//!
//! let config = EditorConfig::from_json(r#"{ "load_timeout_ms": 5000 }"#).unwrap();
//! assert_eq!(config.load_timeout_ms, 5000);
//! assert_eq!(config.canvas.width, 1280);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DeckError, DeckResult};

/// Canonical canvas width in pixels.
pub const DEFAULT_WIDTH: u32 = 1280;

/// Canonical canvas height in pixels.
pub const DEFAULT_HEIGHT: u32 = 720;

/// Canvas background color.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Interchange format version written into placeholder scenes.
pub const ENGINE_FORMAT_VERSION: &str = "6.7.1";

/// Dimensions and background of the drawing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Background color as hex.
    pub background: String,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }
}

/// Tunables for the scene adapter and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Surface dimensions and background.
    pub canvas: CanvasSpec,
    /// Scene format version used for placeholder scenes.
    pub engine_version: String,
    /// How long a slide load may take before the bind completes anyway.
    pub load_timeout_ms: u64,
    /// Delay of the redundant render pass after a load.
    pub follow_up_render_ms: u64,
    /// Down-scale factor for slide thumbnails.
    pub thumbnail_scale: f32,
    /// Maximum number of undo (and redo) snapshots.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSpec::default(),
            engine_version: ENGINE_FORMAT_VERSION.to_string(),
            load_timeout_ms: 2000,
            follow_up_render_ms: 100,
            thumbnail_scale: 0.1,
            history_limit: 50,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> DeckResult<Self> {
        serde_json::from_str(json).map_err(DeckError::Serialization)
    }

    /// Load a config file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Slide load timeout.
    #[must_use]
    pub const fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Delay before the follow-up render.
    #[must_use]
    pub const fn follow_up_render_delay(&self) -> Duration {
        Duration::from_millis(self.follow_up_render_ms)
    }
}

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not a valid config.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path that was parsed.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
