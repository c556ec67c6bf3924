//! Upload widget configuration.
//!
//! Every upload widget on the dashboard is mounted with an [`UploadConfig`]
//! that stays fixed for the lifetime of that mount. The dashboard ships two
//! presets, the profile avatar and the project gallery, and both can be tuned
//! from an `uploads.toml` file:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [avatar]
//! max_files = 1
//! max_size = 2097152          # bytes (2 MiB)
//! accepted_types = "image/*"
//! multiple = false
//! disabled = false
//!
//! [gallery]
//! max_files = 20
//! max_size = 10485760         # bytes (10 MiB)
//! accepted_types = "image/*,application/pdf"
//! multiple = true
//! disabled = false
//! ```
//!
//! ## Partial Configuration
//!
//! The file is sparse. Values are merged on top of the stock defaults, so
//! overriding one key keeps the preset's other values:
//!
//! ```toml
//! [gallery]
//! max_files = 40
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::accept::{AcceptError, AcceptList};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "uploads.toml";

const MIB: u64 = 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config validation error: {0}")]
    Accept(#[from] AcceptError),
}

/// Per-mount upload constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Maximum number of pending files. Forced to 1 when `multiple` is false.
    pub max_files: usize,
    /// Maximum size of a single file, in bytes.
    pub max_size: u64,
    /// Comma-separated accepted types, e.g. `"image/*,.pdf"`. Empty accepts all.
    pub accepted_types: String,
    /// Whether the widget holds several files or a single replaceable one.
    pub multiple: bool,
    /// An inert widget ignores selection and drag events.
    pub disabled: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::gallery()
    }
}

impl UploadConfig {
    /// Single profile picture.
    pub fn avatar() -> Self {
        Self {
            max_files: 1,
            max_size: 2 * MIB,
            accepted_types: "image/*".to_string(),
            multiple: false,
            disabled: false,
        }
    }

    /// Project/experience media gallery.
    pub fn gallery() -> Self {
        Self {
            max_files: 20,
            max_size: 10 * MIB,
            accepted_types: "image/*,application/pdf".to_string(),
            multiple: true,
            disabled: false,
        }
    }

    /// The file count actually enforced.
    pub fn effective_max_files(&self) -> usize {
        if self.multiple { self.max_files } else { 1 }
    }

    /// Parse `accepted_types`.
    pub fn accept_list(&self) -> Result<AcceptList, ConfigError> {
        Ok(self.accepted_types.parse()?)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_files == 0 {
            return Err(ConfigError::Validation("max_files must be at least 1".into()));
        }
        if self.max_size == 0 {
            return Err(ConfigError::Validation("max_size must be non-zero".into()));
        }
        self.accept_list()?;
        Ok(())
    }
}

/// Which preset a widget is mounted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Widget {
    Avatar,
    Gallery,
}

/// All widget presets, as loaded from `uploads.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    #[serde(default = "UploadConfig::avatar")]
    pub avatar: UploadConfig,
    #[serde(default = "UploadConfig::gallery")]
    pub gallery: UploadConfig,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            avatar: UploadConfig::avatar(),
            gallery: UploadConfig::gallery(),
        }
    }
}

impl MediaConfig {
    pub fn widget(&self, widget: Widget) -> &UploadConfig {
        match widget {
            Widget::Avatar => &self.avatar,
            Widget::Gallery => &self.gallery,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.avatar.validate()?;
        self.gallery.validate()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(MediaConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `uploads.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<MediaConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MediaConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `uploads.toml` in the given directory.
///
/// Uses stock defaults when the file is absent.
pub fn load_config(dir: &Path) -> Result<MediaConfig, ConfigError> {
    let config = resolve_config(load_raw_config(dir)?)?;
    tracing::debug!(dir = %dir.display(), "loaded upload config");
    Ok(config)
}

/// Returns a fully-commented stock `uploads.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Upload Widget Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Profile avatar: a single, replaceable image
# ---------------------------------------------------------------------------
[avatar]
# Maximum number of pending files (always 1 when multiple = false).
max_files = 1
# Maximum size of a single file, in bytes.
max_size = 2097152
# Comma-separated MIME types, wildcards (image/*) or extensions (.pdf).
# Leave empty to accept any file.
accepted_types = "image/*"
# Selecting a new file replaces the current one when false.
multiple = false
# Disabled widgets ignore clicks and drops.
disabled = false

# ---------------------------------------------------------------------------
# Project gallery: an ordered collection of images and documents
# ---------------------------------------------------------------------------
[gallery]
max_files = 20
max_size = 10485760
accepted_types = "image/*,application/pdf"
multiple = true
disabled = false
"##
}
