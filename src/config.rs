//! Generator configuration.
//!
//! Every option has a default matching the published site layout, so the
//! config file is optional. When present it lives at the galleries root:
//!
//! ```text
//! galleries/
//! ├── config.toml          # Optional overrides (this module)
//! ├── galleries.json       # Generated manifest
//! └── summer-weddings/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [manifest]
//! filename = "galleries.json"   # Written inside the galleries root
//! public_prefix = "/galleries"  # URL prefix for src/thumb paths
//!
//! [thumbnails]
//! dir = "thumbs"                # Per-collection thumbnail directory
//! max_width = 600               # Width cap in pixels (never enlarges)
//! quality = 82                  # JPEG quality (1-100)
//! ```
//!
//! Config files are sparse and unknown keys are rejected to catch typos early.
//! The galleries root itself is not part of this file: it comes from the
//! `--root` flag or the `GALLERIES_DIR` environment variable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the optional config file inside the galleries root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Manifest location and public URL layout.
    pub manifest: ManifestConfig,
    /// Thumbnail cache settings.
    pub thumbnails: ThumbnailsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest filename, written inside the galleries root.
    pub filename: String,
    /// Prefix for every public path in the manifest (no trailing slash needed).
    pub public_prefix: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            filename: "galleries.json".to_string(),
            public_prefix: "/galleries".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Directory name inside each collection that holds generated thumbnails.
    pub dir: String,
    /// Maximum thumbnail width. Narrower sources keep their size.
    pub max_width: u32,
    /// JPEG encoding quality.
    pub quality: u8,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            dir: "thumbs".to_string(),
            max_width: 600,
            quality: 82,
        }
    }
}

impl GeneratorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_single_component(&self.manifest.filename) {
            return Err(ConfigError::Validation(format!(
                "manifest.filename must be a plain file name, got {:?}",
                self.manifest.filename
            )));
        }
        if !is_single_component(&self.thumbnails.dir) {
            return Err(ConfigError::Validation(format!(
                "thumbnails.dir must be a plain directory name, got {:?}",
                self.thumbnails.dir
            )));
        }
        if self.thumbnails.max_width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.max_width must be greater than 0".into(),
            ));
        }
        if !(1..=100).contains(&self.thumbnails.quality) {
            return Err(ConfigError::Validation(
                "thumbnails.quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    /// Public URL prefix with any trailing slash removed.
    pub fn public_prefix(&self) -> &str {
        self.manifest.public_prefix.trim_end_matches('/')
    }
}

fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Load `config.toml` from the galleries root, falling back to defaults when
/// the file doesn't exist. Parse and validation errors are returned.
pub fn load_config(root: &Path) -> Result<GeneratorConfig, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(GeneratorConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: GeneratorConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented stock `config.toml` with every option at its default.
pub fn stock_config_toml() -> &'static str {
    r#"# gallery-gen configuration
# =========================
# Place this file at the root of your galleries directory. Every option is
# optional; delete anything you don't want to override.

[manifest]
# Manifest filename, written inside the galleries root.
filename = "galleries.json"
# URL prefix for every src/thumb path in the manifest. Should match where the
# galleries directory is served from.
public_prefix = "/galleries"

[thumbnails]
# Directory created inside each collection to cache thumbnails.
dir = "thumbs"
# Maximum thumbnail width in pixels. Smaller images are never enlarged.
max_width = 600
# JPEG quality (1-100).
quality = 82
"#
}
