//! Hub configuration module.
//!
//! Handles loading, validating, and merging `hub.toml`. Stock defaults are
//! serialized to a TOML table and the user file is merged on top of it key by
//! key, so a config file only needs the values it wants to change.
//!
//! ## Config File Location
//!
//! `hub.toml` lives in the content source directory (next to the content
//! roots). A different file can be passed with `--config`.
//!
//! ```text
//! synapseq-hub/
//! ├── hub.toml                         # optional
//! ├── page-template/
//! │   ├── base.html
//! │   └── style.css
//! └── packages/
//!     └── relax/
//!         ├── presets-calm.spsq
//!         └── r/
//!             └── ruanklein/
//!                 └── focus.spsq
//! ```
//!
//! ## Configuration Options
//!
//! See [`stock_config_toml`] for the full documented file. Unknown keys are
//! rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name inside the source directory.
pub const CONFIG_FILENAME: &str = "hub.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Hub configuration loaded from `hub.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HubConfig {
    /// Public URL the content repository is served from.
    pub base_url: String,
    pub manifest: ManifestConfig,
    pub content: ContentConfig,
    pub limits: LimitsConfig,
    pub history: HistoryConfig,
    pub page: PageConfig,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ruanklein.github.io/synapseq-hub".to_string(),
            manifest: ManifestConfig::default(),
            content: ContentConfig::default(),
            limits: LimitsConfig::default(),
            history: HistoryConfig::default(),
            page: PageConfig::default(),
        }
    }
}

impl HubConfig {
    /// Validate config values are usable by the builder and the generator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.manifest.version.trim().is_empty() {
            return Err(ConfigError::Validation(
                "manifest.version must not be empty".into(),
            ));
        }
        if self.manifest.file.trim().is_empty() {
            return Err(ConfigError::Validation(
                "manifest.file must not be empty".into(),
            ));
        }
        if self.content.roots.is_empty() {
            return Err(ConfigError::Validation(
                "content.roots must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .content
            .roots
            .iter()
            .find(|r| !crate::naming::is_valid_segment(r))
        {
            return Err(ConfigError::Validation(format!(
                "content.roots entry '{bad}' must be a single directory name"
            )));
        }
        if self.content.extension.is_empty() || self.content.extension.starts_with('.') {
            return Err(ConfigError::Validation(
                "content.extension must be non-empty and given without a dot".into(),
            ));
        }
        if self.limits.max_sequence_bytes == 0 || self.limits.max_background_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits values must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// `base_url` without trailing slashes, ready to have paths appended.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Public URL of a `/`-separated path relative to the source directory.
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url(), relative.trim_start_matches('/'))
    }
}

/// Manifest file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// Manifest file name, relative to the source directory.
    pub file: String,
    /// Schema version written to the `version` field.
    pub version: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            file: "manifest.json".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// How author, category and name are encoded in a content file's path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `<root>/<category>/<letter>/<author>/<name>.spsq`
    #[default]
    Directory,
    /// `<root>/<category>/<letter>/<author>-<name>.spsq`
    Filename,
}

/// Where content files live and how they are named.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Top-level directories scanned for content files.
    pub roots: Vec<String>,
    pub layout: Layout,
    /// Extension of content files, without the dot.
    pub extension: String,
    /// Files starting with this prefix are preset lists, not catalog entries.
    pub preset_prefix: String,
    /// Sibling image extensions tried, in order, when looking for a thumbnail.
    pub thumbnail_extensions: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            roots: vec!["packages".to_string()],
            layout: Layout::Directory,
            extension: "spsq".to_string(),
            preset_prefix: "presets-".to_string(),
            thumbnail_extensions: ["png", "jpg", "jpeg", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// File size ceilings, in bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Sequences and preset lists.
    pub max_sequence_bytes: u64,
    /// Background audio.
    pub max_background_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sequence_bytes: 32 * 1024,
            max_background_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Where `updated_at` timestamps come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySource {
    /// Last commit touching the file (`git log`).
    #[default]
    Git,
    /// Filesystem modification time.
    Modified,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    pub source: HistorySource,
}

/// Page generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageConfig {
    /// Directory holding `base.html` and the static assets.
    pub template_dir: String,
    /// Rendered site. Deleted and recreated on every run.
    pub output_dir: String,
    /// Files copied from the template directory into `<output>/static/`.
    pub assets: Vec<String>,
    /// Keep source modification times on copied content files.
    pub preserve_timestamps: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            template_dir: "page-template".to_string(),
            output_dir: "dist".to_string(),
            assets: ["style.css", "main.js", "logo.png", "favicon.ico"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            preserve_timestamps: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(HubConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
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

/// Load a config file as a raw TOML value, `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<HubConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: HubConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, falling back to stock defaults when absent.
pub fn load_config(path: &Path) -> Result<HubConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_none() {
        tracing::debug!(path = %path.display(), "no config file, using stock defaults");
    }
    resolve_config(overlay)
}

/// Returns a fully-commented stock `hub.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# SynapSeq Hub Configuration
# ===========================
# All options are optional. Values shown are the defaults.
# Unknown keys are rejected.

# Public URL the repository is served from. Download URLs in the manifest
# are built as <base_url>/<path>.
base_url = "https://ruanklein.github.io/synapseq-hub"

# ---------------------------------------------------------------------------
# Manifest
# ---------------------------------------------------------------------------
[manifest]
# Output file, relative to the source directory.
file = "manifest.json"
# Schema version written to the manifest.
version = "1.0.0"

# ---------------------------------------------------------------------------
# Content layout
# ---------------------------------------------------------------------------
[content]
# Top-level directories scanned for sequences.
roots = ["packages"]
# "directory": <root>/<category>/<letter>/<author>/<name>.spsq
# "filename":  <root>/<category>/<letter>/<author>-<name>.spsq
# <letter> is the lower-cased first character of the author.
layout = "directory"
# Content file extension (no dot).
extension = "spsq"
# Files with this prefix are preset lists and never become entries.
preset_prefix = "presets-"
# A sibling image with the same stem becomes the entry thumbnail.
thumbnail_extensions = ["png", "jpg", "jpeg", "webp"]

# ---------------------------------------------------------------------------
# Size limits (bytes)
# ---------------------------------------------------------------------------
[limits]
# Sequences and preset lists (.spsq).
max_sequence_bytes = 32768
# Background audio (.wav).
max_background_bytes = 10485760

# ---------------------------------------------------------------------------
# Timestamps
# ---------------------------------------------------------------------------
[history]
# "git": last commit touching the file, current time when unavailable.
# "modified": filesystem modification time.
source = "git"

# ---------------------------------------------------------------------------
# Page generation
# ---------------------------------------------------------------------------
[page]
# Holds base.html and the static assets below.
template_dir = "page-template"
# Rendered site. Deleted and recreated on every run.
output_dir = "dist"
# Copied into <output_dir>/static/. Missing files are reported, not fatal.
assets = ["style.css", "main.js", "logo.png", "favicon.ico"]
# Keep modification times on copied content files.
preserve_timestamps = true
"##
}
