//! Shared types serialized between the two stages.
//!
//! The manifest builder writes these to `manifest.json` and the page
//! generator reads them back, so both sides must agree on the JSON shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The generated index of every content file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
    pub entries: Vec<Entry>,
}

/// One content file's metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// `author.category.name`
    pub id: String,
    /// File stem, dashes preserved
    pub name: String,
    /// Name in Title Case with dashes turned into spaces
    pub display_name: String,
    pub author: String,
    pub category: String,
    /// Path relative to the content source, always `/`-separated
    pub path: String,
    pub download_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A file another content file needs in order to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(rename = "type")]
    pub kind: DependencyKind,
    pub name: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// `@presetlist` — another `.spsq` file holding presets
    Presetlist,
    /// `@background` — a `.wav` file played underneath the sequence
    Background,
}

impl DependencyKind {
    /// The marker that introduces this kind inside a content file.
    pub fn marker(self) -> &'static str {
        match self {
            DependencyKind::Presetlist => "@presetlist",
            DependencyKind::Background => "@background",
        }
    }

    /// Required extension of the referenced file.
    pub fn extension(self) -> &'static str {
        match self {
            DependencyKind::Presetlist => "spsq",
            DependencyKind::Background => "wav",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DependencyKind::Presetlist => "preset list",
            DependencyKind::Background => "background",
        }
    }
}

/// Newest first, then alphabetical by name, then by id.
///
/// The id tiebreak makes the order total so repeated builds never shuffle
/// entries that share a name and a timestamp.
pub fn entry_order(a: &Entry, b: &Entry) -> Ordering {
    b.updated_at
        .cmp(&a.updated_at)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}
