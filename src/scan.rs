//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the hub build. Walks every content root, validates each
//! sequence file and produces the [`Manifest`] the page generator consumes.
//!
//! ## Directory Structure
//!
//! ```text
//! synapseq-hub/                      # Source directory
//! ├── hub.toml                       # Optional configuration
//! └── packages/                      # Content root
//!     ├── relax/                     # Category
//!     │   ├── presets-calm.spsq      # Preset list (not an entry)
//!     │   ├── rain.wav               # Background audio
//!     │   └── r/                     # Prefix letter
//!     │       └── ruanklein/         # Author
//!     │           ├── focus.spsq     # Entry ruanklein.relax.focus
//!     │           └── focus.png      # Thumbnail
//!     └── sleep/
//!         └── ...
//! ```
//!
//! ## Validation
//!
//! The scan is an all-or-nothing gate. The first violation aborts it:
//! - content files over the size ceiling
//! - paths that break the naming convention (see [`crate::naming`])
//! - dependency markers pointing at remote, escaping, missing or oversized files
//! - two files that map to the same identifier
//!
//! ## Ordering
//!
//! Entries are ordered newest-first, ties broken alphabetically by name (see
//! [`entry_order`]). With the same files and history the entry list is
//! identical between runs; only `lastUpdated` changes.

use crate::config::HubConfig;
use crate::dependencies::{self, DependencyError};
use crate::history::{self, History};
use crate::naming::{self, NamingError};
use crate::types::{Entry, Manifest, entry_order};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Naming(#[from] NamingError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error("File '{path}' exceeds maximum size ({size} bytes, {limit} allowed)")]
    TooLarge { path: String, size: u64, limit: u64 },
    #[error("Identifier '{id}' is used by both '{first}' and '{second}'")]
    DuplicateIdentifier {
        id: String,
        first: String,
        second: String,
    },
    #[error("File '{0}' is not valid UTF-8")]
    NotUtf8(String),
}

/// Scan `source` and build the manifest.
///
/// Content roots that don't exist are skipped with a warning; a repository
/// with no content at all produces an empty manifest.
pub fn scan(source: &Path, config: &HubConfig, history: &dyn History) -> Result<Manifest, ScanError> {
    let mut entries = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for file in collect_content_files(source, config)? {
        let entry = build_entry(source, &file, config, history)?;
        if let Some(first) = seen.insert(entry.id.clone(), entry.path.clone()) {
            return Err(ScanError::DuplicateIdentifier {
                id: entry.id,
                first,
                second: entry.path,
            });
        }
        entries.push(entry);
    }

    entries.sort_by(entry_order);

    Ok(Manifest {
        version: config.manifest.version.clone(),
        last_updated: history::now(),
        entries,
    })
}

/// Write the manifest as pretty JSON, creating parent directories.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), ScanError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

/// Check a file against the size ceiling for its extension.
///
/// Content files and preset lists share one ceiling, `.wav` files have their
/// own. Anything else is not limited.
pub fn check_file_size(path: &Path, config: &HubConfig) -> Result<(), ScanError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let limit = if ext == config.content.extension || ext == "spsq" {
        config.limits.max_sequence_bytes
    } else if ext == "wav" {
        config.limits.max_background_bytes
    } else {
        return Ok(());
    };

    let size = fs::metadata(path)?.len();
    if size > limit {
        return Err(ScanError::TooLarge {
            path: path.display().to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

/// Every content file under the configured roots, in sorted walk order.
fn collect_content_files(source: &Path, config: &HubConfig) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for root in &config.content.roots {
        let root_path = source.join(root);
        if !root_path.is_dir() {
            tracing::warn!(root = %root_path.display(), "content root not found, skipping");
            continue;
        }

        let walker = WalkDir::new(&root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if is_content_file(entry.path(), config) {
                files.push(entry.into_path());
            } else {
                tracing::debug!(path = %entry.path().display(), "not a content file, skipping");
            }
        }
    }
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_content_file(path: &Path, config: &HubConfig) -> bool {
    let has_extension = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(&config.content.extension));
    let is_preset_list = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with(&config.content.preset_prefix));
    has_extension && !is_preset_list
}

fn build_entry(
    source: &Path,
    file: &Path,
    config: &HubConfig,
    history: &dyn History,
) -> Result<Entry, ScanError> {
    let relative = file.strip_prefix(source).unwrap_or(file);
    let rel_path = naming::to_slash(relative);

    check_file_size(file, config)?;
    let parsed = naming::parse_content_path(relative, config.content.layout)?;

    let bytes = fs::read(file)?;
    let content = String::from_utf8(bytes).map_err(|_| ScanError::NotUtf8(rel_path.clone()))?;
    let dependencies =
        dependencies::extract(&rel_path, &content, source, &parsed.category_dir(), config)?;

    let thumbnail = find_thumbnail(file, &config.content.thumbnail_extensions)
        .and_then(|p| p.strip_prefix(source).ok().map(naming::to_slash));

    tracing::debug!(id = %parsed.identifier(), path = %rel_path, "entry");

    Ok(Entry {
        id: parsed.identifier(),
        display_name: naming::display_name(&parsed.name),
        name: parsed.name,
        author: parsed.author,
        category: parsed.category,
        download_url: config.url_for(&rel_path),
        path: rel_path,
        thumbnail,
        updated_at: history.last_modified(relative),
        dependencies,
    })
}

/// First sibling image sharing the content file's stem.
fn find_thumbnail(file: &Path, extensions: &[String]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| file.with_extension(ext))
        .find(|candidate| candidate.is_file())
}
