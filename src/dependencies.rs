//! Dependency marker extraction.
//!
//! A sequence can pull in other files with line-level markers:
//!
//! ```text
//! @presetlist presets-calm.spsq
//! @background sounds/rain.wav
//! ```
//!
//! References are resolved against the sequence's category directory
//! (`<root>/<category>`). Every referenced file must already be in the
//! repository: remote URLs, absolute paths and `..` escapes are rejected, and
//! the file must exist and fit under its size ceiling.

use crate::config::HubConfig;
use crate::types::{Dependency, DependencyKind};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@(presetlist|background)\s+(\S+)").expect("valid regex"));

#[derive(Error, Debug)]
pub enum DependencyError {
    #[error(
        "File '{file}' references an external URL '{reference}'. All @presetlist and @background files must reside within the repository"
    )]
    ExternalUrl { file: String, reference: String },
    #[error("File '{file}' references '{reference}' outside its category directory")]
    OutsideRepository { file: String, reference: String },
    #[error("File '{file}' references {label} '{reference}' which must end in .{extension}")]
    UnexpectedExtension {
        file: String,
        label: &'static str,
        reference: String,
        extension: &'static str,
    },
    #[error("File '{file}' references missing {label} '{reference}'")]
    Missing {
        file: String,
        label: &'static str,
        reference: String,
    },
    #[error("File '{path}' exceeds maximum size ({size} bytes, {limit} allowed)")]
    TooLarge { path: String, size: u64, limit: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A marker found in a content file, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: DependencyKind,
    pub reference: String,
    /// 1-based line number
    pub line: usize,
}

/// Find every dependency marker in `content`, in file order.
///
/// Markers must start at the beginning of the line. Repeated
/// `(kind, reference)` pairs are reported once.
pub fn find_markers(content: &str) -> Vec<Marker> {
    let mut seen = HashSet::new();
    let mut markers = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let Some(caps) = MARKER.captures(line) else {
            continue;
        };
        let kind = match &caps[1] {
            "presetlist" => DependencyKind::Presetlist,
            _ => DependencyKind::Background,
        };
        let reference = caps[2].to_string();
        if seen.insert((kind, reference.clone())) {
            markers.push(Marker {
                kind,
                reference,
                line: idx + 1,
            });
        }
    }
    markers
}

/// Whether a reference points outside the repository by URL.
pub fn is_external(reference: &str) -> bool {
    reference.contains("://") || reference.starts_with("//")
}

/// Extract and validate the dependencies of one content file.
///
/// - `file`: display path of the content file, used in error messages
/// - `source`: content source directory
/// - `category_dir`: `/`-separated `<root>/<category>` relative to `source`
pub fn extract(
    file: &str,
    content: &str,
    source: &Path,
    category_dir: &str,
    config: &HubConfig,
) -> Result<Vec<Dependency>, DependencyError> {
    let mut deps = Vec::new();
    let mut seen = HashSet::new();
    for marker in find_markers(content) {
        let resolved = resolve(file, &marker, source, category_dir)?;
        check_size(&resolved, marker.kind, config)?;

        let relative = normalize_reference(&marker.reference);
        if !seen.insert((marker.kind, relative.clone())) {
            continue;
        }

        let name = Path::new(&marker.reference)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        tracing::debug!(
            file,
            line = marker.line,
            marker = marker.kind.marker(),
            reference = %marker.reference,
            "resolved dependency"
        );

        deps.push(Dependency {
            kind: marker.kind,
            name,
            download_url: config.url_for(&format!("{category_dir}/{relative}")),
        });
    }
    Ok(deps)
}

/// `/`-joined normal components of a reference, dropping `.` segments.
fn normalize_reference(reference: &str) -> String {
    Path::new(reference)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn resolve(
    file: &str,
    marker: &Marker,
    source: &Path,
    category_dir: &str,
) -> Result<PathBuf, DependencyError> {
    let reference = &marker.reference;
    if is_external(reference) {
        return Err(DependencyError::ExternalUrl {
            file: file.to_string(),
            reference: reference.clone(),
        });
    }

    let ref_path = Path::new(reference);
    let escapes = ref_path.is_absolute()
        || reference.starts_with('/')
        || reference.starts_with('\\')
        || ref_path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(DependencyError::OutsideRepository {
            file: file.to_string(),
            reference: reference.clone(),
        });
    }

    let extension = marker.kind.extension();
    let has_extension = ref_path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if !has_extension {
        return Err(DependencyError::UnexpectedExtension {
            file: file.to_string(),
            label: marker.kind.label(),
            reference: reference.clone(),
            extension,
        });
    }

    let resolved = source.join(category_dir).join(ref_path);
    if !resolved.is_file() {
        return Err(DependencyError::Missing {
            file: file.to_string(),
            label: marker.kind.label(),
            reference: reference.clone(),
        });
    }
    Ok(resolved)
}

fn check_size(path: &Path, kind: DependencyKind, config: &HubConfig) -> Result<(), DependencyError> {
    let limit = match kind {
        DependencyKind::Presetlist => config.limits.max_sequence_bytes,
        DependencyKind::Background => config.limits.max_background_bytes,
    };
    let size = path.metadata()?.len();
    if size > limit {
        return Err(DependencyError::TooLarge {
            path: path.display().to_string(),
            size,
            limit,
        });
    }
    Ok(())
}
