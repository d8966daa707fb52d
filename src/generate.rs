//! Static page generation.
//!
//! Stage 2 of the hub build. Takes the manifest written by [`crate::scan`]
//! and produces the publishable site.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html              # base.html with placeholders filled in
//! ├── manifest.json           # copied verbatim, fetched by main.js
//! ├── static/
//! │   ├── style.css
//! │   ├── main.js
//! │   ├── logo.png
//! │   └── favicon.ico
//! └── packages/               # content roots, copied as-is
//!     └── ...
//! ```
//!
//! ## Templates
//!
//! `base.html` is plain HTML with `{{key}}` placeholders. Substitution is
//! literal: no escaping, no loops, no conditionals. The sequence table is
//! pre-rendered into the `rows` value with maud, which escapes each cell.
//!
//! | Placeholder        | Value |
//! |--------------------|-------|
//! | `{{total}}`        | number of entries |
//! | `{{categories}}`   | number of distinct categories |
//! | `{{authors}}`      | number of distinct authors |
//! | `{{version}}`      | manifest schema version |
//! | `{{last_updated}}` | manifest `lastUpdated` |
//! | `{{generated_at}}` | time this page was generated |
//! | `{{rows}}`         | one `<tr>` per entry |
//!
//! The output directory is deleted and recreated on every run. Directories
//! that overlap the inputs are refused before anything is deleted.

use crate::config::HubConfig;
use crate::types::{Entry, Manifest};
use chrono::{DateTime, SecondsFormat, Utc};
use maud::html;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Template rendered into `index.html`.
pub const TEMPLATE_FILE: &str = "base.html";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("valid regex"));

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Manifest not found: {0}")]
    MissingManifest(PathBuf),
    #[error("Template not found: {0}")]
    MissingTemplate(PathBuf),
    #[error("Refusing to use {0} as output directory: it overlaps the source, a content root, the template directory or the manifest")]
    UnsafeOutput(PathBuf),
}

/// What a generate run produced, for CLI output.
#[derive(Debug, Default)]
pub struct PageReport {
    pub output_dir: PathBuf,
    pub entries: usize,
    pub assets_copied: Vec<String>,
    pub assets_missing: Vec<String>,
    pub roots_copied: Vec<String>,
    pub roots_missing: Vec<String>,
    /// Placeholders in the template that had no value.
    pub unresolved: Vec<String>,
}

/// Render the site.
///
/// - `manifest_path`: manifest written by the scan stage
/// - `source`: content source directory holding the content roots
/// - `template_dir`: directory holding `base.html` and the static assets
/// - `output_dir`: destination, recreated from scratch
pub fn generate(
    manifest_path: &Path,
    source: &Path,
    template_dir: &Path,
    output_dir: &Path,
    config: &HubConfig,
) -> Result<PageReport, GenerateError> {
    if !manifest_path.is_file() {
        return Err(GenerateError::MissingManifest(manifest_path.to_path_buf()));
    }
    let template_path = template_dir.join(TEMPLATE_FILE);
    if !template_path.is_file() {
        return Err(GenerateError::MissingTemplate(template_path));
    }

    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;
    let template = fs::read_to_string(&template_path)?;

    check_output_dir(output_dir, source, template_dir, manifest_path, config)?;
    clean_output(output_dir)?;

    let mut report = PageReport {
        output_dir: output_dir.to_path_buf(),
        entries: manifest.entries.len(),
        ..Default::default()
    };

    // Static assets
    let static_dir = output_dir.join("static");
    fs::create_dir_all(&static_dir)?;
    for asset in &config.page.assets {
        let src = template_dir.join(asset);
        if src.is_file() {
            fs::copy(&src, static_dir.join(asset))?;
            report.assets_copied.push(asset.clone());
        } else {
            tracing::warn!(asset = %src.display(), "asset not found");
            report.assets_missing.push(asset.clone());
        }
    }

    // Content roots
    for root in &config.content.roots {
        let src = source.join(root);
        if src.is_dir() {
            copy_dir_recursive(&src, &output_dir.join(root), config.page.preserve_timestamps)?;
            report.roots_copied.push(root.clone());
        } else {
            tracing::warn!(root = %src.display(), "content root not found");
            report.roots_missing.push(root.clone());
        }
    }

    fs::write(output_dir.join("manifest.json"), &manifest_content)?;

    let context = build_context(&manifest, crate::history::now());
    let (page, unresolved) = render_template(&template, &context);
    for key in &unresolved {
        tracing::warn!(placeholder = %key, "template placeholder has no value");
    }
    report.unresolved = unresolved;
    fs::write(output_dir.join("index.html"), page)?;

    Ok(report)
}

/// Refuse an output directory whose cleaning or filling would touch inputs.
///
/// The output may not contain the source directory, and may neither contain
/// nor sit inside a content root or the template directory. A manifest inside
/// the output is only allowed at `<output>/manifest.json`, which is rewritten.
fn check_output_dir(
    output_dir: &Path,
    source: &Path,
    template_dir: &Path,
    manifest_path: &Path,
    config: &HubConfig,
) -> Result<(), GenerateError> {
    let output = resolve_path(output_dir)?;
    let unsafe_output = || GenerateError::UnsafeOutput(output_dir.to_path_buf());

    if resolve_path(source)?.starts_with(&output) {
        return Err(unsafe_output());
    }

    let mut protected = vec![resolve_path(template_dir)?];
    for root in &config.content.roots {
        protected.push(resolve_path(&source.join(root))?);
    }
    if protected
        .iter()
        .any(|p| p.starts_with(&output) || output.starts_with(p))
    {
        return Err(unsafe_output());
    }

    let manifest = resolve_path(manifest_path)?;
    if manifest.starts_with(&output) && manifest != output.join("manifest.json") {
        return Err(unsafe_output());
    }
    Ok(())
}

/// Canonical form of a path that may not exist yet.
///
/// The longest existing ancestor is canonicalized and the remaining
/// components are appended as given.
fn resolve_path(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }
    let mut resolved = existing.canonicalize()?;
    for name in rest.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

/// Delete and recreate the output directory.
fn clean_output(output_dir: &Path) -> Result<(), GenerateError> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;
    Ok(())
}

/// Copy a directory tree, optionally carrying over modification times.
fn copy_dir_recursive(src: &Path, dst: &Path, preserve_timestamps: bool) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path, preserve_timestamps)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            if preserve_timestamps {
                let modified = fs::metadata(&src_path)?.modified()?;
                fs::File::options()
                    .write(true)
                    .open(&dst_path)?
                    .set_modified(modified)?;
            }
        }
    }
    Ok(())
}

/// Placeholder values for `base.html`.
pub fn build_context(manifest: &Manifest, generated_at: DateTime<Utc>) -> Vec<(&'static str, String)> {
    let categories: BTreeSet<&str> = manifest.entries.iter().map(|e| e.category.as_str()).collect();
    let authors: BTreeSet<&str> = manifest.entries.iter().map(|e| e.author.as_str()).collect();

    vec![
        ("total", manifest.entries.len().to_string()),
        ("categories", categories.len().to_string()),
        ("authors", authors.len().to_string()),
        ("version", manifest.version.clone()),
        ("last_updated", timestamp(&manifest.last_updated)),
        ("generated_at", timestamp(&generated_at)),
        ("rows", render_rows(&manifest.entries)),
    ]
}

/// Replace every `{{key}}` with its value in a single pass.
///
/// Values are inserted verbatim and never re-scanned. Returns the rendered
/// text and the keys that had no value; those placeholders are left as-is.
pub fn render_template(template: &str, context: &[(&str, String)]) -> (String, Vec<String>) {
    let mut unresolved = Vec::new();
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        let key = &caps[1];
        match context.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => value.clone(),
            None => {
                if !unresolved.iter().any(|u| u == key) {
                    unresolved.push(key.to_string());
                }
                caps[0].to_string()
            }
        }
    });
    (rendered.into_owned(), unresolved)
}

/// Pre-rendered table rows, one line per entry.
pub fn render_rows(entries: &[Entry]) -> String {
    let mut rows = String::new();
    for entry in entries {
        let updated = timestamp(&entry.updated_at);
        let row = html! {
            tr onclick=(format!("showSequence('/{}')", entry.path)) data-id=(entry.id) {
                td { (entry.category) }
                td.sequence-name { (entry.display_name) }
                td.author-name { (entry.author) }
                td.updated-time data-timestamp=(updated) { (updated) }
            }
        };
        rows.push_str(&row.into_string());
        rows.push('\n');
    }
    rows
}

fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
