//! CLI output formatting for both stages.
//!
//! Output is information-first: every entry leads with its positional index
//! and identifier, with the source path and dependencies shown as indented
//! context lines.
//!
//! # Output Format
//!
//! ## Manifest
//!
//! ```text
//! Entries
//! 001 ruanklein.relax.focus
//!     Source: packages/relax/r/ruanklein/focus.spsq
//!     Updated: 2025-03-01T09:00:00Z
//!     Preset list: presets-calm
//!     Background: rain
//! 002 ana.sleep.nap
//!     Source: packages/sleep/a/ana/nap.spsq
//!     Updated: 2025-02-01T09:00:00Z
//!
//! Manifest built with 2 entries
//!     Version: 1.0.0 | Updated: 2025-03-02T00:00:00Z
//! ```
//!
//! ## Page
//!
//! ```text
//! Static
//!     style.css → static/style.css
//!     logo.png (missing)
//! Content
//!     packages/ → packages/
//! manifest.json → manifest.json
//! index.html (2 entries)
//! ```
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::generate::PageReport;
use crate::types::{DependencyKind, Manifest};
use chrono::SecondsFormat;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn entry_count(n: usize) -> String {
    if n == 1 {
        "1 entry".to_string()
    } else {
        format!("{n} entries")
    }
}

fn dependency_label(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Presetlist => "Preset list",
        DependencyKind::Background => "Background",
    }
}

// ============================================================================
// Stage 1: Manifest output
// ============================================================================

/// Format the scanned entries, one block per entry.
pub fn format_entries(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Entries".to_string()];
    if manifest.entries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, entry) in manifest.entries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), entry.id));
        lines.push(format!("{}Source: {}", indent(1), entry.path));
        lines.push(format!(
            "{}Updated: {}",
            indent(1),
            entry.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        if let Some(thumb) = &entry.thumbnail {
            lines.push(format!("{}Thumbnail: {}", indent(1), thumb));
        }
        for dep in &entry.dependencies {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                dependency_label(dep.kind),
                dep.name
            ));
        }
    }
    lines
}

/// Format the manifest stage output, including the summary footer.
pub fn format_manifest_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = format_entries(manifest);
    lines.push(String::new());
    lines.push(format!(
        "Manifest built with {}",
        entry_count(manifest.entries.len())
    ));
    lines.push(format!(
        "{}Version: {} | Updated: {}",
        indent(1),
        manifest.version,
        manifest
            .last_updated
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    lines
}

/// Print manifest output to stdout.
pub fn print_manifest_output(manifest: &Manifest) {
    for line in format_manifest_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Page output
// ============================================================================

/// Format page generation output.
pub fn format_page_output(report: &PageReport) -> Vec<String> {
    let mut lines = vec!["Static".to_string()];
    for asset in &report.assets_copied {
        lines.push(format!("{}{} \u{2192} static/{}", indent(1), asset, asset));
    }
    for asset in &report.assets_missing {
        lines.push(format!("{}{} (missing)", indent(1), asset));
    }

    lines.push("Content".to_string());
    for root in &report.roots_copied {
        lines.push(format!("{}{}/ \u{2192} {}/", indent(1), root, root));
    }
    for root in &report.roots_missing {
        lines.push(format!("{}{}/ (missing)", indent(1), root));
    }

    lines.push("manifest.json \u{2192} manifest.json".to_string());
    lines.push(format!("index.html ({})", entry_count(report.entries)));
    for key in &report.unresolved {
        lines.push(format!("{}unresolved placeholder: {{{{{}}}}}", indent(1), key));
    }
    lines
}

/// Print page output to stdout.
pub fn print_page_output(report: &PageReport) {
    for line in format_page_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
