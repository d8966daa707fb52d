//! Shared test utilities for the seqhub test suite.
//!
//! Provides fixture setup, an in-memory [`History`], and lookup helpers that
//! panic with the available keys on a miss.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path(), &HubConfig::default(), &fixture_history()).unwrap();
//!
//! let focus = find_entry(&manifest, "ruanklein.relax.focus");
//! assert_eq!(focus.author, "ruanklein");
//! ```

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

use crate::history::History;
use crate::naming::to_slash;
use crate::types::{Entry, Manifest};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Fixture layout:
///
/// ```text
/// packages/relax/presets-calm.spsq
/// packages/relax/rain.wav
/// packages/relax/r/ruanklein/focus.spsq      (@presetlist + @background)
/// packages/relax/r/ruanklein/focus.png
/// packages/sleep/a/ana/deep-sleep.spsq
/// packages/sleep/a/ana/nap.spsq
/// packages/focus/b/bruno/study.spsq
/// page-template/{base.html, style.css, main.js}
/// ```
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Builder for ad-hoc content trees.
///
/// ```rust,ignore
/// let tmp = ContentTree::new()
///     .file("packages/relax/r/ruanklein/focus.spsq", "alpha 10")
///     .build();
/// ```
#[derive(Default)]
pub struct ContentTree {
    files: Vec<(String, String)>,
}

impl ContentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((path.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (path, content) in &self.files {
            let full = tmp.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(full, content).unwrap();
        }
        tmp
    }
}

// =========================================================================
// Deterministic history
// =========================================================================

/// History backed by a map of `/`-separated relative paths.
///
/// Paths not in the map get `fallback` (2025-01-01T00:00:00Z by default).
pub struct FixedHistory {
    stamps: HashMap<String, DateTime<Utc>>,
    fallback: DateTime<Utc>,
}

impl Default for FixedHistory {
    fn default() -> Self {
        Self {
            stamps: HashMap::new(),
            fallback: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

impl FixedHistory {
    pub fn with(mut self, path: &str, stamp: DateTime<Utc>) -> Self {
        self.stamps.insert(path.to_string(), stamp);
        self
    }
}

impl History for FixedHistory {
    fn last_modified(&self, relative: &Path) -> DateTime<Utc> {
        self.stamps
            .get(&to_slash(relative))
            .copied()
            .unwrap_or(self.fallback)
    }
}

/// Timestamps for the fixture tree.
///
/// `focus` is newest, `deep-sleep` and `nap` tie, `study` falls back to the
/// default (oldest).
pub fn fixture_history() -> FixedHistory {
    FixedHistory::default()
        .with(
            "packages/relax/r/ruanklein/focus.spsq",
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
        )
        .with(
            "packages/sleep/a/ana/deep-sleep.spsq",
            Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
        )
        .with(
            "packages/sleep/a/ana/nap.spsq",
            Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap(),
        )
}

// =========================================================================
// Manifest lookups
// =========================================================================

/// Find an entry by identifier. Panics if not found.
pub fn find_entry<'a>(manifest: &'a Manifest, id: &str) -> &'a Entry {
    manifest
        .entries
        .iter()
        .find(|e| e.id == id)
        .unwrap_or_else(|| {
            let ids = entry_ids(manifest);
            panic!("entry '{id}' not found. Available: {ids:?}")
        })
}

/// All entry identifiers in manifest order.
pub fn entry_ids(manifest: &Manifest) -> Vec<&str> {
    manifest.entries.iter().map(|e| e.id.as_str()).collect()
}
