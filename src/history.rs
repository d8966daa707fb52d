//! Last-modified timestamps for content files.
//!
//! The [`History`] trait is the seam between the scanner and wherever
//! timestamps come from. Production builds ask git for the last commit that
//! touched the file; a checkout without history (shallow clones, tarballs)
//! can switch to filesystem modification times instead.
//!
//! Neither implementation fails: when a timestamp cannot be determined the
//! current time is used, so a file with no history sorts as newest.

use crate::config::HistorySource;
use chrono::{DateTime, SubsecRound, Utc};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of `updated_at` timestamps.
pub trait History {
    /// Timestamp for a file, given relative to the content source directory.
    fn last_modified(&self, relative: &Path) -> DateTime<Utc>;
}

/// Current UTC time truncated to whole seconds.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Build the configured history for a source directory.
pub fn from_config(source: HistorySource, root: &Path) -> Box<dyn History> {
    match source {
        HistorySource::Git => Box::new(GitHistory::new(root)),
        HistorySource::Modified => Box::new(ModifiedHistory::new(root)),
    }
}

/// Timestamps from `git log -1 --format=%cI`.
pub struct GitHistory {
    root: PathBuf,
}

impl GitHistory {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn query(&self, relative: &Path) -> Option<DateTime<Utc>> {
        let output = Command::new("git")
            .args(["log", "-1", "--format=%cI", "--"])
            .arg(relative)
            .current_dir(&self.root)
            .output()
            .ok()
            .filter(|o| o.status.success())?;
        parse_commit_date(&String::from_utf8_lossy(&output.stdout))
    }
}

impl History for GitHistory {
    fn last_modified(&self, relative: &Path) -> DateTime<Utc> {
        self.query(relative).unwrap_or_else(|| {
            tracing::debug!(
                path = %relative.display(),
                "no git history, using current time"
            );
            now()
        })
    }
}

/// Parse git's strict ISO 8601 committer date (`%cI`) into UTC.
pub fn parse_commit_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Timestamps from filesystem modification times.
pub struct ModifiedHistory {
    root: PathBuf,
}

impl ModifiedHistory {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

impl History for ModifiedHistory {
    fn last_modified(&self, relative: &Path) -> DateTime<Utc> {
        match self.root.join(relative).metadata().and_then(|m| m.modified()) {
            Ok(time) => DateTime::<Utc>::from(time).trunc_subsecs(0),
            Err(err) => {
                tracing::debug!(
                    path = %relative.display(),
                    error = %err,
                    "no modification time, using current time"
                );
                now()
            }
        }
    }
}
