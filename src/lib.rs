//! # seqhub
//!
//! Static catalog generator for a repository of user-contributed SynapSeq
//! sequence files. The repository is the data source: directories name the
//! category and author, files are the sequences, and in-file markers declare
//! what else a sequence needs to play.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Manifest  packages/  →  manifest.json   (filesystem → validated index)
//! 2. Page      manifest   →  dist/           (index.html + static assets)
//! ```
//!
//! The manifest is the only thing the stages share. It is plain JSON, also
//! served to the browser, so the page script can resolve dependencies without
//! a server.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content roots, validates files, builds the manifest |
//! | [`generate`] | Stage 2: renders `base.html` and copies assets into the output directory |
//! | [`naming`] | Path convention parser that derives category, author and identifier |
//! | [`dependencies`] | `@presetlist` / `@background` marker extraction and validation |
//! | [`history`] | `updated_at` timestamps from git or file modification times |
//! | [`config`] | `hub.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Manifest types shared by both stages |
//! | [`output`] | CLI output formatting |
//!
//! # Validation Is a Gate
//!
//! The manifest stage exists to keep bad content from being published. Every
//! check is fatal and the first failure aborts the run with a typed error;
//! nothing is skipped or repaired. Helpers return `Result` and only the binary
//! decides to exit.

pub mod config;
pub mod dependencies;
pub mod generate;
pub mod history;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
