//! Path convention parser for content files.
//!
//! A content file's location encodes who wrote it and where it is listed.
//! Two layouts are supported, selected by [`Layout`]:
//!
//! ```text
//! directory:  packages/relax/r/ruanklein/focus.spsq
//!             └─root─┘ └cat┘ │ └author─┘ └name┘
//!                          letter
//!
//! filename:   packages/relax/r/ruanklein-focus.spsq
//!                              └author─┘ └name┘
//! ```
//!
//! In both layouts the `letter` directory must be the lower-cased first
//! character of the author. Every segment must be non-empty and use only
//! ASCII letters, digits, `-` and `_`, which keeps the derived identifier
//! `author.category.name` free of whitespace and path separators.
//!
//! ## Display Names
//!
//! Names are kebab-case on disk. For display each dash-separated word gets an
//! upper-case first letter:
//! - `deep-focus` → "Deep Focus"
//! - `alpha_waves` → "Alpha_waves"

use crate::config::Layout;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum NamingError {
    #[error("Invalid path '{path}': expected {expected}")]
    Shape { path: String, expected: &'static str },
    #[error("Invalid path '{path}': {part} '{value}' may only contain letters, digits, '-' and '_'")]
    IllegalSegment {
        path: String,
        part: &'static str,
        value: String,
    },
    #[error("Invalid path '{path}': {part} is empty")]
    EmptySegment { path: String, part: &'static str },
    #[error("Invalid path '{path}': prefix letter '{letter}' does not match author '{author}'")]
    PrefixMismatch {
        path: String,
        letter: String,
        author: String,
    },
}

/// Identity derived from a content file's path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath {
    pub root: String,
    pub category: String,
    pub author: String,
    pub name: String,
}

impl ContentPath {
    /// `author.category.name`
    pub fn identifier(&self) -> String {
        format!("{}.{}.{}", self.author, self.category, self.name)
    }

    /// `root/category`, the directory dependency references resolve against.
    pub fn category_dir(&self) -> String {
        format!("{}/{}", self.root, self.category)
    }
}

/// True when `s` is non-empty and only holds `[A-Za-z0-9_-]`.
pub fn is_valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Parse a content file path relative to the source directory.
pub fn parse_content_path(relative: &Path, layout: Layout) -> Result<ContentPath, NamingError> {
    let display = to_slash(relative);

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => {
                return Err(NamingError::Shape {
                    path: display,
                    expected: "a plain relative path",
                });
            }
        }
    }

    let expected = match layout {
        Layout::Directory => "'<root>/<category>/<letter>/<author>/<name>.<ext>'",
        Layout::Filename => "'<root>/<category>/<letter>/<author>-<name>.<ext>'",
    };
    let depth = match layout {
        Layout::Directory => 5,
        Layout::Filename => 4,
    };
    if parts.len() != depth {
        return Err(NamingError::Shape {
            path: display,
            expected,
        });
    }

    let stem = Path::new(&parts[depth - 1])
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let (author, name) = match layout {
        Layout::Directory => (parts[3].clone(), stem),
        Layout::Filename => match stem.split_once('-') {
            Some((author, name)) => (author.to_string(), name.to_string()),
            None => {
                return Err(NamingError::Shape {
                    path: display,
                    expected,
                });
            }
        },
    };

    let root = parts[0].clone();
    let category = parts[1].clone();
    let letter = parts[2].clone();

    for (part, value) in [
        ("root", &root),
        ("category", &category),
        ("prefix letter", &letter),
        ("author", &author),
        ("name", &name),
    ] {
        check_segment(&display, part, value)?;
    }

    let expected_letter = author
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase().to_string())
        .unwrap_or_default();
    if letter != expected_letter {
        return Err(NamingError::PrefixMismatch {
            path: display,
            letter,
            author,
        });
    }

    Ok(ContentPath {
        root,
        category,
        author,
        name,
    })
}

fn check_segment(path: &str, part: &'static str, value: &str) -> Result<(), NamingError> {
    if value.is_empty() {
        return Err(NamingError::EmptySegment {
            path: path.to_string(),
            part,
        });
    }
    if !is_valid_segment(value) {
        return Err(NamingError::IllegalSegment {
            path: path.to_string(),
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Convert a kebab-case name to Title Case.
pub fn display_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
