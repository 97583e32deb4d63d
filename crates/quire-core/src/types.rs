//! Core data types for the Quire content service.
//!
//! An [`Entry`] is a single markdown file loaded from the content directory.
//! Entries are immutable once loaded; a directory rescan replaces the whole
//! list. Entry identifiers are positions in the name-sorted file list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ============================================================================
// ID Types
// ============================================================================

/// Identifier of an entry: its index in the scanned file list.
///
/// Positions are only stable while the content directory is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub usize);

impl EntryId {
    /// Creates an EntryId from a list index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the list index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when an entry id is not a non-negative integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid entry id {0:?}: expected a non-negative integer")]
pub struct EntryIdParseError(pub String);

impl FromStr for EntryId {
    type Err = EntryIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<usize>()
            .map(Self)
            .map_err(|_| EntryIdParseError(s.to_string()))
    }
}

// ============================================================================
// Content Hash
// ============================================================================

/// BLAKE3 hash of an entry's markdown source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hashes the given bytes.
    #[must_use]
    pub fn compute(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Returns the raw hash bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hash as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

// ============================================================================
// Entry
// ============================================================================

/// Where an entry's title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    /// First level-1 heading in the document.
    Heading,
    /// File stem, used when the document has no level-1 heading.
    FileName,
}

/// A markdown-backed content unit.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    /// Position in the scanned file list.
    pub id: EntryId,
    /// Path of the backing file.
    pub path: PathBuf,
    /// Raw markdown source.
    pub source: String,
    /// Derived title.
    pub title: String,
    /// Whether the title came from a heading or the file name.
    pub title_source: TitleSource,
    /// Hash of `source`.
    pub hash: ContentHash,
}

impl Entry {
    /// Builds an entry, deriving its title and hash from the source.
    pub fn new(id: EntryId, path: PathBuf, source: String) -> Self {
        let (title, title_source) = match heading_title(&source) {
            Some(title) => (title, TitleSource::Heading),
            None => (file_stem(&path), TitleSource::FileName),
        };
        let hash = ContentHash::compute(source.as_bytes());

        Self {
            id,
            path,
            source,
            title,
            title_source,
            hash,
        }
    }
}

/// Returns the text of the first level-1 ATX heading outside code fences.
pub fn heading_title(source: &str) -> Option<String> {
    let mut fence: Option<&str> = None;

    for line in source.lines() {
        let trimmed = line.trim_start();

        if let Some(open) = fence {
            if trimmed.starts_with(open) {
                fence = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            continue;
        }

        // ATX headings allow at most three spaces of indentation.
        if line.len() - trimmed.len() > 3 {
            continue;
        }
        let Some(rest) = trimmed.strip_prefix('#') else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t')) {
            continue;
        }

        let text = strip_closing_sequence(rest.trim());
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }

    None
}

/// Drops an ATX closing `#` run, which only counts when preceded by
/// whitespace (`# C#` keeps its `#`).
fn strip_closing_sequence(text: &str) -> &str {
    let without = text.trim_end_matches('#');
    if without.is_empty() {
        return without;
    }
    if without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        text
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_parse() {
        assert_eq!("3".parse::<EntryId>().unwrap(), EntryId::new(3));
        assert_eq!(" 0 ".parse::<EntryId>().unwrap(), EntryId::new(0));
        assert!("-1".parse::<EntryId>().is_err());
        assert!("abc".parse::<EntryId>().is_err());
        assert!("".parse::<EntryId>().is_err());
    }

    #[test]
    fn test_entry_id_serializes_as_integer() {
        let json = serde_json::to_string(&EntryId::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_title_from_heading() {
        let entry = Entry::new(
            EntryId::new(0),
            PathBuf::from("notes/intro.md"),
            "Some preamble\n\n# Getting Started #\n\nBody".to_string(),
        );
        assert_eq!(entry.title, "Getting Started");
        assert_eq!(entry.title_source, TitleSource::Heading);
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let entry = Entry::new(
            EntryId::new(1),
            PathBuf::from("notes/release-notes.md"),
            "## Only a subheading\n".to_string(),
        );
        assert_eq!(entry.title, "release-notes");
        assert_eq!(entry.title_source, TitleSource::FileName);
    }

    #[test]
    fn test_heading_inside_fence_ignored() {
        let source = "```sh\n# not a title\n```\n\n# Real Title\n";
        assert_eq!(heading_title(source).as_deref(), Some("Real Title"));
    }

    #[test]
    fn test_closing_hashes_need_leading_space() {
        assert_eq!(heading_title("# C#\n").as_deref(), Some("C#"));
        assert_eq!(heading_title("# Title ##\n").as_deref(), Some("Title"));
        assert_eq!(heading_title("# F# and C# #\n").as_deref(), Some("F# and C#"));
        assert_eq!(heading_title("# #\n# Next\n").as_deref(), Some("Next"));
    }

    #[test]
    fn test_hashtag_is_not_heading() {
        assert_eq!(heading_title("#hashtag\n"), None);
        assert_eq!(heading_title("    # indented code\n"), None);
    }

    #[test]
    fn test_content_hash_changes_with_source() {
        let a = ContentHash::compute(b"hello");
        let b = ContentHash::compute(b"hello!");
        assert_ne!(a, b);
        assert_eq!(a, ContentHash::compute(b"hello"));
        assert_eq!(a.to_hex().len(), 64);
    }
}
