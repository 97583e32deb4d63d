//! Display hierarchy for the tree view.
//!
//! A [`Node`] is derived from an [`Entry`]: every line that starts with a
//! timestamp (`1:02:03 Title`, `02:03 Title`, optionally in backticks or
//! brackets, optionally as a list item) becomes a [`Segment`].

use serde::{Deserialize, Serialize};

use crate::types::{Entry, EntryId};

/// A timestamped child of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Offset in seconds.
    pub timestamp: u64,
    /// Segment title.
    pub title: String,
}

impl Segment {
    /// Formats the timestamp as `H:MM:SS`, or `M:SS` under an hour.
    pub fn display_timestamp(&self) -> String {
        let hours = self.timestamp / 3600;
        let minutes = (self.timestamp % 3600) / 60;
        let seconds = self.timestamp % 60;
        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

/// A display-oriented tree item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: EntryId,
    pub title: String,
    /// Segments in document order.
    pub segments: Vec<Segment>,
}

impl Node {
    /// Builds the node for an entry.
    pub fn from_entry(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            title: entry.title.clone(),
            segments: extract_segments(&entry.source),
        }
    }
}

/// Extracts segments from markdown source, skipping fenced code blocks.
pub fn extract_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut fence: Option<&str> = None;

    for line in source.lines() {
        let trimmed = line.trim();
        if let Some(open) = fence {
            if trimmed.starts_with(open) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(*m)) {
            fence = Some(open);
            continue;
        }
        if let Some(segment) = parse_segment_line(strip_list_marker(trimmed)) {
            segments.push(segment);
        }
    }

    segments
}

fn strip_list_marker(line: &str) -> &str {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }

    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }

    line
}

fn parse_segment_line(line: &str) -> Option<Segment> {
    let (token, rest) = if let Some(inner) = line.strip_prefix('`') {
        let end = inner.find('`')?;
        (&inner[..end], &inner[end + 1..])
    } else if let Some(inner) = line.strip_prefix('[') {
        let end = inner.find(']')?;
        let mut rest = &inner[end + 1..];
        // `[01:30](link) Title`
        if rest.starts_with('(') {
            let close = rest.find(')')?;
            rest = &rest[close + 1..];
        }
        (&inner[..end], rest)
    } else {
        let end = line.find(char::is_whitespace).unwrap_or(line.len());
        (&line[..end], &line[end..])
    };

    let timestamp = parse_timestamp(token)?;
    let title = rest
        .trim_start()
        .trim_start_matches(['-', ':', '|'])
        .trim();
    if title.is_empty() {
        return None;
    }

    Some(Segment {
        timestamp,
        title: title.to_string(),
    })
}

/// Parses `H:MM:SS` or `M:SS` into seconds.
///
/// Minutes and seconds must be below 60 where a larger unit is present.
pub fn parse_timestamp(token: &str) -> Option<u64> {
    let parts: Vec<&str> = token.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    for (i, part) in parts.iter().enumerate() {
        let too_wide = i > 0 && part.len() > 2;
        if part.is_empty() || too_wide || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    let values: Vec<u64> = parts
        .iter()
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .ok()?;

    // Out-of-range leading parts overflow to None rather than wrapping.
    match values.as_slice() {
        [minutes, seconds] if *seconds < 60 => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => hours
            .checked_mul(3600)?
            .checked_add(minutes * 60 + seconds),
        _ => None,
    }
}
