//! Marker descriptors
//!
//! A [`MarkerDescriptor`] is the resolved form of one table entry. Categories
//! and policies are closed enums so classification is checked by `match`
//! rather than by string comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a marker may legally appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerCategory {
    /// Starts a new logical line (paragraphs, headings, chapter/verse numbers)
    Newline,
    /// Character-level marker used inside a line's text
    Internal,
    /// Opens a footnote or cross reference inside a line's text
    Note,
    /// Line-level marker kept for old files but no longer recommended
    Deprecated,
}

impl MarkerCategory {
    /// Deprecated markers are all paragraph-style, so they start lines too.
    pub fn starts_line(self) -> bool {
        matches!(self, MarkerCategory::Newline | MarkerCategory::Deprecated)
    }

    pub fn is_inline(self) -> bool {
        matches!(self, MarkerCategory::Internal | MarkerCategory::Note)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkerCategory::Newline => "newline",
            MarkerCategory::Internal => "internal",
            MarkerCategory::Note => "note",
            MarkerCategory::Deprecated => "deprecated",
        }
    }
}

impl fmt::Display for MarkerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tri-state answer for "should this marker be closed / have content".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPolicy {
    Never,
    Sometimes,
    Always,
}

impl MarkerPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerPolicy::Never => "never",
            MarkerPolicy::Sometimes => "sometimes",
            MarkerPolicy::Always => "always",
        }
    }
}

impl fmt::Display for MarkerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about a single marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerDescriptor {
    /// Base spelling without a level number, e.g. `q`
    pub raw: String,
    /// Preferred spelling for storage, e.g. `q1` (same as `raw` for unnumbered markers)
    pub standard: String,
    pub category: MarkerCategory,
    pub compulsory: bool,
    pub numberable: bool,
    pub nests: bool,
    pub printed: bool,
    pub closed: MarkerPolicy,
    pub content: MarkerPolicy,
    pub name: String,
    pub description: Option<String>,
    /// Zone of the book the marker belongs to, e.g. "Text" or "Introduction"
    pub occurs_in: String,
    /// Highest level number accepted (0 for unnumbered markers)
    pub levels: u8,
}

impl MarkerDescriptor {
    /// Every valid spelling of this marker: the raw form first, then `raw1..=rawN`.
    pub fn spellings(&self) -> Vec<String> {
        let mut spellings = Vec::with_capacity(1 + self.levels as usize);
        spellings.push(self.raw.clone());
        spellings.extend((1..=self.levels).map(|level| format!("{}{}", self.raw, level)));
        spellings
    }
}
