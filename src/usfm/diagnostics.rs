//! Diagnostics
//!
//! Problems found in the data never abort processing. Each one is recorded
//! as a [`Diagnostic`] carrying its location and a priority weight from 0
//! to 100 (higher is more serious), and is logged through `tracing` at the
//! moment it is recorded. The collected list is handed back with the
//! assembled book.

use super::position::BookPosition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weights at or above this are logged as errors rather than warnings.
pub const SEVERE_WEIGHT: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// A line marker the registry does not know and could not recover
    UnknownMarker,
    /// An unknown marker that turned out to be a known one run into its text
    MarkerRecovered,
    /// A character or note marker found at the start of a physical line
    UnexpectedMarkerPlacement,
    UnbalancedUnderline,
    UnknownSemanticTag,
    UnknownStrongsTag,
    MalformedTagSyntax,
    EmptyFile,
    /// A line-level marker found in the middle of a line's text
    EmbeddedNewlineMarker,
    StrayBackslash,
    /// A numberable marker written without its level number (ESFM)
    UnnumberedMarker,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnknownMarker => "UnknownMarker",
            DiagnosticKind::MarkerRecovered => "MarkerRecovered",
            DiagnosticKind::UnexpectedMarkerPlacement => "UnexpectedMarkerPlacement",
            DiagnosticKind::UnbalancedUnderline => "UnbalancedUnderline",
            DiagnosticKind::UnknownSemanticTag => "UnknownSemanticTag",
            DiagnosticKind::UnknownStrongsTag => "UnknownStrongsTag",
            DiagnosticKind::MalformedTagSyntax => "MalformedTagSyntax",
            DiagnosticKind::EmptyFile => "EmptyFile",
            DiagnosticKind::EmbeddedNewlineMarker => "EmbeddedNewlineMarker",
            DiagnosticKind::StrayBackslash => "StrayBackslash",
            DiagnosticKind::UnnumberedMarker => "UnnumberedMarker",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded problem. Created once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub book: String,
    pub chapter: String,
    pub verse: String,
    pub weight: u8,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        position: &BookPosition,
        kind: DiagnosticKind,
        weight: u8,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            book: position.book.clone(),
            chapter: position.chapter.clone(),
            verse: position.verse.clone(),
            weight: weight.min(100),
            kind,
            message: message.into(),
        }
    }

    pub fn is_severe(&self) -> bool {
        self.weight >= SEVERE_WEIGHT
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}:{} [{}] {}: {}",
            self.book, self.chapter, self.verse, self.weight, self.kind, self.message
        )
    }
}

/// Diagnostics collected for one book, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a diagnostic at `position` and record it.
    pub fn record(
        &mut self,
        position: &BookPosition,
        kind: DiagnosticKind,
        weight: u8,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::new(position, kind, weight, message));
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_severe() {
            tracing::error!(
                book = %diagnostic.book,
                chapter = %diagnostic.chapter,
                verse = %diagnostic.verse,
                weight = diagnostic.weight,
                kind = %diagnostic.kind,
                "{}",
                diagnostic.message
            );
        } else {
            tracing::warn!(
                book = %diagnostic.book,
                chapter = %diagnostic.chapter,
                verse = %diagnostic.verse,
                weight = diagnostic.weight,
                kind = %diagnostic.kind,
                "{}",
                diagnostic.message
            );
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Most serious first; equal weights keep their discovery order.
    pub fn by_priority(&self) -> Vec<&Diagnostic> {
        let mut sorted: Vec<&Diagnostic> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.weight.cmp(&a.weight));
        sorted
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
