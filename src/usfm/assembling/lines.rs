//! Line records
//!
//! A physical line is what a reader produced from one backslash-introduced
//! record of the file. A logical line is what the assembler emits: exactly
//! one line-level marker and the text that belongs to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::usfm::diagnostics::Diagnostics;

/// Marker and text as read from the file (marker without its backslash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalLine {
    pub marker: String,
    pub text: String,
}

impl PhysicalLine {
    pub fn new(marker: impl Into<String>, text: impl Into<String>) -> Self {
        PhysicalLine {
            marker: marker.into(),
            text: text.into(),
        }
    }
}

/// One marker and its text, after assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalLine {
    pub marker: String,
    pub text: String,
}

impl LogicalLine {
    pub fn new(marker: impl Into<String>, text: impl Into<String>) -> Self {
        LogicalLine {
            marker: marker.into(),
            text: text.into(),
        }
    }
}

impl From<LogicalLine> for PhysicalLine {
    fn from(line: LogicalLine) -> Self {
        PhysicalLine::new(line.marker, line.text)
    }
}

impl fmt::Display for LogicalLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "\\{}", self.marker)
        } else {
            write!(f, "\\{} {}", self.marker, self.text)
        }
    }
}

/// Markup dialect of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Usfm,
    Esfm,
}

impl Dialect {
    /// Guess from the file extension; anything but `.esfm` is USFM.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("esfm") => Dialect::Esfm,
            _ => Dialect::Usfm,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Usfm => "USFM",
            Dialect::Esfm => "ESFM",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of assembling one book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledBook {
    pub book: String,
    pub dialect: Dialect,
    pub lines: Vec<LogicalLine>,
    pub diagnostics: Diagnostics,
}

impl AssembledBook {
    /// One `\marker text` line per logical line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}
