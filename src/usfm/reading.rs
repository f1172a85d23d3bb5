//! Reading SFM source into physical lines
//!
//! Every line that starts with a backslash opens a new record: the marker
//! runs up to the first whitespace and the rest of the line is its text.
//! Lines that do not start with a backslash continue the previous record.
//! Blank lines are skipped. Text found before the first marker becomes a
//! record with an empty marker so the assembler can report it.

use crate::usfm::assembling::PhysicalLine;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Split SFM source into physical lines.
pub fn read_physical_lines(source: &str) -> Vec<PhysicalLine> {
    let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
    let mut lines: Vec<PhysicalLine> = Vec::new();

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let line = line.replace('~', " ");

        if let Some(rest) = line.strip_prefix('\\') {
            let (marker, text) = match rest.split_once(char::is_whitespace) {
                Some((marker, text)) => (marker, text.trim_start()),
                None => (rest, ""),
            };
            lines.push(PhysicalLine::new(marker, text));
            continue;
        }

        match lines.last_mut() {
            Some(previous) => {
                if !previous.text.is_empty() {
                    previous.text.push(' ');
                }
                previous.text.push_str(&line);
            }
            None => lines.push(PhysicalLine::new("", line)),
        }
    }

    lines
}

/// Read and split an SFM file.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<PhysicalLine>, ReadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(read_physical_lines(&source))
}
