//! Book position tracking
//!
//! Diagnostics are located by book code plus chapter and verse as they appear
//! in the source (`"3"`, `"4-5"`), so both are kept as strings.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookPosition {
    pub book: String,
    pub chapter: String,
    pub verse: String,
}

impl BookPosition {
    /// Position before the first chapter of `book`.
    pub fn new(book: impl Into<String>) -> Self {
        BookPosition {
            book: book.into(),
            chapter: "0".to_string(),
            verse: "0".to_string(),
        }
    }

    /// Follow `\c` and `\v` lines. Any other marker leaves the position alone.
    pub fn observe(&mut self, marker: &str, text: &str) {
        let Some(number) = text.split_whitespace().next() else {
            return;
        };
        match marker {
            "c" => {
                self.chapter = number.to_string();
                self.verse = "0".to_string();
            }
            "v" => {
                // Single-chapter books have verses but no \c line
                if self.chapter == "0" {
                    self.chapter = "1".to_string();
                }
                self.verse = number.to_string();
            }
            _ => {}
        }
    }
}

impl fmt::Display for BookPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_resets_verse() {
        let mut position = BookPosition::new("GEN");
        position.observe("c", "1");
        position.observe("v", "3 And God said");
        assert_eq!(position.to_string(), "GEN 1:3");
        position.observe("c", "2");
        assert_eq!(position.to_string(), "GEN 2:0");
    }

    #[test]
    fn test_verse_without_chapter_implies_chapter_one() {
        let mut position = BookPosition::new("JUD");
        position.observe("v", "1-2 Jude");
        assert_eq!(position.chapter, "1");
        assert_eq!(position.verse, "1-2");
    }

    #[test]
    fn test_other_markers_and_empty_text_are_ignored() {
        let mut position = BookPosition::new("GEN");
        position.observe("p", "5 words");
        position.observe("c", "   ");
        assert_eq!(position, BookPosition::new("GEN"));
    }
}
