//! In-text marker scanning
//!
//! Finds every backslash-introduced marker inside a line's text using a small
//! logos lexer. The scanner never fails: a backslash that cannot start a
//! marker (followed by a space, an asterisk, another backslash, or nothing)
//! is reported as [`TextMarker::StrayBackslash`] and scanning carries on
//! after it.
//!
//! Offsets are byte offsets of the backslash, so callers can slice the text
//! directly.

use logos::Logos;

/// Tokens of a line's text, as far as markers are concerned.
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
enum TextToken {
    // Backslash plus marker id, stopping before whitespace, '*' or another backslash
    #[regex(r"\\[^ \t\r\n*\\]+")]
    Marker,

    #[token("\\")]
    Backslash,

    #[regex(r"[^\\]+")]
    Text,
}

/// What follows a marker id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// ASCII whitespace separating the marker from its content
    Space,
    /// `*`, i.e. a closing marker such as `\nd*`
    Asterisk,
    /// Nothing: end of text, or another marker starts immediately
    End,
}

impl Terminator {
    /// Bytes the terminator occupies after the marker id.
    pub fn len(self) -> usize {
        match self {
            Terminator::Space | Terminator::Asterisk => 1,
            Terminator::End => 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    fn after(rest: &str) -> Self {
        match rest.chars().next() {
            Some('*') => Terminator::Asterisk,
            Some(c) if c.is_ascii_whitespace() => Terminator::Space,
            _ => Terminator::End,
        }
    }
}

/// A marker (or a stray backslash) found inside text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMarker {
    Marker {
        /// Marker id without the backslash, e.g. `v` or `nd`
        marker: String,
        terminator: Terminator,
        /// Byte offset of the backslash
        offset: usize,
    },
    StrayBackslash {
        offset: usize,
        /// The character after the backslash, if any
        next: Option<char>,
    },
}

impl TextMarker {
    pub fn offset(&self) -> usize {
        match self {
            TextMarker::Marker { offset, .. } | TextMarker::StrayBackslash { offset, .. } => *offset,
        }
    }
}

/// Scan `text` for markers, left to right.
pub fn scan_markers(text: &str) -> Vec<TextMarker> {
    let mut lexer = TextToken::lexer(text);
    let mut found = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(TextToken::Marker) => found.push(TextMarker::Marker {
                marker: lexer.slice()[1..].to_string(),
                terminator: Terminator::after(&text[span.end..]),
                offset: span.start,
            }),
            Ok(TextToken::Backslash) => found.push(TextMarker::StrayBackslash {
                offset: span.start,
                next: text[span.end..].chars().next(),
            }),
            Ok(TextToken::Text) | Err(_) => {}
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(marker: &str, terminator: Terminator, offset: usize) -> TextMarker {
        TextMarker::Marker {
            marker: marker.to_string(),
            terminator,
            offset,
        }
    }

    #[test]
    fn test_plain_text_has_no_markers() {
        assert!(scan_markers("In the beginning").is_empty());
        assert!(scan_markers("").is_empty());
    }

    #[test]
    fn test_markers_with_terminators() {
        let found = scan_markers("hello \\v 5 world\\nd Lord\\nd* end\\f");
        assert_eq!(
            found,
            vec![
                marker("v", Terminator::Space, 6),
                marker("nd", Terminator::Space, 16),
                marker("nd", Terminator::Asterisk, 24),
                marker("f", Terminator::End, 32),
            ]
        );
    }

    #[test]
    fn test_stray_backslashes_do_not_stop_the_scan() {
        let found = scan_markers("a \\ b \\* c \\p d\\");
        assert_eq!(
            found,
            vec![
                TextMarker::StrayBackslash {
                    offset: 2,
                    next: Some(' ')
                },
                TextMarker::StrayBackslash {
                    offset: 6,
                    next: Some('*')
                },
                marker("p", Terminator::Space, 11),
                TextMarker::StrayBackslash {
                    offset: 15,
                    next: None
                },
            ]
        );
    }

    #[test]
    fn test_adjacent_markers() {
        let found = scan_markers("\\add\\nd x");
        assert_eq!(
            found,
            vec![
                marker("add", Terminator::End, 0),
                marker("nd", Terminator::Space, 4),
            ]
        );
    }

    #[test]
    fn test_offsets_are_byte_offsets() {
        let text = "ἐν ἀρχῇ \\v 2 καὶ";
        let found = scan_markers(text);
        assert_eq!(found.len(), 1);
        assert_eq!(&text[found[0].offset()..found[0].offset() + 2], "\\v");
    }

    #[test]
    fn test_terminator_lengths() {
        assert_eq!(Terminator::Space.len(), 1);
        assert_eq!(Terminator::Asterisk.len(), 1);
        assert!(Terminator::End.is_empty());
    }
}
