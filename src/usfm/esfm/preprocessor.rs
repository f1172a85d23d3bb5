//! ESFM tag preprocessor
//!
//! Rewrites one line of ESFM text into plain USFM with character fields:
//!
//! - `word=G` and `{several words}=PKey` become `\sem` fields
//! - `word=SH430` becomes a `\str` field
//! - consecutive tags on one word (`Elohim=G=SH430`) each produce a field
//! - braces are dropped; words, spaces and underscores are kept
//!
//! Tagged words are recorded in the semantic and Strong's dictionaries as a
//! side effect. Underscores join words that translate a single original word
//! (`went_down`); a trailing underscore followed by a space (`And_ `) parks
//! the group until a later ` _word` picks it up again, so split translations
//! such as `And_ Elohim _said` tag `And_said` as one subject.
//!
//! The scanner never fails. Anything it cannot make sense of is recorded as a
//! diagnostic and copied through unchanged.

use super::annotations::{Annotations, Occurrence};
use super::chars::{CharClass, ScanMode};
use crate::usfm::config::EsfmConfig;
use crate::usfm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::usfm::position::BookPosition;

/// More parked groups than this means the underlining is corrupt.
const MAX_HANGING_GROUPS: usize = 2;

/// Preprocess one line of ESFM text.
pub fn preprocess(
    text: &str,
    position: &BookPosition,
    config: &EsfmConfig,
    annotations: &mut Annotations,
    diagnostics: &mut Diagnostics,
) -> String {
    let mut scanner = TagScanner::new(position, config, annotations, diagnostics);
    for c in text.chars() {
        scanner.feed(c);
    }
    scanner.finish()
}

/// Character-by-character state machine behind [`preprocess`].
pub struct TagScanner<'a> {
    position: &'a BookPosition,
    config: &'a EsfmConfig,
    annotations: &'a mut Annotations,
    diagnostics: &'a mut Diagnostics,

    mode: ScanMode,
    in_braces: bool,
    /// Text between braces, spaces turned into underscores
    braced_text: String,
    word: String,
    /// Open underline group, e.g. `went_` while reading `went_down`
    group: Option<String>,
    /// Groups parked by `word_ `, most recent last
    hanging: Vec<String>,
    last: Option<char>,
    output: String,
}

impl<'a> TagScanner<'a> {
    pub fn new(
        position: &'a BookPosition,
        config: &'a EsfmConfig,
        annotations: &'a mut Annotations,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        TagScanner {
            position,
            config,
            annotations,
            diagnostics,
            mode: ScanMode::Text,
            in_braces: false,
            braced_text: String::new(),
            word: String::new(),
            group: None,
            hanging: Vec::new(),
            last: None,
            output: String::new(),
        }
    }

    pub fn feed(&mut self, c: char) {
        let class = CharClass::of(c, self.config);
        match std::mem::replace(&mut self.mode, ScanMode::Text) {
            ScanMode::Tag(mut tag) => {
                if class.ends_tag() {
                    self.resolve_tag(&tag);
                    if class == CharClass::Equals {
                        // Another tag on the same word
                        self.mode = ScanMode::Tag(c.to_string());
                    } else {
                        self.braced_text.clear();
                        self.text_char(c, class);
                    }
                } else {
                    tag.push(c);
                    self.mode = ScanMode::Tag(tag);
                }
            }
            ScanMode::Text => {
                if class == CharClass::Equals {
                    self.mode = ScanMode::Tag(c.to_string());
                } else {
                    self.text_char(c, class);
                }
            }
        }
        self.last = Some(c);
    }

    /// Resolve anything still pending and return the rewritten text.
    pub fn finish(mut self) -> String {
        if let ScanMode::Tag(tag) = std::mem::replace(&mut self.mode, ScanMode::Text) {
            self.resolve_tag(&tag);
        }
        if self.in_braces {
            self.report(
                DiagnosticKind::MalformedTagSyntax,
                20,
                format!("unclosed ESFM brace group '{{{}'", self.braced_text),
            );
        }
        if !self.hanging.is_empty() {
            let parked = self.hanging.join(", ");
            self.report(
                DiagnosticKind::UnbalancedUnderline,
                10,
                format!("hanging ESFM underline never closed: {parked}"),
            );
        }
        self.output
    }

    fn text_char(&mut self, c: char, class: CharClass) {
        if self.in_braces && class != CharClass::CloseBrace {
            self.braced_text
                .push(if class == CharClass::Space { '_' } else { c });
        }

        match class {
            CharClass::Space => {
                if self.last == Some('_') {
                    self.park_group();
                } else {
                    self.group = None;
                }
                self.end_word();
                self.output.push(c);
            }
            CharClass::Underscore => {
                if self.last.map_or(true, char::is_whitespace) {
                    self.resume_group();
                } else {
                    let word = std::mem::take(&mut self.word);
                    let group = self.group.get_or_insert_with(String::new);
                    group.push_str(&word);
                    group.push('_');
                }
                self.output.push(c);
            }
            CharClass::OpenBrace => {
                let after_word = self.last.is_some_and(|last| !last.is_whitespace());
                if after_word || self.in_braces || !self.braced_text.is_empty() {
                    self.report(
                        DiagnosticKind::MalformedTagSyntax,
                        20,
                        "unexpected ESFM opening brace",
                    );
                }
                self.braced_text.clear();
                self.in_braces = true;
            }
            CharClass::CloseBrace => {
                if self.in_braces {
                    self.in_braces = false;
                } else {
                    self.report(
                        DiagnosticKind::MalformedTagSyntax,
                        20,
                        "ESFM closing brace without an opening brace",
                    );
                }
            }
            CharClass::Dash | CharClass::Punctuation | CharClass::Marker => {
                self.group = None;
                self.end_word();
                self.output.push(c);
            }
            CharClass::Equals | CharClass::Other => {
                self.word.push(c);
                self.output.push(c);
            }
        }
    }

    fn end_word(&mut self) {
        self.word.clear();
        if !self.in_braces {
            self.braced_text.clear();
        }
    }

    /// `word_ ` : set the open group aside for a later ` _word`.
    fn park_group(&mut self) {
        let group = self.group.take().unwrap_or_default();
        self.hanging.push(group);
        if self.hanging.len() > MAX_HANGING_GROUPS {
            let count = self.hanging.len();
            self.report(
                DiagnosticKind::UnbalancedUnderline,
                30,
                format!("{count} hanging ESFM underlines open at once"),
            );
        }
    }

    /// ` _word` : pick the most recently parked group up again.
    fn resume_group(&mut self) {
        match self.hanging.pop() {
            Some(group) => self.group = Some(group),
            None => {
                self.group = None;
                self.report(
                    DiagnosticKind::UnbalancedUnderline,
                    10,
                    "missing first part of ESFM underline group",
                );
            }
        }
    }

    /// The words a tag applies to.
    fn subject(&self) -> String {
        match &self.group {
            Some(group) => format!("{group}{}", self.word),
            None => self.word.clone(),
        }
    }

    fn resolve_tag(&mut self, tag: &str) {
        let mut letters = tag.chars().skip(1);
        let Some(second) = letters.next() else {
            self.malformed_tag(tag);
            return;
        };

        if second == self.config.strongs_marker {
            match letters.next() {
                Some(category) => {
                    let key: String = letters.collect();
                    self.strongs_tag(tag, category, key);
                }
                None => self.malformed_tag(tag),
            }
        } else if !self.braced_text.is_empty() || !self.word.is_empty() {
            let key: String = letters.collect();
            self.semantic_tag(tag, second, key);
        } else {
            self.malformed_tag(tag);
        }
    }

    fn malformed_tag(&mut self, tag: &str) {
        self.report(
            DiagnosticKind::MalformedTagSyntax,
            21,
            format!("unexpected short ESFM tag '{tag}'"),
        );
        self.output.push_str(tag);
    }

    fn semantic_tag(&mut self, tag: &str, category: char, key: String) {
        let subject = if self.braced_text.is_empty() {
            self.subject()
        } else {
            self.braced_text.clone()
        };
        let key = if key.is_empty() { subject.clone() } else { key };

        if !self.config.is_semantic_category(category) {
            self.annotations
                .semantic
                .record_tag_error(self.position, &tag[1..]);
            self.report(
                DiagnosticKind::UnknownSemanticTag,
                15,
                format!("unknown ESFM semantic category '{category}' in '{tag}'"),
            );
        }

        let occurrence = Occurrence::new(self.position, subject.clone());
        let semantic = &mut self.annotations.semantic;
        if !semantic.record(category, &key, occurrence.clone()) {
            semantic.record_missing(category, &key, &occurrence);
            self.report(
                DiagnosticKind::UnknownSemanticTag,
                15,
                format!("unknown ESFM semantic tag {category}:{key}"),
            );
        }

        if subject == key {
            self.output
                .push_str(&format!("\\sem {category} {subject}\\sem*"));
        } else {
            self.output
                .push_str(&format!("\\sem {category} {subject}={key}\\sem*"));
        }
    }

    fn strongs_tag(&mut self, tag: &str, category: char, key: String) {
        let subject = self.subject();
        let key = if key.is_empty() { subject.clone() } else { key };
        if key.is_empty() {
            self.malformed_tag(tag);
            return;
        }

        if !self.config.is_strongs_category(category) {
            self.annotations
                .strongs
                .record_tag_error(self.position, &tag[1..]);
            self.report(
                DiagnosticKind::UnknownStrongsTag,
                10,
                format!("unknown Strong's category '{category}' in '{tag}'"),
            );
        }

        let occurrence = Occurrence::new(self.position, subject.clone());
        let strongs = &mut self.annotations.strongs;
        if !strongs.record(category, &key, occurrence.clone()) {
            strongs.record_missing(category, &key, &occurrence);
            self.report(
                DiagnosticKind::UnknownStrongsTag,
                10,
                format!("unknown Strong's number {category}{key}"),
            );
        }

        if subject == key {
            self.output
                .push_str(&format!("\\str {category} {key}\\str*"));
        } else {
            self.output
                .push_str(&format!("\\str {category} {key}={subject}\\str*"));
        }
    }

    fn report(&mut self, kind: DiagnosticKind, weight: u8, message: impl Into<String>) {
        self.diagnostics
            .record(self.position, kind, weight, message);
    }
}
