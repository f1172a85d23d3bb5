//! Physical-to-logical line assembly
//!
//! The assembler always works one line behind: a line-level marker is held
//! until the next one arrives, so character and note markers that a file
//! put at the start of a physical line can be merged back into the line they
//! belong to. When a held line is committed, any line-level markers buried in
//! its text are split out into lines of their own.
//!
//! Nothing in the data makes assembly fail. Every oddity becomes a
//! diagnostic and the assembler carries on with its best guess.

use super::lines::{AssembledBook, Dialect, LogicalLine, PhysicalLine};
use crate::usfm::config::SfmConfig;
use crate::usfm::diagnostics::{DiagnosticKind, Diagnostics};
use crate::usfm::esfm::{preprocess, Annotations};
use crate::usfm::markers::{scan_markers, MarkerRegistry, TextMarker};
use crate::usfm::position::BookPosition;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AssemblerState {
    Idle,
    Holding(HeldLine),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeldLine {
    line: LogicalLine,
    /// The tag scanner already flagged unbalanced underlines in this text
    underline_reported: bool,
}

/// Kinds of marker that may be merged into the held line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineKind {
    Internal,
    Note,
}

impl InlineKind {
    fn weight(self) -> u8 {
        match self {
            InlineKind::Internal => 27,
            InlineKind::Note => 26,
        }
    }

    fn name(self) -> &'static str {
        match self {
            InlineKind::Internal => "internal",
            InlineKind::Note => "note",
        }
    }
}

/// Turns the physical lines of one book into logical lines.
pub struct LineAssembler<'a> {
    registry: &'a MarkerRegistry,
    config: &'a SfmConfig,
    dialect: Dialect,
    /// Dictionaries filled by ESFM tags; a private set is used when none are shared
    shared_annotations: Option<&'a Mutex<Annotations>>,
    own_annotations: Annotations,
    position: BookPosition,
    state: AssemblerState,
    lines: Vec<LogicalLine>,
    diagnostics: Diagnostics,
    seen_input: bool,
}

impl<'a> LineAssembler<'a> {
    pub fn new(book: impl Into<String>, registry: &'a MarkerRegistry, config: &'a SfmConfig) -> Self {
        LineAssembler {
            registry,
            config,
            dialect: config.assembly.dialect,
            shared_annotations: None,
            own_annotations: Annotations::default(),
            position: BookPosition::new(book),
            state: AssemblerState::Idle,
            lines: Vec::new(),
            diagnostics: Diagnostics::new(),
            seen_input: false,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Record ESFM tags into `annotations` instead of a private set.
    pub fn with_annotations(mut self, annotations: &'a Mutex<Annotations>) -> Self {
        self.shared_annotations = Some(annotations);
        self
    }

    /// Assemble a whole book in one go.
    pub fn assemble<I>(mut self, lines: I) -> AssembledBook
    where
        I: IntoIterator<Item = PhysicalLine>,
    {
        for line in lines {
            self.push(line);
        }
        self.finish()
    }

    pub fn position(&self) -> &BookPosition {
        &self.position
    }

    /// The private dictionaries, used when none were shared.
    pub fn own_annotations(&self) -> &Annotations {
        &self.own_annotations
    }

    pub fn push(&mut self, line: PhysicalLine) {
        self.seen_input = true;
        let PhysicalLine { marker, text } = line;
        self.position.observe(&marker, &text);

        if self.config.assembly.is_ignored(&marker) {
            tracing::debug!(marker = %marker, position = %self.position, "ignoring line");
            return;
        }

        let recorded_before = self.diagnostics.len();
        let text = if self.dialect == Dialect::Esfm && !self.config.esfm.is_untagged(&marker) {
            self.preprocess(&text)
        } else {
            text
        };
        let underline_reported = self
            .diagnostics
            .iter()
            .skip(recorded_before)
            .any(|d| d.kind == DiagnosticKind::UnbalancedUnderline);

        if self.registry.is_newline_marker(&marker) {
            self.hold(LogicalLine::new(marker, text), underline_reported);
            return;
        }

        let base = marker.strip_suffix('*').unwrap_or(&marker);
        if self.registry.is_internal_marker(base) {
            self.append_inline(&marker, &text, InlineKind::Internal, underline_reported);
        } else if self.registry.is_note_marker(base) {
            self.append_inline(&marker, &text, InlineKind::Note, underline_reported);
        } else {
            self.recover_unknown(marker, text, underline_reported);
        }
    }

    /// Commit the held line and return everything assembled.
    pub fn finish(mut self) -> AssembledBook {
        if let AssemblerState::Holding(held) =
            std::mem::replace(&mut self.state, AssemblerState::Idle)
        {
            self.commit(held);
        }

        if self.lines.is_empty() {
            let (text, message) = if self.seen_input {
                (
                    format!("This ({}) file had no usable lines", self.dialect),
                    format!(
                        "every line of the {} file for {} was dropped or ignored",
                        self.dialect, self.position.book
                    ),
                )
            } else {
                (
                    format!("This ({}) file was completely empty", self.dialect),
                    format!("{} file for {} has no lines", self.dialect, self.position.book),
                )
            };
            self.diagnostics
                .record(&self.position, DiagnosticKind::EmptyFile, 100, message);
            self.lines.push(LogicalLine::new(
                self.config.assembly.fallback_marker.clone(),
                text,
            ));
        }

        AssembledBook {
            book: self.position.book,
            dialect: self.dialect,
            lines: self.lines,
            diagnostics: self.diagnostics,
        }
    }

    fn preprocess(&mut self, text: &str) -> String {
        match self.shared_annotations {
            Some(shared) => {
                let mut annotations = shared.lock().unwrap_or_else(PoisonError::into_inner);
                preprocess(
                    text,
                    &self.position,
                    &self.config.esfm,
                    &mut annotations,
                    &mut self.diagnostics,
                )
            }
            None => preprocess(
                text,
                &self.position,
                &self.config.esfm,
                &mut self.own_annotations,
                &mut self.diagnostics,
            ),
        }
    }

    fn hold(&mut self, line: LogicalLine, underline_reported: bool) {
        let held = HeldLine {
            line,
            underline_reported,
        };
        if let AssemblerState::Holding(previous) =
            std::mem::replace(&mut self.state, AssemblerState::Holding(held))
        {
            self.commit(previous);
        }
    }

    fn append_inline(
        &mut self,
        marker: &str,
        text: &str,
        kind: InlineKind,
        underline_reported: bool,
    ) {
        self.diagnostics.record(
            &self.position,
            DiagnosticKind::UnexpectedMarkerPlacement,
            kind.weight(),
            format!("found \\{marker} {} marker at the start of a line", kind.name()),
        );

        if self.state == AssemblerState::Idle {
            let fallback = self.config.assembly.fallback_marker.clone();
            self.state = AssemblerState::Holding(HeldLine {
                line: LogicalLine::new(fallback, ""),
                underline_reported: false,
            });
        }
        let AssemblerState::Holding(held) = &mut self.state else {
            return;
        };
        held.underline_reported |= underline_reported;

        let line = &mut held.line;
        if !line.text.is_empty() && !line.text.ends_with(char::is_whitespace) {
            line.text.push(' ');
        }
        line.text.push('\\');
        line.text.push_str(marker);
        line.text.push(' ');
        line.text.push_str(text);
    }

    fn recover_unknown(&mut self, marker: String, text: String, underline_reported: bool) {
        let registry = self.registry;
        let recovered = registry
            .newline_markers_by_length()
            .iter()
            .find(|known| marker.starts_with(known.as_str()));

        match recovered {
            Some(known) => {
                let rest = &marker[known.len()..];
                let text = if text.is_empty() {
                    rest.to_string()
                } else {
                    format!("{rest} {text}")
                };
                tracing::debug!(from = %marker, to = %known, "recovered run-together marker");
                self.diagnostics.record(
                    &self.position,
                    DiagnosticKind::MarkerRecovered,
                    60,
                    format!("changed unknown marker \\{marker} to \\{known}"),
                );
                self.position.observe(known, &text);
                self.hold(LogicalLine::new(known.clone(), text), underline_reported);
            }
            None => {
                self.diagnostics.record(
                    &self.position,
                    DiagnosticKind::UnknownMarker,
                    100,
                    format!("unknown marker \\{marker} at the start of a line; line dropped"),
                );
            }
        }
    }

    fn commit(&mut self, held: HeldLine) {
        let HeldLine {
            line: LogicalLine { marker, text },
            underline_reported,
        } = held;
        let esfm = self.dialect == Dialect::Esfm;
        let mut marker = if esfm { self.standardise(marker) } else { marker };

        let mut start = 0;
        let mut split = false;
        for found in scan_markers(&text) {
            match found {
                TextMarker::StrayBackslash { next, .. } => {
                    let context = match next {
                        Some(c) => format!("followed by '{c}'"),
                        None => "at the end of the text".to_string(),
                    };
                    self.diagnostics.record(
                        &self.position,
                        DiagnosticKind::StrayBackslash,
                        100,
                        format!("free-standing backslash {context} in \\{marker} line"),
                    );
                }
                TextMarker::Marker {
                    marker: inner,
                    terminator,
                    offset,
                } => {
                    if !self.registry.is_newline_marker(&inner) {
                        continue;
                    }
                    if !split {
                        self.diagnostics.record(
                            &self.position,
                            DiagnosticKind::EmbeddedNewlineMarker,
                            96,
                            format!("line marker \\{inner} found inside \\{marker} line"),
                        );
                        split = true;
                    }
                    tracing::debug!(marker = %marker, inner = %inner, "splitting embedded line marker");
                    let left = text[start..offset].trim_end();
                    self.lines.push(LogicalLine::new(marker, left));
                    start = offset + 1 + inner.len() + terminator.len();
                    marker = if esfm { self.standardise(inner) } else { inner };
                }
            }
        }

        let rest = &text[start..];
        if esfm && !underline_reported {
            self.check_underlines(&marker, &text);
        }
        self.lines.push(LogicalLine::new(marker, rest));
    }

    /// ESFM stores numberable markers with their level number.
    fn standardise(&mut self, marker: String) -> String {
        let standard = self
            .registry
            .to_standard_marker(&marker)
            .ok()
            .map(str::to_string);
        match standard {
            Some(standard) if standard != marker => {
                self.diagnostics.record(
                    &self.position,
                    DiagnosticKind::UnnumberedMarker,
                    90,
                    format!("ESFM doesn't allow unnumbered marker \\{marker}; using \\{standard}"),
                );
                standard
            }
            _ => marker,
        }
    }

    fn check_underlines(&mut self, marker: &str, text: &str) {
        let opened = text.matches("_ ").count();
        let closed = text.matches(" _").count();
        if opened != closed {
            self.diagnostics.record(
                &self.position,
                DiagnosticKind::UnbalancedUnderline,
                10,
                format!("{opened} '_ ' against {closed} ' _' in \\{marker} line"),
            );
        }
    }
}
