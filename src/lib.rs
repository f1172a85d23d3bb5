//! # sfm
//!
//! Turns USFM (and ESFM) marked-up text into logical lines: one structural
//! marker per line, with misplaced markers split out and character/note
//! markers merged back into the line they belong to.
//!
//! The entry points live in the [usfm] module:
//!
//! - [`usfm::markers::MarkerRegistry`] classifies and normalises markers
//! - [`usfm::assembling::LineAssembler`] converts physical lines into logical lines
//! - [`usfm::esfm::preprocess`] rewrites ESFM tagging into `\sem` / `\str` fields
//! - [`usfm::collection::Collection`] ties them together for a set of books

pub mod usfm;
