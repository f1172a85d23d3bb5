//! Marker registry
//!
//! Everything the assembler needs to know about USFM markers lives here:
//!
//! - `descriptor`: the per-marker record (category, numbering, closing rules)
//! - `table`: the declarative YAML table the registry is built from
//! - `registry`: lookups, normalisation between raw and numbered spellings
//! - `scanning`: the logos-based scanner that finds markers inside text
//! - `note_sets`: typical footnote and cross-reference marker sequences
//!
//! The registry is immutable once built. Share it with `Arc` (or use
//! [`MarkerRegistry::shared`] for the built-in table) and hand it to as many
//! assemblers as needed.

pub mod descriptor;
pub mod note_sets;
pub mod registry;
pub mod scanning;
pub mod table;

pub use descriptor::{MarkerCategory, MarkerDescriptor, MarkerPolicy};
pub use note_sets::NoteSetSelection;
pub use registry::{MarkerListOption, MarkerRegistry};
pub use scanning::{scan_markers, Terminator, TextMarker};
pub use table::{MarkerEntry, MarkerTable, RegistryError};

use thiserror::Error;

/// Contract violations when callers ask about markers the registry does not know.
///
/// Markers discovered in source text never produce this error; the assembler
/// checks validity first and records a diagnostic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("unknown marker '\\{marker}'")]
    UnknownMarker { marker: String },
}

impl MarkerError {
    pub(crate) fn unknown(marker: &str) -> Self {
        MarkerError::UnknownMarker {
            marker: marker.to_string(),
        }
    }
}
