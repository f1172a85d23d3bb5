//! Typical note marker sequences
//!
//! Footnotes and cross references carry a small, predictable run of internal
//! markers (`\f + \fr 1:2 \ft text\f*`). These are the sequences seen most
//! often in real files, in the order the markers appear after the note
//! opener. Checkers use them to flag unusual note structure.

/// Which family of note sets to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteSetSelection {
    Footnotes,
    CrossReferences,
    #[default]
    All,
}

const FOOTNOTE_SETS: &[&[&str]] = &[
    &["fr", "fr*"],
    &["fr", "ft"],
    &["fr", "ft", "ft*"],
    &["fr", "fq"],
    &["fr", "fq", "fq*"],
    &["fr", "ft", "fq"],
    &["fr", "ft", "fq", "fq*"],
    &["fr", "fq", "ft"],
    &["fr", "fq", "ft", "ft*"],
    &["fr", "ft", "fv"],
    &["fr", "ft", "fv", "fv*"],
    &["fr", "fk", "ft"],
    &["fr", "fk", "ft", "ft*"],
    &["fr", "ft", "fq", "ft"],
    &["fr", "ft", "fq", "ft", "ft*"],
    &["fr", "fq", "ft", "fq"],
    &["fr", "fq", "ft", "fq", "fq*"],
    &["fr", "ft", "fq", "fv"],
    &["fr", "ft", "fq", "fv", "fv*"],
    &["fr", "ft", "ft", "fq"],
    &["fr", "ft", "ft", "fq", "fq*"],
    &["fr", "fk", "ft", "fq"],
    &["fr", "fk", "ft", "fq", "fq*"],
    &["fr", "ft", "fq", "ft", "fq"],
    &["fr", "ft", "fq", "ft", "fq", "fq*"],
    &["fr", "fq", "ft", "fq", "ft"],
    &["fr", "fq", "ft", "fq", "ft", "ft*"],
    &["fr", "fk", "ft", "fq", "ft"],
    &["fr", "fk", "ft", "fq", "ft", "ft*"],
    &["fr", "ft", "fv", "fv*", "fq"],
    &["fr", "ft", "fv", "fv*", "fq", "fq*"],
    &["fr", "ft", "fv", "fv*", "fv"],
    &["fr", "ft", "fv", "fv*", "fv", "fv*"],
    &["fr", "ft", "fk", "ft", "fk", "ft", "fk", "ft"],
    &["fr", "ft", "fk", "ft", "fk", "ft", "fk", "ft", "ft*"],
];

const CROSS_REFERENCE_SETS: &[&[&str]] = &[
    &["xo", "xdc"],
    &["xo", "xdc", "xdc*"],
    &["xo", "xt"],
    &["xo", "xt", "xt*"],
    &["xo", "xt", "xk"],
    &["xo", "xt", "xdc"],
    &["xo", "xt", "xdc*"],
    &["xo", "xdc", "xt"],
    &["xo", "xdc", "xt", "xt*"],
    &["xo", "xt", "xo", "xt"],
    &["xo", "xt", "xo", "xt", "xt*"],
    &["xo", "xt", "xk", "xt"],
    &["xo", "xt", "xk", "xt", "xt*"],
    &["xo", "xt", "xdc", "xt"],
    &["xo", "xt", "xdc", "xt", "xt*"],
    &["xo", "xt", "xo", "xt", "xo", "xt"],
    &["xo", "xt", "xo", "xt", "xo", "xt", "xt*"],
];

/// Typical marker sequences for the selected note family.
pub fn typical_note_sets(selection: NoteSetSelection) -> Vec<&'static [&'static str]> {
    match selection {
        NoteSetSelection::Footnotes => FOOTNOTE_SETS.to_vec(),
        NoteSetSelection::CrossReferences => CROSS_REFERENCE_SETS.to_vec(),
        NoteSetSelection::All => FOOTNOTE_SETS
            .iter()
            .chain(CROSS_REFERENCE_SETS)
            .copied()
            .collect(),
    }
}
