//! ESFM support
//!
//! ESFM is USFM plus inline tagging of the translated text: semantic tags
//! (`Jonah=P`), Strong's references (`said=SH559`), brace groups and
//! underscore joins. The preprocessor turns that tagging into `\sem` and
//! `\str` character fields before lines are assembled, filling the
//! annotation dictionaries on the way.

pub mod annotations;
pub mod chars;
pub mod preprocessor;

pub use annotations::{
    AnnotationTable, Annotations, MissingOccurrence, Occurrence, SemanticDict, StrongsDict,
    StrongsEntry, TagError,
};
pub use preprocessor::{preprocess, TagScanner};
