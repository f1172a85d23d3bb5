//! Semantic and Strong's annotation dictionaries
//!
//! Both dictionaries share one shape, [`AnnotationTable`]: category letter to
//! key to entry, plus two buckets the preprocessor fills while reading:
//! `tag_errors` for tags whose category letter is not recognised, and
//! `missing` for keys that have no entry. They deserialize from JSON so known
//! names and Strong's definitions can be loaded before a collection is read.

use crate::usfm::position::BookPosition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One tagged word found in the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub book: String,
    pub chapter: String,
    pub verse: String,
    pub word: String,
}

impl Occurrence {
    pub fn new(position: &BookPosition, word: impl Into<String>) -> Self {
        Occurrence {
            book: position.book.clone(),
            chapter: position.chapter.clone(),
            verse: position.verse.clone(),
            word: word.into(),
        }
    }
}

/// A tag that referred to a key with no entry. `word` is omitted when the
/// tagged word is the key itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingOccurrence {
    pub book: String,
    pub chapter: String,
    pub verse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
}

/// A tag whose category letter is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagError {
    pub book: String,
    pub chapter: String,
    pub verse: String,
    /// Tag text without the leading `=`
    pub tag: String,
}

/// Anything that can collect occurrences.
pub trait TableEntry {
    fn append(&mut self, occurrence: Occurrence);
}

impl TableEntry for Vec<Occurrence> {
    fn append(&mut self, occurrence: Occurrence) {
        self.push(occurrence);
    }
}

/// A Strong's dictionary entry. Loaded entries are usually a bare
/// definition; the first occurrence promotes them to a tracked entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrongsEntry {
    Definition(String),
    Tracked {
        #[serde(default)]
        definition: Option<String>,
        #[serde(default)]
        occurrences: Vec<Occurrence>,
    },
}

impl StrongsEntry {
    pub fn definition(&self) -> Option<&str> {
        match self {
            StrongsEntry::Definition(definition) => Some(definition),
            StrongsEntry::Tracked { definition, .. } => definition.as_deref(),
        }
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        match self {
            StrongsEntry::Definition(_) => &[],
            StrongsEntry::Tracked { occurrences, .. } => occurrences,
        }
    }
}

impl TableEntry for StrongsEntry {
    fn append(&mut self, occurrence: Occurrence) {
        match self {
            StrongsEntry::Definition(definition) => {
                *self = StrongsEntry::Tracked {
                    definition: Some(std::mem::take(definition)),
                    occurrences: vec![occurrence],
                };
            }
            StrongsEntry::Tracked { occurrences, .. } => occurrences.push(occurrence),
        }
    }
}

/// Category letter -> key -> entry, plus the error buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTable<E> {
    #[serde(default = "BTreeMap::new")]
    pub entries: BTreeMap<char, BTreeMap<String, E>>,
    #[serde(default = "Vec::new")]
    pub tag_errors: Vec<TagError>,
    #[serde(default = "BTreeMap::new")]
    pub missing: BTreeMap<char, BTreeMap<String, Vec<MissingOccurrence>>>,
}

pub type SemanticDict = AnnotationTable<Vec<Occurrence>>;
pub type StrongsDict = AnnotationTable<StrongsEntry>;

impl<E> Default for AnnotationTable<E> {
    fn default() -> Self {
        AnnotationTable {
            entries: BTreeMap::new(),
            tag_errors: Vec::new(),
            missing: BTreeMap::new(),
        }
    }
}

impl<E: TableEntry> AnnotationTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, category: char, key: impl Into<String>, entry: E) {
        self.entries
            .entry(category)
            .or_default()
            .insert(key.into(), entry);
    }

    pub fn get(&self, category: char, key: &str) -> Option<&E> {
        self.entries.get(&category).and_then(|keys| keys.get(key))
    }

    pub fn contains(&self, category: char, key: &str) -> bool {
        self.get(category, key).is_some()
    }

    /// Append an occurrence to an existing entry. Returns false (and records
    /// nothing) when there is no entry for `category`/`key`.
    pub fn record(&mut self, category: char, key: &str, occurrence: Occurrence) -> bool {
        match self
            .entries
            .get_mut(&category)
            .and_then(|keys| keys.get_mut(key))
        {
            Some(entry) => {
                entry.append(occurrence);
                true
            }
            None => false,
        }
    }

    pub fn record_missing(&mut self, category: char, key: &str, occurrence: &Occurrence) {
        let word = (occurrence.word != key).then(|| occurrence.word.clone());
        self.missing
            .entry(category)
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push(MissingOccurrence {
                book: occurrence.book.clone(),
                chapter: occurrence.chapter.clone(),
                verse: occurrence.verse.clone(),
                word,
            });
    }

    pub fn record_tag_error(&mut self, position: &BookPosition, tag: impl Into<String>) {
        self.tag_errors.push(TagError {
            book: position.book.clone(),
            chapter: position.chapter.clone(),
            verse: position.verse.clone(),
            tag: tag.into(),
        });
    }

    pub fn missing(&self, category: char, key: &str) -> &[MissingOccurrence] {
        self.missing
            .get(&category)
            .and_then(|keys| keys.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl<E: DeserializeOwned> AnnotationTable<E> {
    pub fn from_json(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}

/// The two dictionaries a collection owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default)]
    pub semantic: SemanticDict,
    #[serde(default)]
    pub strongs: StrongsDict,
}

impl Annotations {
    pub fn new(semantic: SemanticDict, strongs: StrongsDict) -> Self {
        Annotations { semantic, strongs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_genesis_1_1() -> BookPosition {
        let mut position = BookPosition::new("GEN");
        position.observe("c", "1");
        position.observe("v", "1");
        position
    }

    #[test]
    fn test_strongs_definition_is_promoted_on_first_occurrence() {
        let mut strongs = StrongsDict::new();
        strongs.define('H', "430", StrongsEntry::Definition("God".to_string()));

        assert!(strongs.record('H', "430", Occurrence::new(&at_genesis_1_1(), "Elohim")));
        assert!(strongs.record('H', "430", Occurrence::new(&at_genesis_1_1(), "God")));

        let entry = strongs.get('H', "430").unwrap();
        assert_eq!(entry.definition(), Some("God"));
        assert_eq!(entry.occurrences().len(), 2);
        assert_eq!(entry.occurrences()[0].word, "Elohim");
    }

    #[test]
    fn test_record_unknown_key_changes_nothing() {
        let mut semantic = SemanticDict::new();
        assert!(!semantic.record('G', "Elohim", Occurrence::new(&at_genesis_1_1(), "Elohim")));
        assert!(semantic.entries.is_empty());
    }

    #[test]
    fn test_missing_omits_word_equal_to_key() {
        let mut semantic = SemanticDict::new();
        let position = at_genesis_1_1();
        semantic.record_missing('P', "Jonah", &Occurrence::new(&position, "Jonah"));
        semantic.record_missing('P', "Jonah", &Occurrence::new(&position, "he"));

        let missing = semantic.missing('P', "Jonah");
        assert_eq!(missing.len(), 2);
        assert_eq!(missing[0].word, None);
        assert_eq!(missing[1].word.as_deref(), Some("he"));
        assert!(semantic.missing('P', "Ruth").is_empty());
    }

    #[test]
    fn test_load_from_json() {
        let strongs = StrongsDict::from_json(r#"{"entries": {"H": {"430": "God", "559": "say"}}}"#)
            .unwrap();
        assert_eq!(strongs.get('H', "559").and_then(StrongsEntry::definition), Some("say"));

        let semantic = SemanticDict::from_json(r#"{"entries": {"G": {"Elohim": []}}}"#).unwrap();
        assert!(semantic.contains('G', "Elohim"));
        assert!(semantic.tag_errors.is_empty());
    }

    #[test]
    fn test_tracked_entry_round_trips_through_json() {
        let mut strongs = StrongsDict::new();
        strongs.define('G', "2316", StrongsEntry::Definition("God".to_string()));
        strongs.record('G', "2316", Occurrence::new(&at_genesis_1_1(), "theos"));

        let json = serde_json::to_string(&strongs).unwrap();
        let back = StrongsDict::from_json(&json).unwrap();
        assert_eq!(back, strongs);
    }
}
