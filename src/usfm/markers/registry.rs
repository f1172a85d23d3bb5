//! Marker registry
//!
//! The registry is built once from a [`MarkerTable`] into a handful of hash
//! maps and ordered lists, and is read-only afterwards. All lookups are O(1)
//! on average.
//!
//! # Normalisation
//!
//! Numberable markers have a raw spelling (`q`) and numbered spellings
//! (`q1`..`q4`). [`MarkerRegistry::to_raw_marker`] strips the level and
//! [`MarkerRegistry::to_standard_marker`] turns a bare raw spelling into its
//! level-one form. Numbered spellings are already standard.

use super::descriptor::{MarkerCategory, MarkerDescriptor, MarkerPolicy};
use super::note_sets::{self, NoteSetSelection};
use super::scanning::{scan_markers, TextMarker};
use super::table::{MarkerTable, RegistryError};
use super::MarkerError;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static SHARED: OnceCell<Arc<MarkerRegistry>> = OnceCell::new();

/// Which spellings of the newline markers to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerListOption {
    /// Raw spellings only (`q`, `p`)
    Raw,
    /// Standard spellings (`q1`, `p`)
    Numbered,
    /// Every valid spelling (`q`, `q1`..`q4`, `p`)
    Combined,
}

/// Lookup tables for every known marker.
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    /// raw id -> descriptor
    raw_markers: HashMap<String, MarkerDescriptor>,
    /// any valid spelling -> raw id
    combined_markers: HashMap<String, String>,
    /// raw id -> standard spelling, for numberable markers only
    conversions: HashMap<String, String>,
    /// raw ids in table order
    order: Vec<String>,
    newline_markers: Vec<String>,
    internal_markers: Vec<String>,
    note_markers: Vec<String>,
    deprecated_markers: Vec<String>,
    /// every newline spelling, longest first
    newline_by_length: Vec<String>,
}

impl MarkerRegistry {
    /// Build a registry from an already validated table.
    pub fn from_table(table: MarkerTable) -> Self {
        let mut registry = MarkerRegistry {
            raw_markers: HashMap::new(),
            combined_markers: HashMap::new(),
            conversions: HashMap::new(),
            order: Vec::new(),
            newline_markers: Vec::new(),
            internal_markers: Vec::new(),
            note_markers: Vec::new(),
            deprecated_markers: Vec::new(),
            newline_by_length: Vec::new(),
        };

        for descriptor in table.into_descriptors() {
            let raw = descriptor.raw.clone();
            for spelling in descriptor.spellings() {
                registry.combined_markers.insert(spelling, raw.clone());
            }
            if descriptor.numberable {
                registry
                    .conversions
                    .insert(raw.clone(), descriptor.standard.clone());
            }
            match descriptor.category {
                MarkerCategory::Newline => registry.newline_markers.push(raw.clone()),
                MarkerCategory::Internal => registry.internal_markers.push(raw.clone()),
                MarkerCategory::Note => registry.note_markers.push(raw.clone()),
                MarkerCategory::Deprecated => registry.deprecated_markers.push(raw.clone()),
            }
            if descriptor.category.starts_line() {
                registry
                    .newline_by_length
                    .extend(descriptor.spellings());
            }
            registry.order.push(raw.clone());
            registry.raw_markers.insert(raw, descriptor);
        }

        registry
            .newline_by_length
            .sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        registry
    }

    /// Parse, validate and build a registry from a YAML table.
    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        Ok(Self::from_table(MarkerTable::from_yaml(source)?))
    }

    /// Build a fresh registry from the embedded table.
    pub fn builtin() -> Result<Self, RegistryError> {
        Ok(Self::from_table(MarkerTable::builtin()?))
    }

    /// The process-wide registry for the embedded table, built on first use.
    pub fn shared() -> Result<Arc<MarkerRegistry>, RegistryError> {
        SHARED
            .get_or_try_init(|| Self::builtin().map(Arc::new))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.combined_markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined_markers.is_empty()
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.is_valid_marker(marker)
    }

    pub fn is_valid_marker(&self, marker: &str) -> bool {
        self.combined_markers.contains_key(marker)
    }

    /// Descriptor for any valid spelling.
    pub fn descriptor(&self, marker: &str) -> Option<&MarkerDescriptor> {
        self.combined_markers
            .get(marker)
            .and_then(|raw| self.raw_markers.get(raw))
    }

    fn category(&self, marker: &str) -> Option<MarkerCategory> {
        self.descriptor(marker).map(|d| d.category)
    }

    fn require(&self, marker: &str) -> Result<&MarkerDescriptor, MarkerError> {
        self.descriptor(marker)
            .ok_or_else(|| MarkerError::unknown(marker))
    }

    /// True for markers that begin a logical line (deprecated paragraph markers included).
    pub fn is_newline_marker(&self, marker: &str) -> bool {
        self.category(marker).is_some_and(MarkerCategory::starts_line)
    }

    /// True for character-level markers, including the parts of notes (`ft`, `xo`...).
    pub fn is_internal_marker(&self, marker: &str) -> bool {
        self.category(marker) == Some(MarkerCategory::Internal)
    }

    /// True for markers that open a footnote or cross reference (`f`, `fe`, `x`).
    pub fn is_note_marker(&self, marker: &str) -> bool {
        self.category(marker) == Some(MarkerCategory::Note)
    }

    pub fn is_deprecated_marker(&self, marker: &str) -> bool {
        self.category(marker) == Some(MarkerCategory::Deprecated)
    }

    pub fn is_compulsory_marker(&self, marker: &str) -> bool {
        self.descriptor(marker).is_some_and(|d| d.compulsory)
    }

    pub fn is_numberable_marker(&self, marker: &str) -> bool {
        self.descriptor(marker).is_some_and(|d| d.numberable)
    }

    pub fn is_nesting_marker(&self, marker: &str) -> bool {
        self.descriptor(marker).is_some_and(|d| d.nests)
    }

    pub fn is_printed(&self, marker: &str) -> bool {
        self.descriptor(marker).is_some_and(|d| d.printed)
    }

    /// Strip the level number: `s1` -> `s`, `q3` -> `q`.
    pub fn to_raw_marker(&self, marker: &str) -> Result<&str, MarkerError> {
        self.combined_markers
            .get(marker)
            .map(String::as_str)
            .ok_or_else(|| MarkerError::unknown(marker))
    }

    /// Preferred storage spelling: `s` -> `s1`, `q2` -> `q2`, `p` -> `p`.
    pub fn to_standard_marker<'a>(&'a self, marker: &'a str) -> Result<&'a str, MarkerError> {
        if let Some(standard) = self.conversions.get(marker) {
            return Ok(standard.as_str());
        }
        if self.combined_markers.contains_key(marker) {
            return Ok(marker);
        }
        Err(MarkerError::unknown(marker))
    }

    pub fn marker_should_be_closed(&self, marker: &str) -> Result<MarkerPolicy, MarkerError> {
        self.require(marker).map(|d| d.closed)
    }

    pub fn marker_should_have_content(&self, marker: &str) -> Result<MarkerPolicy, MarkerError> {
        self.require(marker).map(|d| d.content)
    }

    /// Zone of the book the marker belongs to, e.g. "Introduction".
    pub fn marker_occurs_in(&self, marker: &str) -> Result<&str, MarkerError> {
        self.require(marker).map(|d| d.occurs_in.as_str())
    }

    pub fn marker_english_name(&self, marker: &str) -> Result<&str, MarkerError> {
        self.require(marker).map(|d| d.name.as_str())
    }

    pub fn marker_description(&self, marker: &str) -> Result<Option<&str>, MarkerError> {
        self.require(marker).map(|d| d.description.as_deref())
    }

    /// Distinct "occurs in" zones, in table order.
    pub fn occurs_in_list(&self) -> Vec<&str> {
        let mut zones: Vec<&str> = Vec::new();
        for raw in &self.order {
            let zone = self.raw_markers[raw].occurs_in.as_str();
            if !zones.contains(&zone) {
                zones.push(zone);
            }
        }
        zones
    }

    /// Line-level markers (deprecated ones included) in the requested spelling.
    pub fn newline_markers(&self, option: MarkerListOption) -> Vec<String> {
        let line_level = self
            .order
            .iter()
            .map(|raw| &self.raw_markers[raw])
            .filter(|d| d.category.starts_line());
        match option {
            MarkerListOption::Raw => line_level.map(|d| d.raw.clone()).collect(),
            MarkerListOption::Numbered => line_level.map(|d| d.standard.clone()).collect(),
            MarkerListOption::Combined => line_level.flat_map(|d| d.spellings()).collect(),
        }
    }

    /// Every newline spelling, longest first; used for recovering run-together markers.
    pub fn newline_markers_by_length(&self) -> &[String] {
        &self.newline_by_length
    }

    pub fn internal_markers(&self) -> &[String] {
        &self.internal_markers
    }

    pub fn note_markers(&self) -> &[String] {
        &self.note_markers
    }

    pub fn deprecated_markers(&self) -> &[String] {
        &self.deprecated_markers
    }

    /// Character markers used in running text (note parts excluded).
    ///
    /// With `include_end_markers`, the closing `*` form follows each marker
    /// that may be closed.
    pub fn character_markers(
        &self,
        include_backslash: bool,
        include_end_markers: bool,
    ) -> Vec<String> {
        let prefix = if include_backslash { "\\" } else { "" };
        let mut result = Vec::new();
        for raw in &self.internal_markers {
            let descriptor = &self.raw_markers[raw];
            if descriptor.occurs_in != "Text" {
                continue;
            }
            result.push(format!("{prefix}{raw}"));
            if include_end_markers && descriptor.closed != MarkerPolicy::Never {
                result.push(format!("{prefix}{raw}*"));
            }
        }
        result
    }

    /// Marker sequences commonly seen inside footnotes and cross references.
    pub fn typical_note_sets(&self, selection: NoteSetSelection) -> Vec<&'static [&'static str]> {
        note_sets::typical_note_sets(selection)
    }

    /// Find every backslash marker inside `text`.
    pub fn scan_markers_in_text(&self, text: &str) -> Vec<TextMarker> {
        scan_markers(text)
    }
}

impl fmt::Display for MarkerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "USFM marker registry")?;
        writeln!(f, "  raw markers: {}", self.raw_markers.len())?;
        writeln!(f, "  valid spellings: {}", self.combined_markers.len())?;
        writeln!(
            f,
            "  newline: {}, internal: {}, note: {}, deprecated: {}",
            self.newline_markers.len(),
            self.internal_markers.len(),
            self.note_markers.len(),
            self.deprecated_markers.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MarkerRegistry {
        MarkerRegistry::builtin().expect("built-in table")
    }

    #[test]
    fn test_validity() {
        let registry = registry();
        for marker in ["ab", "P", "q5", "s9"] {
            assert!(!registry.is_valid_marker(marker), "{marker} should be invalid");
        }
        for marker in ["h", "toc1", "q", "q1", "q4", "p", "f", "sem", "str"] {
            assert!(registry.is_valid_marker(marker), "{marker} should be valid");
        }
    }

    #[test]
    fn test_classification() {
        let registry = registry();
        assert!(registry.is_newline_marker("p"));
        assert!(registry.is_newline_marker("q2"));
        assert!(registry.is_newline_marker("ph1"));
        assert!(registry.is_deprecated_marker("ph1"));
        assert!(!registry.is_newline_marker("nd"));
        assert!(registry.is_internal_marker("nd"));
        assert!(registry.is_internal_marker("ft"));
        assert!(registry.is_note_marker("f"));
        assert!(!registry.is_internal_marker("f"));
        assert!(!registry.is_newline_marker("zz"));
        assert!(!registry.is_internal_marker("zz"));
        assert!(!registry.is_deprecated_marker("zz"));
    }

    #[test]
    fn test_normalisation() {
        let registry = registry();
        assert_eq!(registry.to_raw_marker("s1").unwrap(), "s");
        assert_eq!(registry.to_raw_marker("q3").unwrap(), "q");
        assert_eq!(registry.to_raw_marker("p").unwrap(), "p");
        assert_eq!(registry.to_standard_marker("s").unwrap(), "s1");
        assert_eq!(registry.to_standard_marker("q2").unwrap(), "q2");
        assert_eq!(registry.to_standard_marker("v").unwrap(), "v");
        assert_eq!(
            registry.to_raw_marker("zz"),
            Err(MarkerError::UnknownMarker {
                marker: "zz".to_string()
            })
        );
        assert!(registry.to_standard_marker("zz").is_err());
    }

    #[test]
    fn test_round_trip_only_holds_for_raw_and_first_level() {
        let registry = registry();
        for marker in ["q", "q1", "s", "s1", "p"] {
            let raw = registry.to_raw_marker(marker).unwrap();
            assert_eq!(
                registry.to_standard_marker(raw).unwrap(),
                registry.to_standard_marker(marker).unwrap(),
                "{marker}"
            );
        }

        // Higher levels keep their number but collapse through the raw form
        assert_eq!(registry.to_standard_marker("q2").unwrap(), "q2");
        let raw = registry.to_raw_marker("q2").unwrap();
        assert_eq!(registry.to_standard_marker(raw).unwrap(), "q1");
    }

    #[test]
    fn test_policies() {
        let registry = registry();
        assert_eq!(registry.marker_should_be_closed("nd").unwrap(), MarkerPolicy::Always);
        assert_eq!(registry.marker_should_be_closed("ft").unwrap(), MarkerPolicy::Sometimes);
        assert_eq!(registry.marker_should_be_closed("p").unwrap(), MarkerPolicy::Never);
        assert_eq!(registry.marker_should_have_content("b").unwrap(), MarkerPolicy::Never);
        assert_eq!(registry.marker_should_have_content("v").unwrap(), MarkerPolicy::Always);
        assert!(registry.marker_should_be_closed("zz").is_err());
    }

    #[test]
    fn test_descriptive_lookups() {
        let registry = registry();
        assert_eq!(registry.marker_english_name("q2").unwrap(), "Poetic line");
        assert_eq!(registry.marker_occurs_in("ip").unwrap(), "Introduction");
        assert!(registry.marker_description("id").unwrap().is_some());
        assert!(registry.is_compulsory_marker("c"));
        assert!(registry.is_numberable_marker("q"));
        assert!(!registry.is_numberable_marker("p"));
        assert!(registry.is_nesting_marker("nd"));
        assert!(!registry.is_printed("rem"));
        let zones = registry.occurs_in_list();
        assert_eq!(zones[0], "Header");
        assert!(zones.contains(&"Footnote"));
    }

    #[test]
    fn test_newline_lists() {
        let registry = registry();
        let raw = registry.newline_markers(MarkerListOption::Raw);
        let numbered = registry.newline_markers(MarkerListOption::Numbered);
        let combined = registry.newline_markers(MarkerListOption::Combined);
        assert!(raw.contains(&"q".to_string()));
        assert!(numbered.contains(&"q1".to_string()));
        assert!(!numbered.contains(&"q".to_string()));
        assert!(combined.contains(&"q".to_string()) && combined.contains(&"q4".to_string()));
        assert_eq!(raw.len(), numbered.len());

        let by_length = registry.newline_markers_by_length();
        assert_eq!(by_length.len(), combined.len());
        assert!(by_length.windows(2).all(|w| w[0].len() >= w[1].len()));
    }

    #[test]
    fn test_character_markers() {
        let registry = registry();
        let plain = registry.character_markers(false, false);
        assert!(plain.contains(&"nd".to_string()));
        assert!(!plain.contains(&"ft".to_string()));
        let with_ends = registry.character_markers(true, true);
        assert!(with_ends.contains(&"\\nd*".to_string()));
    }

    #[test]
    fn test_shared_registry_is_reused() {
        let first = MarkerRegistry::shared().unwrap();
        let second = MarkerRegistry::shared().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_display_summary() {
        let summary = registry().to_string();
        assert!(summary.starts_with("USFM marker registry"));
    }
}
