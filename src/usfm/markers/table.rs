//! Declarative marker table
//!
//! The registry is built from a YAML document listing one entry per raw
//! marker. The built-in table (`data/markers.yaml`) is embedded into the
//! binary; callers with their own marker definitions can load any document
//! with the same shape through [`MarkerTable::from_yaml`].
//!
//! A malformed table is the one condition that fails hard at startup, so all
//! structural checks happen here, before any lookup structure is built.

use super::descriptor::{MarkerCategory, MarkerDescriptor, MarkerPolicy};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// The embedded default table.
pub const BUILTIN_TABLE: &str = include_str!("../../../data/markers.yaml");

/// Raw ids are one lowercase letter followed by up to three letters or digits.
static RAW_MARKER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]{0,3}$").expect("marker id pattern is valid"));

/// Level numbers are single digits.
const MAX_LEVELS: u8 = 9;

/// Problems found while loading a marker table.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("marker table is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("marker table defines no markers")]
    Empty,

    #[error("invalid marker id '{marker}' (expected 1-4 lowercase letters or digits)")]
    InvalidMarkerId { marker: String },

    #[error("marker '{marker}' is defined more than once")]
    DuplicateMarker { marker: String },

    #[error("spelling '{spelling}' of marker '{second}' clashes with marker '{first}'")]
    ConflictingSpelling {
        spelling: String,
        first: String,
        second: String,
    },

    #[error("marker '{marker}' declares {levels} levels (at most 9 allowed)")]
    TooManyLevels { marker: String, levels: u8 },
}

/// One entry as written in the table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkerEntry {
    pub marker: String,
    pub name: String,
    pub category: MarkerCategory,
    pub occurs_in: String,
    #[serde(default)]
    pub compulsory: bool,
    #[serde(default)]
    pub levels: u8,
    #[serde(default)]
    pub nests: bool,
    #[serde(default = "default_printed")]
    pub printed: bool,
    #[serde(default = "default_closed")]
    pub closed: MarkerPolicy,
    #[serde(default = "default_content")]
    pub content: MarkerPolicy,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_printed() -> bool {
    true
}

fn default_closed() -> MarkerPolicy {
    MarkerPolicy::Never
}

fn default_content() -> MarkerPolicy {
    MarkerPolicy::Sometimes
}

impl MarkerEntry {
    fn into_descriptor(self) -> MarkerDescriptor {
        let numberable = self.levels > 0;
        let standard = if numberable {
            format!("{}1", self.marker)
        } else {
            self.marker.clone()
        };
        MarkerDescriptor {
            raw: self.marker,
            standard,
            category: self.category,
            compulsory: self.compulsory,
            numberable,
            nests: self.nests,
            printed: self.printed,
            closed: self.closed,
            content: self.content,
            name: self.name,
            description: self.description,
            occurs_in: self.occurs_in,
            levels: self.levels,
        }
    }
}

/// A validated marker table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkerTable {
    pub markers: Vec<MarkerEntry>,
}

impl MarkerTable {
    /// Parse and validate a YAML marker table.
    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        let table: MarkerTable = serde_yaml::from_str(source)?;
        table.validate()?;
        Ok(table)
    }

    /// The embedded default table.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml(BUILTIN_TABLE)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        if self.markers.is_empty() {
            return Err(RegistryError::Empty);
        }

        // Raw ids first so a duplicate is reported as such rather than as a clash
        let mut owners: HashMap<String, String> = HashMap::new();
        for entry in &self.markers {
            if !RAW_MARKER_ID.is_match(&entry.marker) {
                return Err(RegistryError::InvalidMarkerId {
                    marker: entry.marker.clone(),
                });
            }
            if entry.levels > MAX_LEVELS {
                return Err(RegistryError::TooManyLevels {
                    marker: entry.marker.clone(),
                    levels: entry.levels,
                });
            }
            if owners
                .insert(entry.marker.clone(), entry.marker.clone())
                .is_some()
            {
                return Err(RegistryError::DuplicateMarker {
                    marker: entry.marker.clone(),
                });
            }
        }

        for entry in &self.markers {
            for level in 1..=entry.levels {
                let spelling = format!("{}{}", entry.marker, level);
                if let Some(first) = owners.insert(spelling.clone(), entry.marker.clone()) {
                    return Err(RegistryError::ConflictingSpelling {
                        spelling,
                        first,
                        second: entry.marker.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Resolve every entry into a descriptor, keeping table order.
    pub fn into_descriptors(self) -> Vec<MarkerDescriptor> {
        self.markers
            .into_iter()
            .map(MarkerEntry::into_descriptor)
            .collect()
    }
}
