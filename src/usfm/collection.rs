//! A set of books sharing one registry, configuration and dictionaries
//!
//! Books can be assembled from several threads into the same collection;
//! the dictionaries sit behind a mutex that is taken once per preprocessed
//! ESFM line.

use super::assembling::{AssembledBook, Dialect, LineAssembler, PhysicalLine};
use super::config::SfmConfig;
use super::esfm::Annotations;
use super::markers::{MarkerRegistry, RegistryError};
use super::reading::{read_file, ReadError};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

pub struct Collection {
    registry: Arc<MarkerRegistry>,
    config: SfmConfig,
    annotations: Mutex<Annotations>,
}

impl Collection {
    pub fn new(registry: Arc<MarkerRegistry>, config: SfmConfig) -> Self {
        Collection {
            registry,
            config,
            annotations: Mutex::new(Annotations::default()),
        }
    }

    /// A collection over the shared built-in registry.
    pub fn with_builtin_markers(config: SfmConfig) -> Result<Self, RegistryError> {
        Ok(Self::new(MarkerRegistry::shared()?, config))
    }

    /// Start from previously loaded dictionaries.
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = Mutex::new(annotations);
        self
    }

    pub fn registry(&self) -> &Arc<MarkerRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SfmConfig {
        &self.config
    }

    pub fn assemble_book<I>(&self, book: &str, lines: I, dialect: Dialect) -> AssembledBook
    where
        I: IntoIterator<Item = PhysicalLine>,
    {
        let span = tracing::info_span!("assemble_book", book = %book, dialect = %dialect);
        let _enter = span.enter();

        let assembled = LineAssembler::new(book, &self.registry, &self.config)
            .with_dialect(dialect)
            .with_annotations(&self.annotations)
            .assemble(lines);

        tracing::info!(
            lines = assembled.lines.len(),
            diagnostics = assembled.diagnostics.len(),
            "assembled book"
        );
        assembled
    }

    /// Read a file and assemble it.
    pub fn assemble_file(
        &self,
        book: &str,
        path: impl AsRef<Path>,
        dialect: Dialect,
    ) -> Result<AssembledBook, ReadError> {
        let lines = read_file(path)?;
        Ok(self.assemble_book(book, lines, dialect))
    }

    /// A copy of the dictionaries as they stand.
    pub fn annotations(&self) -> Annotations {
        self.annotations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn into_annotations(self) -> Annotations {
        self.annotations
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usfm::esfm::StrongsEntry;
    use std::thread;

    fn collection() -> Collection {
        let mut annotations = Annotations::default();
        annotations
            .strongs
            .define('H', "430", StrongsEntry::Definition("God".to_string()));
        Collection::with_builtin_markers(SfmConfig::default())
            .unwrap()
            .with_annotations(annotations)
    }

    #[test]
    fn test_books_share_dictionaries_across_threads() {
        let collection = collection();
        thread::scope(|scope| {
            for book in ["GEN", "EXO"] {
                let collection = &collection;
                scope.spawn(move || {
                    collection.assemble_book(
                        book,
                        [PhysicalLine::new("v", "1 Elohim=SH430 made")],
                        Dialect::Esfm,
                    )
                });
            }
        });

        let annotations = collection.into_annotations();
        let entry = annotations.strongs.get('H', "430").unwrap();
        let mut books: Vec<&str> = entry
            .occurrences()
            .iter()
            .map(|o| o.book.as_str())
            .collect();
        books.sort();
        assert_eq!(books, vec!["EXO", "GEN"]);
    }

    #[test]
    fn test_usfm_books_leave_dictionaries_alone() {
        let collection = collection();
        let book = collection.assemble_book(
            "GEN",
            [PhysicalLine::new("v", "1 Elohim=SH430 made")],
            Dialect::Usfm,
        );
        assert_eq!(book.lines[0].text, "1 Elohim=SH430 made");
        assert!(collection.annotations().strongs.get('H', "430").unwrap().occurrences().is_empty());
    }
}
