//! Integration tests for logical line assembly
//!
//! Whole-book behaviour is pinned with inline snapshots of the rendered
//! lines; the small cases run under both dialects.

use rstest::{fixture, rstest};
use sfm::usfm::assembling::{AssembledBook, Dialect, LineAssembler, PhysicalLine};
use sfm::usfm::collection::Collection;
use sfm::usfm::config::SfmConfig;
use sfm::usfm::diagnostics::DiagnosticKind;
use sfm::usfm::markers::MarkerRegistry;
use sfm::usfm::reading::read_file;
use std::sync::Arc;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[fixture]
fn registry() -> Arc<MarkerRegistry> {
    MarkerRegistry::shared().expect("built-in marker table")
}

fn assemble(
    registry: &MarkerRegistry,
    dialect: Dialect,
    lines: &[(&str, &str)],
) -> AssembledBook {
    let config = SfmConfig::default();
    LineAssembler::new("TST", registry, &config)
        .with_dialect(dialect)
        .assemble(lines.iter().map(|(m, t)| PhysicalLine::new(*m, *t)))
}

fn pairs(book: &AssembledBook) -> Vec<(String, String)> {
    book.lines
        .iter()
        .map(|l| (l.marker.clone(), l.text.clone()))
        .collect()
}

fn owned(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected
        .iter()
        .map(|(m, t)| (m.to_string(), t.to_string()))
        .collect()
}

#[test]
fn test_usfm_book_snapshot() {
    let collection = Collection::with_builtin_markers(SfmConfig::default()).unwrap();
    let book = collection
        .assemble_file("GEN", fixture_path("GEN.usfm"), Dialect::Usfm)
        .unwrap();

    insta::assert_snapshot!(book.render(), @r###"
    \id GEN Test fixture
    \h Genesis
    \toc1 The First Book of Moses
    \mt1 Genesis
    \c 1
    \p
    \v 1 In the beginning God created the heavens and the earth.
    \v 2 The earth was formless and empty. \f + \fr 1:2 \ft Or \fq waste\f*
    \v 3 And God said, “Let there be light,”
    \v 4 and it was so.
    \q \nd Lord\nd*
    \s Heading
    "###);
}

#[test]
fn test_usfm_book_diagnostics_by_priority() {
    let collection = Collection::with_builtin_markers(SfmConfig::default()).unwrap();
    let book = collection
        .assemble_file("GEN", fixture_path("GEN.usfm"), Dialect::Usfm)
        .unwrap();

    let summary: Vec<(DiagnosticKind, u8, String)> = book
        .diagnostics
        .by_priority()
        .into_iter()
        .map(|d| (d.kind, d.weight, format!("{}:{}", d.chapter, d.verse)))
        .collect();
    assert_eq!(
        summary,
        vec![
            (DiagnosticKind::UnknownMarker, 100, "1:3".to_string()),
            (DiagnosticKind::EmbeddedNewlineMarker, 96, "1:3".to_string()),
            (DiagnosticKind::MarkerRecovered, 60, "1:2".to_string()),
            (DiagnosticKind::UnexpectedMarkerPlacement, 27, "1:3".to_string()),
            (DiagnosticKind::UnexpectedMarkerPlacement, 26, "1:2".to_string()),
        ]
    );
}

#[rstest]
#[case(Dialect::Usfm)]
#[case(Dialect::Esfm)]
fn test_embedded_verses_split(registry: Arc<MarkerRegistry>, #[case] dialect: Dialect) {
    let book = assemble(&registry, dialect, &[("p", "hello \\v 5 world \\v 6 end")]);
    assert_eq!(
        pairs(&book),
        owned(&[("p", "hello"), ("v", "5 world"), ("v", "6 end")])
    );
}

#[rstest]
#[case(Dialect::Usfm)]
#[case(Dialect::Esfm)]
fn test_footnote_line_merges_into_verse(registry: Arc<MarkerRegistry>, #[case] dialect: Dialect) {
    let book = assemble(
        &registry,
        dialect,
        &[("v", "1 In the beginning"), ("f", "footnote text")],
    );
    assert_eq!(
        pairs(&book),
        owned(&[("v", "1 In the beginning \\f footnote text")])
    );
}

#[rstest]
#[case(Dialect::Usfm, "This (USFM) file was completely empty")]
#[case(Dialect::Esfm, "This (ESFM) file was completely empty")]
fn test_empty_input(registry: Arc<MarkerRegistry>, #[case] dialect: Dialect, #[case] text: &str) {
    let book = assemble(&registry, dialect, &[]);
    assert_eq!(pairs(&book), owned(&[("rem", text)]));
    assert_eq!(book.diagnostics.len(), 1);
    assert_eq!(book.diagnostics.count_of(DiagnosticKind::EmptyFile), 1);
}

#[rstest]
#[case(&[("c", "1"), ("p", ""), ("v", "1 text \\nd Lord\\nd*")])]
#[case(&[("q1", "first"), ("q2", "second \\f + \\ft note\\f*"), ("b", "")])]
#[case(&[("rem", "\\nd loose")])]
fn test_logical_input_is_unchanged(registry: Arc<MarkerRegistry>, #[case] lines: &[(&str, &str)]) {
    let book = assemble(&registry, Dialect::Usfm, lines);
    assert_eq!(pairs(&book), owned(lines));
    assert!(book.diagnostics.is_empty());
}

#[test]
fn test_custom_fallback_marker() {
    let registry = MarkerRegistry::shared().unwrap();
    let mut config = SfmConfig::default();
    config.assembly.fallback_marker = "p".to_string();
    let book = LineAssembler::new("TST", &registry, &config)
        .assemble([PhysicalLine::new("nd", "Lord")]);
    assert_eq!(pairs(&book), owned(&[("p", "\\nd Lord")]));
}

#[test]
fn test_read_then_assemble_matches_collection() {
    let registry = MarkerRegistry::shared().unwrap();
    let config = SfmConfig::default();
    let lines = read_file(fixture_path("GEN.usfm")).unwrap();
    let direct = LineAssembler::new("GEN", &registry, &config).assemble(lines);

    let collection = Collection::new(registry.clone(), config.clone());
    let via_collection = collection
        .assemble_file("GEN", fixture_path("GEN.usfm"), Dialect::Usfm)
        .unwrap();
    assert_eq!(direct, via_collection);
}
