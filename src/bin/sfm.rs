//! Command-line interface for sfm
//! Assembles USFM/ESFM files into logical lines and describes markers.
//!
//! Usage:
//!   sfm assemble `<path>` [--esfm] [--book `<BBB>`] [--format lines|json] [--config `<file>`]
//!                         [--semantic `<file>`] [--strongs `<file>`]
//!   sfm markers [`<marker>`...] [--note-sets]
//!
//! Log verbosity follows `RUST_LOG` (default `warn`).

use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use sfm::usfm::assembling::{AssembledBook, Dialect};
use sfm::usfm::collection::Collection;
use sfm::usfm::config::Loader;
use sfm::usfm::esfm::{Annotations, SemanticDict, StrongsDict};
use sfm::usfm::markers::{MarkerRegistry, NoteSetSelection};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("sfm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Assemble USFM and ESFM files into logical lines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("assemble")
                .about("Assemble a book file and print its logical lines")
                .arg(
                    Arg::new("path")
                        .help("Path to the USFM or ESFM file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("esfm")
                        .long("esfm")
                        .help("Treat the file as ESFM (implied by a .esfm extension)")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("book")
                        .long("book")
                        .short('b')
                        .help("Book code used in diagnostics (defaults to the file name)"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["lines", "json"])
                        .default_value("lines"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("TOML file layered over the default configuration")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("semantic")
                        .long("semantic")
                        .help("JSON semantic dictionary to tag against")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("strongs")
                        .long("strongs")
                        .help("JSON Strong's dictionary to tag against")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("markers")
                .about("Describe markers known to the registry")
                .arg(
                    Arg::new("marker")
                        .help("Markers to describe (without the backslash)")
                        .num_args(0..)
                        .index(1),
                )
                .arg(
                    Arg::new("note-sets")
                        .long("note-sets")
                        .help("List typical footnote and cross-reference marker sequences")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("assemble", assemble_matches)) => handle_assemble_command(assemble_matches),
        Some(("markers", markers_matches)) => handle_markers_command(markers_matches),
        _ => Err("unknown command".into()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    book: &'a AssembledBook,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotations: Option<Annotations>,
}

/// Handle the assemble command
fn handle_assemble_command(matches: &ArgMatches) -> CliResult {
    let path = matches
        .get_one::<PathBuf>("path")
        .ok_or("missing file path")?;

    let mut loader = Loader::new();
    if let Some(config) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(config);
    }
    let config = loader.build()?;

    let dialect = if matches.get_flag("esfm") || Dialect::from_path(path) == Dialect::Esfm {
        Dialect::Esfm
    } else {
        config.assembly.dialect
    };
    let book = match matches.get_one::<String>("book") {
        Some(book) => book.clone(),
        None => book_code_from_path(path),
    };

    let mut annotations = Annotations::default();
    if let Some(file) = matches.get_one::<PathBuf>("semantic") {
        annotations.semantic = SemanticDict::from_json(&std::fs::read_to_string(file)?)?;
    }
    if let Some(file) = matches.get_one::<PathBuf>("strongs") {
        annotations.strongs = StrongsDict::from_json(&std::fs::read_to_string(file)?)?;
    }

    let collection = Collection::with_builtin_markers(config)?.with_annotations(annotations);
    let assembled = collection.assemble_file(&book, path, dialect)?;

    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => {
            let output = JsonOutput {
                book: &assembled,
                annotations: (dialect == Dialect::Esfm).then(|| collection.annotations()),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            print!("{}", assembled.render());
            for diagnostic in assembled.diagnostics.by_priority() {
                eprintln!("{}", diagnostic);
            }
        }
    }
    Ok(())
}

/// `.../GEN.usfm` -> `GEN`
fn book_code_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_uppercase)
        .unwrap_or_else(|| "XXX".to_string())
}

/// Handle the markers command
fn handle_markers_command(matches: &ArgMatches) -> CliResult {
    let registry = MarkerRegistry::shared()?;

    if matches.get_flag("note-sets") {
        for set in registry.typical_note_sets(NoteSetSelection::All) {
            println!("{}", set.join(" "));
        }
        return Ok(());
    }

    let markers: Vec<&String> = matches
        .get_many::<String>("marker")
        .map(|values| values.collect())
        .unwrap_or_default();

    if markers.is_empty() {
        print!("{}", registry);
        println!("  zones: {}", registry.occurs_in_list().join(", "));
        return Ok(());
    }

    for marker in markers {
        let marker = marker.trim_start_matches('\\');
        let Some(descriptor) = registry.descriptor(marker) else {
            println!("\\{marker}: unknown marker");
            continue;
        };
        println!("\\{marker}: {}", descriptor.name);
        println!("  category: {}", descriptor.category);
        println!(
            "  raw: \\{}  standard: \\{}",
            registry.to_raw_marker(marker)?,
            registry.to_standard_marker(marker)?
        );
        println!("  occurs in: {}", descriptor.occurs_in);
        println!(
            "  closed: {}  content: {}",
            descriptor.closed, descriptor.content
        );
        if let Some(description) = &descriptor.description {
            println!("  {}", description);
        }
    }
    Ok(())
}
