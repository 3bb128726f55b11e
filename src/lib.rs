//! Coursemap: a content metadata index for markdown learning corpora.
//!
//! Coursemap ingests a directory tree of markdown documents with YAML
//! front-matter (title, phase, topic, depth, reading time, prerequisites,
//! related topics, personas), validates and normalizes the metadata, and
//! answers queries over the result: documents by phase, topic, depth, or
//! persona, plus a prerequisite-respecting recommended reading order.
//!
//! # Model
//!
//! - **Batch build**: the whole corpus is scanned and indexed at once; the
//!   index is immutable afterwards. A rebuild produces a new index.
//! - **Soft vs hard validation**: structurally broken documents are
//!   excluded individually with diagnostics; unknown personas and dangling
//!   references are warnings; duplicate ids and prerequisite cycles abort
//!   the build.
//! - **Determinism**: every query result is ordered by
//!   `(phase, topic, depth, id)` or by the topological reading order, never
//!   by filesystem enumeration order.
//!
//! # Crate Structure
//!
//! - [`core::frontmatter`]: YAML front-matter extraction
//! - [`core::record`]: validated document records
//! - [`core::index`]: the corpus index and its derived views
//! - [`core::relations`]: reference resolution, cycle detection, ordering
//! - [`core::matcher`]: persona-filtered recommendations

pub mod core;

use crate::core::diagnostics::Diagnostic;
use crate::core::error::CoursemapError;
use crate::core::index::{self, CorpusIndex};
use crate::core::matcher;
use crate::core::persona::{PersonaProfile, PersonaTag};
use crate::core::record::{Depth, DocumentRecord};
use crate::core::scan;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(
    name = "coursemap",
    version = env!("CARGO_PKG_VERSION"),
    about = "Content metadata index for markdown learning corpora"
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct BuildCli {
    /// Corpus root directory to scan for markdown documents.
    #[clap(default_value = ".")]
    root: PathBuf,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
}

#[derive(clap::Args, Debug)]
struct QueryCommon {
    /// Corpus root directory.
    #[clap(long, default_value = ".")]
    root: PathBuf,
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
}

#[derive(clap::Args, Debug)]
struct QueryCli {
    #[clap(subcommand)]
    command: QueryCommand,
}

#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Documents in a phase folder (e.g. 02-design)
    Phase {
        phase: String,
        #[clap(flatten)]
        common: QueryCommon,
    },
    /// Documents covering a topic slug
    Topic {
        topic: String,
        #[clap(flatten)]
        common: QueryCommon,
    },
    /// Documents at an exact depth
    Depth {
        #[clap(value_enum)]
        depth: Depth,
        #[clap(flatten)]
        common: QueryCommon,
    },
    /// Documents tagged for a persona
    Persona {
        #[clap(value_enum)]
        persona: PersonaTag,
        #[clap(flatten)]
        common: QueryCommon,
    },
}

#[derive(clap::Args, Debug)]
struct OrderCli {
    /// Persona to recommend for.
    #[clap(long, value_enum)]
    persona: PersonaTag,
    /// Inclusive depth ceiling (surface < mid-depth < deep-water).
    #[clap(long, value_enum)]
    max_depth: Option<Depth>,
    #[clap(flatten)]
    common: QueryCommon,
}

#[derive(clap::Args, Debug)]
struct PersonasCli {
    /// Output format: 'text' or 'json'.
    #[clap(long, default_value = "text")]
    format: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the corpus index and report diagnostics
    #[clap(name = "build", visible_alias = "b")]
    Build(BuildCli),

    /// Query the built index
    #[clap(name = "query", visible_alias = "q")]
    Query(QueryCli),

    /// Recommended reading order for a persona
    #[clap(name = "order", visible_alias = "o")]
    Order(OrderCli),

    /// List persona reference profiles
    #[clap(name = "personas")]
    Personas(PersonasCli),

    /// Print the subsystem schema
    #[clap(name = "schema")]
    Schema,
}

pub fn run() -> Result<(), CoursemapError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(build_cli) => run_build(&build_cli.root, &build_cli.format),
        Command::Query(query_cli) => match query_cli.command {
            QueryCommand::Phase { phase, common } => {
                let (corpus, warnings) = load_corpus(&common.root)?;
                warn_summary(&warnings);
                print_records(&corpus.by_phase(&phase), &common.format);
                Ok(())
            }
            QueryCommand::Topic { topic, common } => {
                let (corpus, warnings) = load_corpus(&common.root)?;
                warn_summary(&warnings);
                print_records(&corpus.by_topic(&topic), &common.format);
                Ok(())
            }
            QueryCommand::Depth { depth, common } => {
                let (corpus, warnings) = load_corpus(&common.root)?;
                warn_summary(&warnings);
                print_records(&corpus.by_depth(depth), &common.format);
                Ok(())
            }
            QueryCommand::Persona { persona, common } => {
                let (corpus, warnings) = load_corpus(&common.root)?;
                warn_summary(&warnings);
                print_records(&corpus.by_persona(persona), &common.format);
                Ok(())
            }
        },
        Command::Order(order_cli) => {
            let (corpus, warnings) = load_corpus(&order_cli.common.root)?;
            warn_summary(&warnings);
            let matched = matcher::match_persona(&corpus, order_cli.persona, order_cli.max_depth);
            print_records(&matched, &order_cli.common.format);
            Ok(())
        }
        Command::Personas(personas_cli) => {
            if personas_cli.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(PersonaProfile::all()).unwrap()
                );
            } else {
                for profile in PersonaProfile::all() {
                    println!(
                        "{} {}",
                        profile.tag.to_string().bright_white().bold(),
                        format!("(prefers {})", profile.preferred_depth).bright_black()
                    );
                    println!("  {}", profile.tagline);
                    println!(
                        "  {} {}",
                        "entry points:".bright_black(),
                        profile.entry_points.join(", ")
                    );
                }
            }
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&index::schema()).unwrap());
            Ok(())
        }
    }
}

/// Build the corpus, routing fatal diagnostics to stderr before
/// propagating the error.
fn load_corpus(root: &Path) -> Result<(CorpusIndex, Vec<Diagnostic>), CoursemapError> {
    match scan::build_corpus(root) {
        Ok(built) => Ok(built),
        Err(e) => {
            for diagnostic in e.diagnostics() {
                eprintln!("{}", render_diagnostic(diagnostic));
            }
            Err(e)
        }
    }
}

fn run_build(root: &Path, format: &str) -> Result<(), CoursemapError> {
    let (corpus, diagnostics) = load_corpus(root)?;

    if format == "json" {
        let report = serde_json::json!({
            "documents": corpus.len(),
            "reading_order": corpus.reading_order(),
            "diagnostics": diagnostics,
        });
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
        return Ok(());
    }

    println!(
        "{} indexed {} documents from {}",
        "✓".bright_green(),
        corpus.len().to_string().bright_white().bold(),
        root.display()
    );
    if diagnostics.is_empty() {
        println!("{} no diagnostics", "✓".bright_green());
    } else {
        println!(
            "{} {} diagnostics",
            "⚠".bright_yellow(),
            diagnostics.len().to_string().bright_white().bold()
        );
        for diagnostic in &diagnostics {
            println!("  {}", render_diagnostic(diagnostic));
        }
    }
    Ok(())
}

fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    let marker = if diagnostic.is_fatal() {
        "✗".bright_red().to_string()
    } else {
        "⚠".bright_yellow().to_string()
    };
    let subject = diagnostic
        .document_id
        .as_deref()
        .unwrap_or("<corpus>")
        .bright_white()
        .to_string();
    format!("{} {} {}", marker, subject, diagnostic.detail)
}

fn warn_summary(warnings: &[Diagnostic]) {
    if !warnings.is_empty() {
        eprintln!(
            "{} {} diagnostics from corpus build (run `coursemap build` for details)",
            "⚠".bright_yellow(),
            warnings.len()
        );
    }
}

fn print_records(records: &[&DocumentRecord], format: &str) {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(records).unwrap());
        return;
    }
    for record in records {
        let reading_time = record
            .reading_time_minutes
            .map(|m| format!(", {m} min"))
            .unwrap_or_default();
        println!(
            "{} {} {}",
            record.id.bright_white().bold(),
            format!("[{}]", record.depth).bright_cyan(),
            format!("{} ({}/{}{})", record.title, record.phase, record.topic, reading_time)
        );
    }
}
