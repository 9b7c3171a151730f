//! Slipgraph CLI: builds, queries and checks a note graph.
//!
//! Usage:
//!   slipgraph build <facts> [--db path] [--dry-run]
//!   slipgraph query <facts> <subcommand>
//!   slipgraph check <facts>
//!
//! `<facts>` is a JSON-lines fact stream; `-` reads standard input.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use slipgraph::{
    check, read_facts, read_facts_from_path, Build, Config, Direction, FactStore, GraphSink,
    NoteId, OpenStore, Query, SqliteStore,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "slipgraph",
    version,
    about = "Note graph index for slipbox-style knowledge bases"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to the YAML config file (default: ./slipgraph.yaml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and commit it to the database
    Build {
        /// JSON-lines fact stream, or - for stdin
        facts: PathBuf,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Build and report without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Query a freshly built graph
    Query {
        /// JSON-lines fact stream, or - for stdin
        facts: PathBuf,
        #[command(subcommand)]
        action: QueryAction,
    },
    /// Report notes with empty links, no links or no citations
    Check {
        /// JSON-lines fact stream, or - for stdin
        facts: PathBuf,
    },
}

#[derive(Subcommand)]
enum QueryAction {
    /// A note with its links, aliases, tags and citations
    Note { id: u64 },
    /// Aliases above an alias, nearest first
    Ancestors { alias: String },
    /// Aliases below an alias, breadth first
    Descendants { alias: String },
    /// Sequence edges between notes carrying a tag
    Cluster { tag: String },
    /// Links and tag-cluster edges around a note
    Neighbors {
        id: u64,
        #[arg(long, value_enum, default_value = "both")]
        direction: DirectionArg,
    },
    /// Notes nothing points to that point somewhere
    Entrypoints,
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Out,
    In,
    Both,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Out => Direction::Outgoing,
            DirectionArg::In => Direction::Incoming,
            DirectionArg::Both => Direction::Both,
        }
    }
}

/// JSON shape of `query note`
#[derive(Serialize)]
struct NoteOutput<'g> {
    id: NoteId,
    title: &'g str,
    filename: &'g str,
    links: Vec<&'g slipgraph::Link>,
    backlinks: Vec<&'g slipgraph::Link>,
    aliases: Vec<&'g str>,
    tags: &'g [String],
    citations: &'g [String],
}

fn init_logging(config: &Config, verbose: u8) -> Result<(), String> {
    let level = match verbose {
        0 => config.log_level().map_err(|e| e.to_string())?,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn load_build(facts: &Path) -> Result<Build, String> {
    let mut store = FactStore::new();
    let skipped = if facts == Path::new("-") {
        read_facts(io::stdin().lock(), &mut store)
    } else {
        read_facts_from_path(facts, &mut store)
    }
    .map_err(|e| format!("Failed to read {}: {}", facts.display(), e))?;

    for err in &skipped {
        eprintln!("Skipped {}", err);
    }
    Ok(store.build())
}

fn print_json(value: &impl Serialize) -> i32 {
    write_json(&mut io::stdout().lock(), value)
}

/// Pretty JSON plus a trailing newline; 1 if either write fails
fn write_json(out: &mut impl Write, value: &impl Serialize) -> i32 {
    let written = serde_json::to_writer_pretty(&mut *out, value)
        .map_err(io::Error::from)
        .and_then(|()| writeln!(out));
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_build(build: &Build, db_path: &Path, dry_run: bool) -> i32 {
    let report = &build.report;
    for err in &report.rejected {
        eprintln!("Rejected: {}", err);
    }
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    println!(
        "Built {} notes from {} facts ({} unresolved, {} rejected)",
        build.graph.note_count(),
        report.facts,
        report.unresolved,
        report.rejected.len()
    );
    if dry_run {
        return 0;
    }

    let store = match SqliteStore::open(db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: failed to open database: {}", e);
            return 1;
        }
    };
    match store.commit(&build.graph) {
        Ok(commit) => {
            for warning in &commit.warnings {
                eprintln!("Warning: {}", warning);
            }
            let inserted: usize = commit.inserted.values().sum();
            println!(
                "Committed to {}: {} rows inserted, {} unchanged, {} warnings",
                db_path.display(),
                inserted,
                commit.unchanged,
                commit.warnings.len()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_query(build: &Build, action: QueryAction) -> i32 {
    let query = Query::new(&build.graph);
    match action {
        QueryAction::Note { id } => {
            let Some(note) = query.note(NoteId::new(id)) else {
                eprintln!("Error: note {} not found", id);
                return 1;
            };
            print_json(&NoteOutput {
                id: note.id(),
                title: note.title(),
                filename: note.filename(),
                links: note.links().collect(),
                backlinks: note.backlinks().collect(),
                aliases: note.aliases().collect(),
                tags: note.tags(),
                citations: note.citations(),
            })
        }
        QueryAction::Ancestors { alias } => print_json(&query.ancestors(&alias)),
        QueryAction::Descendants { alias } => print_json(&query.descendants(&alias)),
        QueryAction::Cluster { tag } => print_json(&query.cluster_elements(&tag)),
        QueryAction::Neighbors { id, direction } => {
            let elements = slipgraph::query::NeighborQuery::around(NoteId::new(id))
                .direction(direction.into())
                .execute(&build.graph);
            print_json(&elements)
        }
        QueryAction::Entrypoints => print_json(&query.entrypoints()),
    }
}

fn cmd_check(build: &Build, config: &Config) -> i32 {
    let findings = check::run(&build.graph, &config.checks);
    for finding in &findings {
        println!("{}", finding);
    }
    if findings.is_empty() {
        0
    } else {
        1
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = init_logging(&config, cli.verbose) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let facts = match &cli.command {
        Commands::Build { facts, .. } | Commands::Query { facts, .. } | Commands::Check { facts } => {
            facts.clone()
        }
    };
    let build = match load_build(&facts) {
        Ok(build) => build,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Commands::Build { db, dry_run, .. } => {
            cmd_build(&build, &config.database_path(db), dry_run)
        }
        Commands::Query { action, .. } => cmd_query(&build, action),
        Commands::Check { .. } => cmd_check(&build, &config),
    };
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `limit` bytes, then fails
    struct ShortWriter {
        written: Vec<u8>,
        limit: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.limit.saturating_sub(self.written.len());
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            let n = room.min(buf.len());
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_json_ends_with_newline() {
        let mut out = Vec::new();
        assert_eq!(write_json(&mut out, &[1, 2]), 0);
        assert_eq!(String::from_utf8(out).unwrap(), "[\n  1,\n  2\n]\n");
    }

    #[test]
    fn test_write_json_fails_when_newline_is_lost() {
        // Room for the document but not the newline
        let mut out = ShortWriter {
            written: Vec::new(),
            limit: "[\n  1,\n  2\n]".len(),
        };
        assert_eq!(write_json(&mut out, &[1, 2]), 1);
        assert!(!out.written.ends_with(b"\n"));
    }
}
