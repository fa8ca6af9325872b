//! Marksome CLI - Parse, render, and inspect marksome inline markup
//!
//! Usage:
//!   marksome [OPTIONS] <COMMAND> [FILE]
//!
//! Commands:
//!   parse   Display the segment tree
//!   html    Render to HTML
//!   stats   Show segment statistics
//!
//! FILE defaults to `-`, which reads standard input.

mod error;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use marksome_core::render::{to_html, References};
use marksome_core::stats::SegmentStats;
use marksome_core::{parse, Segment};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "marksome")]
#[command(author, version)]
#[command(about = "Parse and render marksome inline markup")]
#[command(after_help = "\
EXAMPLES:

    # Show the segment tree
    marksome parse copy.txt

    # Same, as JSON, from stdin
    echo 'Read the **[docs]**' | marksome parse --json

    # Render with references
    marksome html --ref docs=https://example.com/docs copy.txt
    marksome html --refs references.json copy.txt

Set RUST_LOG to control log output (default: warn).")]
#[command(arg_required_else_help = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and display the segment tree
    Parse {
        #[command(flatten)]
        input: Input,

        /// Print the tree as JSON
        #[arg(short, long)]
        json: bool,
    },
    /// Render to HTML, wrapped in an outer <span>
    Html {
        #[command(flatten)]
        input: Input,

        /// JSON object mapping reference keys to URLs
        #[arg(long, value_name = "FILE")]
        refs: Option<PathBuf>,

        /// Reference as KEY=URL; may be repeated and overrides --refs
        #[arg(long = "ref", value_name = "KEY=URL", value_parser = parse_reference)]
        references: Vec<(String, String)>,
    },
    /// Show segment statistics
    Stats {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Input file, or `-` for stdin
    #[arg(default_value = "-")]
    file: String,
}

impl Input {
    fn read(&self) -> Result<String, CliError> {
        let read_error = |source| CliError::Read {
            path: self.file.clone(),
            source,
        };

        if self.file == "-" {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).map_err(read_error)?;
            Ok(text)
        } else {
            fs::read_to_string(&self.file).map_err(read_error)
        }
    }
}

fn parse_reference(arg: &str) -> Result<(String, String), CliError> {
    match arg.split_once('=') {
        Some((key, url)) if !key.is_empty() => Ok((key.to_string(), url.to_string())),
        _ => Err(CliError::InvalidReference(arg.to_string())),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Parse { input, json } => cmd_parse(&input.read()?, json),
        Commands::Html {
            input,
            refs,
            references,
        } => cmd_html(&input.read()?, refs, references),
        Commands::Stats { input } => cmd_stats(&input.read()?),
    }
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(text: &str, json: bool) -> Result<(), CliError> {
    let segments = parse(text);
    log::debug!("parsed {} top-level segments", segments.len());

    if json {
        println!("{}", to_json(&segments)?);
    } else {
        print!("{}", format_tree(&segments));
    }

    Ok(())
}

/// Deepest nesting `to_json` accepts; serde serialization recurses per level.
const MAX_JSON_DEPTH: usize = 256;

fn to_json(segments: &[Segment<'_>]) -> Result<String, CliError> {
    let depth = SegmentStats::from_segments(segments).max_depth;
    if depth > MAX_JSON_DEPTH {
        return Err(CliError::TooDeep {
            depth,
            limit: MAX_JSON_DEPTH,
        });
    }

    Ok(serde_json::to_string_pretty(segments)?)
}

/// One line per segment, indented by depth.
fn format_tree(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    let mut pending: Vec<(&Segment<'_>, usize)> =
        segments.iter().rev().map(|s| (s, 0)).collect();

    while let Some((segment, depth)) = pending.pop() {
        let span = segment.span();
        let label = match segment {
            Segment::Text(t) => format!("Text {:?}", t.content),
            Segment::Strong(_) => "Strong".to_string(),
            Segment::Emphasis(_) => "Emphasis".to_string(),
            Segment::ReferenceLink(l) => format!("ReferenceLink [{}]", l.reference),
        };

        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{} @{}..{}\n", label, span.start, span.end));

        pending.extend(segment.content().iter().rev().map(|s| (s, depth + 1)));
    }

    out
}

// =============================================================================
// Html Command
// =============================================================================

fn cmd_html(
    text: &str,
    refs: Option<PathBuf>,
    overrides: Vec<(String, String)>,
) -> Result<(), CliError> {
    let mut references = match refs {
        Some(path) => load_references(path)?,
        None => References::new(),
    };
    for (key, url) in overrides {
        references.insert_url(key, url);
    }
    log::debug!("rendering with {} references", references.len());

    // A trailing newline from files or `echo` is not part of the copy.
    let text = text.strip_suffix('\n').unwrap_or(text);
    println!("{}", to_html(text, &references));

    Ok(())
}

fn load_references(path: PathBuf) -> Result<References, CliError> {
    let raw = fs::read_to_string(&path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let table: HashMap<String, String> = serde_json::from_str(&raw)
        .map_err(|source| CliError::InvalidReferences { path, source })?;

    Ok(table.into_iter().collect())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(text: &str) -> Result<(), CliError> {
    let segments = parse(text);
    let stats = SegmentStats::from_segments(&segments);

    println!("Segment Statistics");
    println!("------------------");
    println!("Segments:         {}", stats.total());
    println!("  Text:           {}", stats.text);
    println!("  Strong:         {}", stats.strong);
    println!("  Emphasis:       {}", stats.emphasis);
    println!("  Links:          {}", stats.reference_links);
    println!("Max depth:        {}", stats.max_depth);
    println!();
    println!("Size:");
    println!("  Bytes:          {}", text.len());
    println!("  Characters:     {}", text.chars().count());
    println!();

    if stats.references.is_empty() {
        println!("References:       none");
    } else {
        println!("References:");
        for key in &stats.references {
            println!("  - {}", key);
        }
    }

    Ok(())
}
