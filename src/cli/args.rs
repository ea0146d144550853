//! CLI argument parsing module
//!
//! This module defines the command-line interface for goheft.

use bytesize::ByteSize;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// GoHeft - list the sizes of the static libraries linked into a Go binary
#[derive(Parser, Debug)]
#[command(name = "goheft")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Utility for listing sizes of used static libraries")]
#[command(long_about = r#"
goheft rebuilds a Go program from scratch (go build -work -a -v), inspects the
build's work directory and lists every package archive linked into the binary,
largest first.

Examples:
  goheft application.go                    # Show size of each used library
  goheft application.go -m 750kb           # Only libraries of at least 750kb
  goheft application.go -t release,slim    # Use tags when building
  goheft application.go --format json      # Output results as JSON
"#)]
pub struct Args {
    /// Go source file to build
    #[arg(value_name = "GO-FILE")]
    pub file: PathBuf,

    /// Build tags (repeatable, comma-separated values accepted)
    #[arg(short, long = "tags", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Shadow standard library packages
    #[arg(short = 'E', long)]
    pub external: bool,

    /// Don't show libraries smaller than this size (e.g. 750kb, 1MiB)
    #[arg(short, long = "min-size", value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Output format (raw by default when stdout is not a terminal)
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colors in output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Path to the go executable
    #[arg(long = "go", value_name = "PATH", default_value = "go")]
    pub go_path: String,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned, colored table with a total line (default)
    Pretty,
    /// One `<bytes> <package>` line per library
    Raw,
    /// JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Raw => write!(f, "raw"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn parse_size(value: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<ByteSize>()
        .map(|size| size.as_u64())
        .map_err(|e| format!("invalid size '{value}': {e}"))
}
