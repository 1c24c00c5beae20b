//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Fetch open-access PDFs for the references cited in a document.
///
/// Paperfetch finds the "References" section of a plain-text document,
/// extracts each cited work's identifier and DOI, and saves any freely
/// available PDF as `{identifier}.pdf`.
#[derive(Parser, Debug)]
#[command(name = "paperfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Document to scan; `-` or omitted reads stdin
    pub document: Option<PathBuf>,

    /// Directory for retrieved PDFs [default: results/<document stem>]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Contact email sent to the lookup service (or set PAPERFETCH_EMAIL)
    #[arg(short = 'e', long)]
    pub email: Option<String>,

    /// Maximum DOIs resolved at once (1-32) [default: 4]
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub concurrency: Option<u8>,

    /// Lines searched after a reference header for its DOI (1-10) [default: 3]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub lookahead: Option<u8>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds (1-3600) [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Base URL of the lookup service
    #[arg(long, value_name = "URL", hide = true)]
    pub lookup_url: Option<String>,

    /// List extracted references without contacting any server
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
