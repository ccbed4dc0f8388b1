//! CLI argument parsing and configuration

use clap::Parser;
use std::path::PathBuf;

/// bandcamp-expand - Unpack Bandcamp downloads into your music library
///
/// Finds `Artist - Album.zip` downloads, extracts them into
/// `<library>/<FLAC|AAC>/<Artist>/<Album>/`, and deletes each archive once
/// its tracks are safely in place.
#[derive(Parser, Debug)]
#[command(name = "bandcamp-expand")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory containing downloaded archives (defaults to ~/Downloads/Bandcamp)
    #[arg(short, long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Music library root (defaults to the user's music directory)
    #[arg(short, long, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Staging directory for extraction (defaults to <source>/auto)
    #[arg(long, value_name = "DIR")]
    pub staging: Option<PathBuf>,

    /// Number of worker threads (defaults to CPU count)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Additional label tag to strip from track names (repeatable),
    /// e.g. --label "Some Records - "
    #[arg(long = "label", value_name = "PREFIX")]
    pub labels: Vec<String>,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Dry run - show archives and destinations without extracting anything
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
