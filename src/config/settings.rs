//! Runtime configuration settings

use crate::archive::normalize::KNOWN_LABEL_PREFIXES;
use directories::UserDirs;
use std::path::PathBuf;

/// Name of the staging directory created inside the source directory
pub const STAGING_DIR_NAME: &str = "auto";

/// Runtime settings for the expansion pipeline
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory scanned for archives
    pub source: PathBuf,
    /// Library root receiving `<codec>/<artist>/<album>` trees
    pub library: PathBuf,
    /// Staging root for extraction before merge
    pub staging: PathBuf,
    /// Number of worker threads
    pub threads: usize,
    /// Label tags stripped from entry names
    pub label_prefixes: Vec<String>,
    /// Optional JSON report destination
    pub report: Option<PathBuf>,
    /// Show progress bars
    pub show_progress: bool,
    /// Dry run mode - show archives without processing
    pub dry_run: bool,
}

impl Settings {
    /// Create settings from CLI arguments
    pub fn from_cli(cli: &super::cli::Cli) -> Self {
        let defaults = Self::default();

        let source = cli.source.clone().unwrap_or(defaults.source);
        let staging = cli
            .staging
            .clone()
            .unwrap_or_else(|| source.join(STAGING_DIR_NAME));

        let mut label_prefixes = defaults.label_prefixes;
        label_prefixes.extend(cli.labels.iter().cloned());

        Self {
            source,
            library: cli.library.clone().unwrap_or(defaults.library),
            staging,
            threads: cli.threads.unwrap_or(defaults.threads).max(1),
            label_prefixes,
            report: cli.report.clone(),
            show_progress: !cli.quiet,
            dry_run: cli.dry_run,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let (source, library) = default_directories();
        Self {
            staging: source.join(STAGING_DIR_NAME),
            source,
            library,
            threads: num_cpus::get().max(1),
            label_prefixes: KNOWN_LABEL_PREFIXES.iter().map(|s| s.to_string()).collect(),
            report: None,
            show_progress: true,
            dry_run: false,
        }
    }
}

/// `~/Downloads/Bandcamp` and the user's music directory
fn default_directories() -> (PathBuf, PathBuf) {
    match UserDirs::new() {
        Some(dirs) => {
            let home = dirs.home_dir().to_path_buf();
            let downloads = dirs
                .download_dir()
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join("Downloads"));
            let music = dirs
                .audio_dir()
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join("Music"));
            (downloads.join("Bandcamp"), music)
        }
        None => (PathBuf::from("./Bandcamp"), PathBuf::from("./Music")),
    }
}
