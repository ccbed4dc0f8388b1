//! Pipeline orchestration
//!
//! Coordinates archive discovery, parallel per-archive expansion, and the
//! final report. Each archive runs end-to-end on one rayon worker:
//! classify, parse name, extract into staging, merge into the library,
//! delete staging, delete the archive. A failure at any step leaves the
//! archive and its staging directory in place and never stops the batch.

use crate::archive::{self, Extractor};
use crate::config::Settings;
use crate::discovery::{self, filename, DiscoveredArchive};
use crate::error::{ErrorContext, ExpandError, Result};
use crate::export;
use crate::library;
use crate::types::{ArchiveOutcome, ArchiveRecord, ArchiveStage, CodecKind, MergeStats};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::cell::Cell;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, error, info, info_span, warn};

/// Batch result summary
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total_archives: usize,
    /// One entry per processed archive, in no particular order
    pub outcomes: Vec<ArchiveOutcome>,
}

impl BatchReport {
    /// Names of archives that reached `Completed`
    pub fn completed(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_completed())
            .map(ArchiveOutcome::name)
    }

    /// Archives that failed, with the stage they reached
    pub fn failed(&self) -> impl Iterator<Item = &ArchiveOutcome> {
        self.outcomes.iter().filter(|o| !o.is_completed())
    }

    pub fn successful(&self) -> usize {
        self.completed().count()
    }

    pub fn failures(&self) -> usize {
        self.failed().count()
    }

    /// Merge counts summed over all completed archives
    pub fn merge_totals(&self) -> MergeStats {
        let mut totals = MergeStats::default();
        for outcome in &self.outcomes {
            if let ArchiveOutcome::Completed { merge, .. } = outcome {
                totals.absorb(*merge);
            }
        }
        totals
    }
}

/// Run the full expansion pipeline
pub fn run(settings: &Settings) -> Result<BatchReport> {
    use std::time::Instant;

    let pipeline_start = Instant::now();

    configure_thread_pool(settings.threads)?;

    // Phase 1: Discovery
    info!("Scanning {} for archives...", settings.source.display());
    let archives = discovery::scan(&settings.source)?;

    if archives.is_empty() {
        return Ok(BatchReport::default());
    }

    if settings.dry_run {
        return run_dry_run(&archives, settings);
    }

    // Phase 2: Expansion
    let extractor = Extractor::with_labels(settings.label_prefixes.iter().cloned());
    let outcomes = expand_archives(&archives, settings, &extractor);

    let report = BatchReport {
        total_archives: archives.len(),
        outcomes,
    };

    // Phase 3: Report
    info!("");
    for name in report.completed() {
        info!("Successfully processed: {}", name);
    }
    for outcome in report.failed() {
        if let ArchiveOutcome::Failed { name, stage, .. } = outcome {
            warn!("Left in place: {} (stopped after {})", name, stage);
        }
    }

    if let Some(path) = &settings.report {
        export::write_json(&report, path)?;
    }

    info!(
        "Total pipeline time: {:.2}s",
        pipeline_start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Configure the Rayon thread pool
fn configure_thread_pool(num_threads: usize) -> Result<()> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => {
            debug!("Configured thread pool with {} threads", num_threads);
        }
        Err(e) => {
            // If the pool is already initialized (e.g., in tests), that's OK
            if e.to_string().contains("already been initialized") {
                debug!("Thread pool already initialized, using existing pool");
            } else {
                return Err(ExpandError::ConfigError(format!(
                    "Failed to configure thread pool: {}",
                    e
                )));
            }
        }
    }
    Ok(())
}

/// Expand archives in parallel, one outcome per archive
fn expand_archives(
    archives: &[DiscoveredArchive],
    settings: &Settings,
    extractor: &Extractor,
) -> Vec<ArchiveOutcome> {
    let progress_bar = if settings.show_progress {
        let pb = ProgressBar::new(archives.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let outcomes: Vec<ArchiveOutcome> = archives
        .par_iter()
        .map(|archive| {
            let span = info_span!("archive", name = %archive.file_name);
            let _guard = span.enter();

            info!("Processing file: {}", archive.file_name);
            let outcome = guard_archive(&archive.file_name, |stage| {
                process_archive(archive, settings, extractor, stage)
            });

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
                pb.set_message(archive.file_name.clone());
            }
            outcome
        })
        .collect();

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Expansion complete");
    }

    outcomes
}

/// Run `f` for one archive, turning a panic into a failure at the last stage reached
fn guard_archive<F>(name: &str, f: F) -> ArchiveOutcome
where
    F: FnOnce(&Cell<ArchiveStage>) -> ArchiveOutcome,
{
    let stage = Cell::new(ArchiveStage::Discovered);

    panic::catch_unwind(AssertUnwindSafe(|| f(&stage))).unwrap_or_else(|panic_info| {
        let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        error!("Worker panicked on {}: {}", name, panic_msg);
        ArchiveOutcome::Failed {
            name: name.to_string(),
            stage: stage.get(),
            reason: format!("panic: {}", panic_msg),
        }
    })
}

/// Run one archive through every stage, converting failure into an outcome
fn process_archive(
    archive: &DiscoveredArchive,
    settings: &Settings,
    extractor: &Extractor,
    stage: &Cell<ArchiveStage>,
) -> ArchiveOutcome {
    match run_stages(archive, settings, extractor, stage) {
        Ok((files_written, merge)) => ArchiveOutcome::Completed {
            name: archive.file_name.clone(),
            files_written,
            merge,
        },
        Err(e) => {
            if e.is_recoverable() {
                error!("Failed {}: {}", archive.file_name, e);
            } else {
                error!(
                    "Unexpected system error on {} after {}: {}",
                    archive.file_name,
                    stage.get(),
                    e
                );
            }
            ArchiveOutcome::Failed {
                name: archive.file_name.clone(),
                stage: stage.get(),
                reason: e.to_string(),
            }
        }
    }
}

/// The per-archive state machine; `stage` tracks the last stage reached
fn run_stages(
    archive: &DiscoveredArchive,
    settings: &Settings,
    extractor: &Extractor,
    stage: &Cell<ArchiveStage>,
) -> Result<(usize, MergeStats)> {
    let record = inspect_archive(archive)?;
    stage.set(ArchiveStage::Classified);

    let staging_dir = record.staging_dir(&settings.staging);
    info!("Creating temp directory: {}", staging_dir.display());
    fs::create_dir_all(&staging_dir).with_path(&staging_dir)?;
    let files_written =
        extractor.extract(&record.path, &staging_dir, &record.artist, &record.album)?;
    stage.set(ArchiveStage::Staged);

    let library_dir = record.library_dir(&settings.library);
    info!(
        "Moving {} to final location: {}",
        staging_dir.display(),
        library_dir.display()
    );
    let merge = library::merge(&staging_dir, &library_dir, true)?;
    stage.set(ArchiveStage::Merged);

    fs::remove_dir_all(&staging_dir).with_path(&staging_dir)?;
    prune_empty_parents(&staging_dir, &settings.staging);
    fs::remove_file(&record.path).with_path(&record.path)?;
    stage.set(ArchiveStage::Completed);

    Ok((files_written, merge))
}

/// Classify the codec and parse artist/album into a record
fn inspect_archive(archive: &DiscoveredArchive) -> Result<ArchiveRecord> {
    let codec = archive::classify(&archive.path)?;
    if codec == CodecKind::Unknown {
        return Err(ExpandError::UnknownCodec {
            path: archive.path.clone(),
        });
    }
    info!("Found {} files in {}", codec, archive.file_name);

    let parsed = filename::parse(&archive.file_name)?;
    check_path_token(&archive.file_name, "artist", &parsed.artist)?;
    check_path_token(&archive.file_name, "album", &parsed.album)?;

    Ok(ArchiveRecord {
        path: archive.path.clone(),
        file_name: archive.file_name.clone(),
        artist: parsed.artist,
        album: parsed.album,
        codec,
    })
}

/// Artist and album become directory names; reject ones that would escape
fn check_path_token(filename: &str, what: &str, token: &str) -> Result<()> {
    if token.trim().is_empty() || token == "." || token == ".." {
        return Err(ExpandError::malformed(
            filename,
            format!("{} name '{}' is not usable as a directory", what, token),
        ));
    }
    Ok(())
}

/// Remove now-empty directories between `dir` and `root`, exclusive
///
/// Best effort: a directory another worker is still filling is not empty
/// and stays.
fn prune_empty_parents(dir: &Path, root: &Path) {
    let mut current = dir.parent();
    while let Some(parent) = current {
        if parent == root || !parent.starts_with(root) {
            break;
        }
        if fs::remove_dir(parent).is_err() {
            break;
        }
        debug!("Removed empty staging directory {}", parent.display());
        current = parent.parent();
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Dry run mode - show what each archive would become without touching disk
fn run_dry_run(archives: &[DiscoveredArchive], settings: &Settings) -> Result<BatchReport> {
    println!();
    println!("=== DRY RUN MODE ===");
    println!();

    let mut would_expand = 0;
    for archive in archives {
        match inspect_archive(archive) {
            Ok(record) => {
                would_expand += 1;
                println!("{} ({:.1} MB)", archive.file_name, mb(archive.size_bytes));
                println!("  artist: {}", record.artist);
                println!("  album:  {}", record.album);
                println!("  codec:  {}", record.codec);
                println!("  → {}", record.library_dir(&settings.library).display());
            }
            Err(e) => {
                println!("{}", archive.file_name);
                let reason = e.to_string();
                println!("  would be skipped: {}", reason.lines().next().unwrap_or_default());
            }
        }
        println!();
    }

    println!("─────────────────────────────────────────");
    println!();
    println!(
        "Would expand {} of {} archives into {}",
        would_expand,
        archives.len(),
        settings.library.display()
    );
    println!();

    Ok(BatchReport {
        total_archives: archives.len(),
        outcomes: Vec::new(),
    })
}
