//! JSON run report

use crate::error::{ExpandError, Result};
use crate::pipeline::BatchReport;
use crate::types::{ArchiveOutcome, ArchiveStage};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// JSON output schema version
const SCHEMA_VERSION: &str = "1.0";

/// Top-level JSON output structure
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReportJson {
    /// Schema version for forward compatibility
    pub version: String,
    /// Run metadata
    pub metadata: ReportMetadata,
    /// Archives that were expanded and deleted
    pub completed: Vec<CompletedJson>,
    /// Archives left in place
    pub failed: Vec<FailedJson>,
}

/// Report metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// bandcamp-expand version that generated this file
    pub generator_version: String,
    /// Timestamp of the report
    pub generated_at: String,
    /// Number of archives discovered
    pub archive_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedJson {
    pub name: String,
    pub files_written: usize,
    pub copied: usize,
    pub skipped: usize,
    pub replaced: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedJson {
    pub name: String,
    /// Last stage the archive reached
    pub stage: ArchiveStage,
    pub reason: String,
}

/// Write a batch report to a JSON file
///
/// Uses atomic write pattern: writes to a temp file first, then renames.
pub fn write_json(report: &BatchReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ExpandError::file_error(parent, e))?;
        }
    }

    // Write to temp file in same directory (ensures same filesystem for atomic rename)
    let temp_path = output_path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| ExpandError::FileOperation {
        path: output_path.to_path_buf(),
        reason: format!("Failed to create temp file: {}", e),
    })?;

    let mut writer = BufWriter::new(file);
    let output = to_json(report);

    serde_json::to_writer_pretty(&mut writer, &output).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        ExpandError::FileOperation {
            path: output_path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    // Flush before rename so a failed write never replaces the old report
    writer.flush().map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        ExpandError::FileOperation {
            path: output_path.to_path_buf(),
            reason: format!("Failed to flush report: {}", e),
        }
    })?;
    drop(writer);

    std::fs::rename(&temp_path, output_path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        ExpandError::FileOperation {
            path: output_path.to_path_buf(),
            reason: format!("Failed to finalize file: {}", e),
        }
    })?;

    info!("Wrote run report to {}", output_path.display());

    Ok(())
}

/// Read a previously written report
pub fn read_json(path: &Path) -> Result<RunReportJson> {
    let file = File::open(path).map_err(|e| ExpandError::file_error(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ExpandError::FileOperation {
        path: path.to_path_buf(),
        reason: format!("Invalid report JSON: {}", e),
    })
}

fn to_json(report: &BatchReport) -> RunReportJson {
    let mut completed = Vec::new();
    let mut failed = Vec::new();

    for outcome in &report.outcomes {
        match outcome {
            ArchiveOutcome::Completed {
                name,
                files_written,
                merge,
            } => completed.push(CompletedJson {
                name: name.clone(),
                files_written: *files_written,
                copied: merge.copied,
                skipped: merge.skipped,
                replaced: merge.replaced,
            }),
            ArchiveOutcome::Failed {
                name,
                stage,
                reason,
            } => failed.push(FailedJson {
                name: name.clone(),
                stage: *stage,
                reason: reason.clone(),
            }),
        }
    }

    completed.sort_by(|a, b| a.name.cmp(&b.name));
    failed.sort_by(|a, b| a.name.cmp(&b.name));

    RunReportJson {
        version: SCHEMA_VERSION.to_string(),
        metadata: ReportMetadata {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            archive_count: report.total_archives,
        },
        completed,
        failed,
    }
}
