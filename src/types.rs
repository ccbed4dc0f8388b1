//! Core data types for bandcamp-expand
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// =============================================================================
// Codec classification
// =============================================================================

/// Dominant audio encoding inside an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecKind {
    Flac,
    Aac,
    Unknown,
}

impl CodecKind {
    /// Classify a single entry name by its suffix (case-insensitive)
    ///
    /// Returns `None` for entries that are not recognised audio files.
    pub fn from_entry_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".flac") {
            Some(CodecKind::Flac)
        } else if lower.ends_with(".aac") || lower.ends_with(".m4a") {
            Some(CodecKind::Aac)
        } else {
            None
        }
    }

    /// Top-level library directory for this codec
    ///
    /// `Unknown` has no directory; the orchestrator fails those archives
    /// before any path is built.
    pub fn dir_name(self) -> Option<&'static str> {
        match self {
            CodecKind::Flac => Some("FLAC"),
            CodecKind::Aac => Some("AAC"),
            CodecKind::Unknown => None,
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name().unwrap_or("Unknown"))
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Archive containers picked up by discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
}

impl ArchiveFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("zip") {
            Some(ArchiveFormat::Zip)
        } else {
            None
        }
    }
}

// =============================================================================
// Per-archive state
// =============================================================================

/// Progress of a single archive through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArchiveStage {
    Discovered,
    Classified,
    Staged,
    Merged,
    Completed,
}

impl fmt::Display for ArchiveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArchiveStage::Discovered => "discovered",
            ArchiveStage::Classified => "classified",
            ArchiveStage::Staged => "staged",
            ArchiveStage::Merged => "merged",
            ArchiveStage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// One input archive under processing
#[derive(Debug, Clone)]
pub struct ArchiveRecord {
    /// Source archive path
    pub path: PathBuf,
    /// File name (used for parsing and reporting)
    pub file_name: String,
    /// Artist inferred from the file name
    pub artist: String,
    /// Album inferred from the file name
    pub album: String,
    /// Codec found inside the archive
    pub codec: CodecKind,
}

impl ArchiveRecord {
    /// Staging directory for this archive: `<staging>/<codec>/<artist>/<album>`
    pub fn staging_dir(&self, staging_root: &Path) -> PathBuf {
        self.album_path(staging_root)
    }

    /// Library directory for this archive: `<library>/<codec>/<artist>/<album>`
    pub fn library_dir(&self, library_root: &Path) -> PathBuf {
        self.album_path(library_root)
    }

    fn album_path(&self, root: &Path) -> PathBuf {
        root.join(self.codec.to_string())
            .join(&self.artist)
            .join(&self.album)
    }
}

/// Counts produced by merging a staging tree into the library
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    /// Files copied into a free destination slot
    pub copied: usize,
    /// Files skipped because an equal-sized file was already present
    pub skipped: usize,
    /// Files whose differently-sized destination was deleted and re-copied
    pub replaced: usize,
}

impl MergeStats {
    /// Fold another set of counts into this one
    pub fn absorb(&mut self, other: MergeStats) {
        self.copied += other.copied;
        self.skipped += other.skipped;
        self.replaced += other.replaced;
    }
}

/// Final state of one archive after the pipeline ran
#[derive(Debug, Clone)]
pub enum ArchiveOutcome {
    /// Extracted, merged, and the source archive deleted
    Completed {
        name: String,
        files_written: usize,
        merge: MergeStats,
    },
    /// Left in place; `stage` is the last stage reached
    Failed {
        name: String,
        stage: ArchiveStage,
        reason: String,
    },
}

impl ArchiveOutcome {
    pub fn name(&self) -> &str {
        match self {
            ArchiveOutcome::Completed { name, .. } | ArchiveOutcome::Failed { name, .. } => name,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ArchiveOutcome::Completed { .. })
    }
}
