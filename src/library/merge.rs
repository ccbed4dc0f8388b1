//! Merging a staging tree into the library
//!
//! Existing library files are compared by size only. An equal size counts
//! as an already-merged duplicate, a different size as an incomplete prior
//! copy that gets replaced. Two different files of identical size are
//! indistinguishable here.

use crate::error::{ErrorContext, ExpandError, Result};
use crate::types::MergeStats;
use std::fs;
use std::path::Path;
use tracing::{debug, error, warn};

/// Merge `source_dir` into `dest_dir`, descending into subdirectories when
/// `recursive` is set
///
/// Nothing under `source_dir` is removed; the caller deletes the staging
/// tree once the merge succeeded.
pub fn merge(source_dir: &Path, dest_dir: &Path, recursive: bool) -> Result<MergeStats> {
    if !source_dir.is_dir() {
        return Err(ExpandError::DirectoryMissing(source_dir.to_path_buf()));
    }

    fs::create_dir_all(dest_dir).with_path(dest_dir)?;

    let mut stats = MergeStats::default();
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(source_dir).with_path(source_dir)? {
        let entry = entry.with_path(source_dir)?;
        let file_type = entry.file_type().with_path(&entry.path())?;

        if file_type.is_dir() {
            subdirs.push(entry);
            continue;
        }
        if !file_type.is_file() {
            debug!("Ignoring non-regular file {}", entry.path().display());
            continue;
        }

        let source = entry.path();
        let target = dest_dir.join(entry.file_name());

        if target.exists() {
            let dest_len = fs::metadata(&target).with_path(&target)?.len();
            let source_len = entry.metadata().with_path(&source)?.len();
            if dest_len == source_len {
                warn!("File: {} already exists, skipping...", target.display());
                stats.skipped += 1;
                continue;
            }
            error!(
                "File: {} already exists, but has a filesize mismatch, copying again ({} != {})",
                target.display(),
                source_len,
                dest_len
            );
            fs::remove_file(&target).with_path(&target)?;
            stats.replaced += 1;
        } else {
            stats.copied += 1;
        }

        debug!("Copying from {} to {}", source.display(), target.display());
        fs::copy(&source, &target).with_path(&target)?;
    }

    if recursive {
        for subdir in subdirs {
            let nested = merge(&subdir.path(), &dest_dir.join(subdir.file_name()), recursive)?;
            stats.absorb(nested);
        }
    }

    Ok(stats)
}
