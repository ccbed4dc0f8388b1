//! Archive discovery in the download directory

use crate::error::{ExpandError, Result};
use crate::types::ArchiveFormat;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Discovered archive with basic metadata
#[derive(Debug, Clone)]
pub struct DiscoveredArchive {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
}

/// Scan a directory (non-recursively) for archives
///
/// Results are sorted by file name so dry runs and reports are stable.
pub fn scan(input: &Path) -> Result<Vec<DiscoveredArchive>> {
    if !input.is_dir() {
        return Err(ExpandError::FileNotFound(input.to_path_buf()));
    }

    let mut archives: Vec<DiscoveredArchive> = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| try_discover_archive(e.path()))
        .inspect(|archive| {
            debug!("Discovered: {} ({} bytes)", archive.path.display(), archive.size_bytes)
        })
        .collect();

    archives.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    info!("Discovered {} archives", archives.len());

    if archives.is_empty() {
        warn!("No archives found in {}", input.display());
    }

    Ok(archives)
}

/// Try to create a DiscoveredArchive if the path is a supported archive
fn try_discover_archive(path: &Path) -> Option<DiscoveredArchive> {
    let ext = path.extension()?.to_str()?;
    ArchiveFormat::from_extension(ext)?;
    let file_name = path.file_name()?.to_str()?.to_string();

    let metadata = std::fs::metadata(path).ok()?;

    Some(DiscoveredArchive {
        path: path.to_path_buf(),
        file_name,
        size_bytes: metadata.len(),
    })
}
