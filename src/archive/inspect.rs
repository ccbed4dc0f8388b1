//! Codec classification by peeking at entry names
//!
//! Archives are assumed never to mix FLAC and AAC members. If one does, the
//! first recognised entry decides, because library routing depends on it.

use crate::error::{ExpandError, Result};
use crate::types::CodecKind;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Open `archive_path` and classify it by the first audio entry found
pub fn classify(archive_path: &Path) -> Result<CodecKind> {
    let file = File::open(archive_path).map_err(|e| ExpandError::file_error(archive_path, e))?;
    let archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| ExpandError::archive(archive_path, e))?;

    // Names come from the central directory in archive order; nothing is decompressed
    let codec = classify_names(archive.file_names());
    debug!("Classified {} as {}", archive_path.display(), codec);
    Ok(codec)
}

/// Classify a sequence of entry names, stopping at the first match
pub fn classify_names<I, S>(names: I) -> CodecKind
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .find_map(|name| CodecKind::from_entry_name(name.as_ref()))
        .unwrap_or(CodecKind::Unknown)
}
