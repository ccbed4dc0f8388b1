//! Extraction of one archive into its staging directory

use super::normalize::{self, KNOWN_LABEL_PREFIXES};
use super::sanitize::ExtractionRoot;
use crate::error::{ErrorContext, ExpandError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// Extracts archives, cleaning entry names and refusing traversal
#[derive(Debug, Clone)]
pub struct Extractor {
    labels: Vec<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::with_labels(KNOWN_LABEL_PREFIXES.iter().map(|s| s.to_string()))
    }
}

impl Extractor {
    /// Create an extractor that strips the given label tags
    pub fn with_labels<I>(labels: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Extract every entry of `archive_path` under `staging_root`
    ///
    /// Entries that resolve outside the root are skipped silently, entries
    /// whose destination already exists are skipped with a warning. Returns
    /// the number of files written.
    pub fn extract(
        &self,
        archive_path: &Path,
        staging_root: &Path,
        artist: &str,
        album: &str,
    ) -> Result<usize> {
        info!(
            "Expanding {} to {}",
            archive_path.file_name().unwrap_or_default().to_string_lossy(),
            staging_root.display()
        );

        let root = ExtractionRoot::new(staging_root)?;
        let prefixes = normalize::default_prefixes(&self.labels, artist, album);

        // Owned here so the handle is released on every return path
        let file = File::open(archive_path).with_path(archive_path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| ExpandError::archive(archive_path, e))?;

        let mut written = 0;
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ExpandError::archive(archive_path, e))?;

            let cleaned = normalize::strip(entry.name(), &prefixes);
            let destination = match root.resolve(&cleaned) {
                Ok(path) => path,
                Err(_) => {
                    debug!("Ignoring entry outside extraction root: {}", entry.name());
                    continue;
                }
            };

            if entry.is_dir() {
                fs::create_dir_all(&destination).with_path(&destination)?;
                continue;
            }

            if destination.exists() {
                warn!("Skipping (already exists) {}", cleaned);
                continue;
            }

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).with_path(parent)?;
            }

            let output = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&destination)
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    warn!("Skipping (already exists) {}", cleaned);
                    continue;
                }
                Err(e) => return Err(ExpandError::file_error(&destination, e)),
            };

            debug!("Writing {}", destination.display());
            if let Err(e) = write_entry(&mut entry, output) {
                // A partial file would be skipped as existing on the next run
                let _ = fs::remove_file(&destination);
                return Err(ExpandError::file_error(&destination, e));
            }
            written += 1;
        }

        Ok(written)
    }
}

/// Copy one entry into `output`; the zip reader checks the CRC at the end
fn write_entry(entry: &mut impl Read, output: File) -> io::Result<()> {
    let mut writer = BufWriter::new(output);
    io::copy(entry, &mut writer)?;
    writer.into_inner().map_err(|e| e.into_error())?;
    Ok(())
}
