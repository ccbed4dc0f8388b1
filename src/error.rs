//! Unified error types for bandcamp-expand
//!
//! Error strategy:
//! - Per-archive errors (filename, codec, extraction, merge): Recoverable,
//!   the archive is left in place and the batch continues
//! - Per-entry errors (traversal): Skipped silently inside the extractor
//! - System errors (missing source directory, thread pool): Fatal, abort batch

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Archive extensions picked up by discovery
pub const SUPPORTED_ARCHIVES: &str = "ZIP";

/// Top-level error type for bandcamp-expand operations
#[derive(Debug, Error)]
pub enum ExpandError {
    // =========================================================================
    // Recoverable errors - skip archive, continue batch
    // =========================================================================
    #[error("Failed to parse '{filename}': {reason}\n  Tip: Expected a name like 'Artist - Album.zip'. Is this a Bandcamp download?")]
    MalformedFilename { filename: String, reason: String },

    #[error("No FLAC or AAC files found inside '{path}'\n  Tip: Only FLAC and AAC/M4A downloads can be sorted into the library")]
    UnknownCodec { path: PathBuf },

    #[error("Directory does not exist or could not be found: '{0}'")]
    DirectoryMissing(PathBuf),

    #[error("Cannot read archive '{path}': {reason}\n  Supported archives: {SUPPORTED_ARCHIVES}\n  Tip: The download may be incomplete, try fetching it again")]
    Archive { path: PathBuf, reason: String },

    #[error("File operation failed on '{path}': {reason}")]
    FileOperation { path: PathBuf, reason: String },

    // =========================================================================
    // Per-entry errors - entry skipped, archive continues
    // =========================================================================
    #[error("Archive entry '{entry}' resolves outside its extraction root")]
    TraversalRejected { entry: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Source directory not found: '{0}'\n  Tip: Check the path exists or pass --source")]
    FileNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bandcamp-expand operations
pub type Result<T> = std::result::Result<T, ExpandError>;

impl ExpandError {
    /// Returns true if this error only affects a single archive (skip it, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExpandError::MalformedFilename { .. }
                | ExpandError::UnknownCodec { .. }
                | ExpandError::DirectoryMissing(_)
                | ExpandError::Archive { .. }
                | ExpandError::FileOperation { .. }
                | ExpandError::TraversalRejected { .. }
        )
    }

    /// Create a malformed filename error
    pub fn malformed(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        ExpandError::MalformedFilename {
            filename: filename.into(),
            reason: reason.into(),
        }
    }

    /// Create an archive error from a zip failure
    pub fn archive(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ExpandError::Archive {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Create a file operation error, checking for common issues
    pub fn file_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!("Permission denied. Check that you have write access to {}", path.display())
            }
            std::io::ErrorKind::NotFound => {
                format!("No such file or directory: {}", path.display())
            }
            _ => err.to_string(),
        };
        ExpandError::FileOperation { path, reason }
    }
}

/// Extension trait for attaching a path to IO errors
pub trait ErrorContext<T> {
    /// Convert an IO error into a `FileOperation` error for `path`
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> ErrorContext<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|e| ExpandError::file_error(path, e))
    }
}
