//! Destination path resolution for untrusted archive entries
//!
//! Entry names are joined under an extraction root and normalized lexically
//! (the target does not exist yet, so `canonicalize` cannot be used). The
//! result is accepted only if its bytes start with the root's bytes and the
//! match ends on a component boundary. The comparison is byte-exact on
//! purpose: a case-sensitive volume mounted inside a case-insensitive one
//! must not be able to smuggle a differently-cased root past the check.

use crate::error::{ExpandError, Result};
use std::path::{is_separator, Component, Path, PathBuf};

/// A resolved extraction root that archive entries are checked against
#[derive(Debug, Clone)]
pub struct ExtractionRoot {
    resolved: PathBuf,
}

impl ExtractionRoot {
    /// Make `root` absolute (against the current directory) and normalize it
    pub fn new(root: &Path) -> Result<Self> {
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        Ok(Self {
            resolved: normalize_lexically(&absolute),
        })
    }

    /// The normalized root path
    pub fn path(&self) -> &Path {
        &self.resolved
    }

    /// Resolve an entry name under this root
    ///
    /// Both `/` and `\` are treated as separators in `entry`, since zip
    /// writers on Windows sometimes emit backslashes.
    pub fn resolve(&self, entry: &str) -> Result<PathBuf> {
        let rejected = || ExpandError::TraversalRejected {
            entry: entry.to_string(),
        };

        let unified = entry.replace('\\', "/");
        let relative = Path::new(&unified);

        // Absolute names would replace the root on join
        if relative
            .components()
            .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
        {
            return Err(rejected());
        }

        let candidate = normalize_lexically(&self.resolved.join(relative));

        if is_strict_descendant(&self.resolved, &candidate) {
            Ok(candidate)
        } else {
            Err(rejected())
        }
    }
}

/// Resolve `entry` under `root`, rejecting anything that escapes it
pub fn resolve(root: &Path, entry: &str) -> Result<PathBuf> {
    ExtractionRoot::new(root)?.resolve(entry)
}

/// Collapse `.` and `..` components without touching the filesystem
///
/// `..` at the filesystem root stays at the root.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

fn is_strict_descendant(root: &Path, candidate: &Path) -> bool {
    let root_bytes = root.as_os_str().as_encoded_bytes();
    let candidate_bytes = candidate.as_os_str().as_encoded_bytes();

    if !candidate_bytes.starts_with(root_bytes) || candidate_bytes.len() == root_bytes.len() {
        return false;
    }

    // "/music/abc" must not pass as a child of "/music/ab"
    let root_ends_with_separator = root_bytes
        .last()
        .is_some_and(|b| is_separator(char::from(*b)));
    root_ends_with_separator || is_separator(char::from(candidate_bytes[root_bytes.len()]))
}
