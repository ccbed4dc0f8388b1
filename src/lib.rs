//! bandcamp-expand - Unpack storefront music downloads into a library
//!
//! A command-line utility that finds `Artist - Album.zip` downloads,
//! extracts their tracks into `<library>/<FLAC|AAC>/<Artist>/<Album>/`,
//! and deletes each archive once its contents are merged.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `discovery`: Archive scanning and artist/album parsing from file names
//! - `archive`: Codec classification, entry name cleanup, safe extraction
//! - `library`: Merging staged files into the library tree
//! - `pipeline`: Parallel per-archive orchestration
//! - `export`: JSON run report
//!
//! # Example
//!
//! ```no_run
//! use bandcamp_expand::{config::Settings, pipeline};
//!
//! let settings = Settings::default();
//! let report = pipeline::run(&settings).expect("Expansion failed");
//! for name in report.completed() {
//!     println!("Successfully processed: {}", name);
//! }
//! ```

pub mod archive;
pub mod config;
pub mod discovery;
pub mod error;
pub mod export;
pub mod library;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{ExpandError, Result};
pub use types::{ArchiveOutcome, ArchiveRecord, ArchiveStage, CodecKind, MergeStats};
