//! Archive discovery and file name parsing

pub mod filename;
pub mod scanner;

pub use filename::{parse_album, parse_artist, ParsedName};
pub use scanner::{scan, DiscoveredArchive};
