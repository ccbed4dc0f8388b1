//! Library tree maintenance

pub mod merge;

pub use crate::types::MergeStats;
pub use merge::merge;
