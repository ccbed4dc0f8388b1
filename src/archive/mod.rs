//! Archive handling
//!
//! - `sanitize`: resolves entry names under an extraction root, rejecting traversal
//! - `normalize`: strips label/artist/album noise from entry names
//! - `inspect`: classifies an archive's codec from its entry names
//! - `extract`: writes an archive's entries into a staging directory

pub mod extract;
pub mod inspect;
pub mod normalize;
pub mod sanitize;

pub use extract::Extractor;
pub use inspect::classify;
pub use sanitize::ExtractionRoot;
