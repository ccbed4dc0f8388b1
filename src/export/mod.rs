//! Run report export

pub mod json;

pub use json::{read_json, write_json, RunReportJson};
