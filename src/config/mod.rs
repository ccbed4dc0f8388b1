//! Command-line and runtime configuration

pub mod cli;
pub mod settings;

pub use cli::Cli;
pub use settings::{Settings, STAGING_DIR_NAME};
