//! CLI command handlers, one file per command.

mod chapters;
mod config;
mod download;

pub use chapters::run_chapters;
pub use config::run_config;
pub use download::run_download;
