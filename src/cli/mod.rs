//! CLI command implementations

pub mod download;
pub mod error;
pub mod sources;

pub use download::{Cli, Commands, DownloadArgs, OutputFormat};
pub use error::CliError;
pub use sources::SourcesCommand;
