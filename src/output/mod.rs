//! Output directory layout

pub mod path;

pub use path::{ensure_dir, OutputLayout};

/// Output directory errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
