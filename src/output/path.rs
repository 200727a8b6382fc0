//! On-disk layout of downloaded archive files
//!
//! Every file lands in a four-level hierarchy below the output root:
//! `{root}/{archive}/{bucket}/{collector}/{YYYY.MM}/{file}`
//!
//! # Usage Example
//!
//! ```rust
//! use bgp_archive_downloader::output::OutputLayout;
//! use chrono::NaiveDate;
//! use std::path::{Path, PathBuf};
//!
//! let layout = OutputLayout::new(Path::new("data"));
//! let date = NaiveDate::from_ymd_opt(2014, 3, 1).unwrap();
//! let dir = layout.bucket_dir("ripe", "bview", "rrc00", date);
//! assert_eq!(dir, PathBuf::from("data/ripe/bview/rrc00/2014.03"));
//! ```

use super::{OutputError, OutputResult};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Builds destination directories below an output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Create a layout rooted at `root`
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Output root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for one archive, bucket, collector and month
    ///
    /// Each component is sanitized so a hostile collector or bucket name
    /// cannot escape the root.
    pub fn bucket_dir(&self, archive: &str, bucket: &str, collector: &str, date: NaiveDate) -> PathBuf {
        self.root
            .join(sanitize_component(archive))
            .join(sanitize_component(bucket))
            .join(sanitize_component(collector))
            .join(date.format("%Y.%m").to_string())
    }

    /// Create the output root if it does not exist yet
    pub async fn ensure_root(&self) -> OutputResult<()> {
        ensure_dir(&self.root).await
    }
}

/// Create `dir` and all of its parents
pub async fn ensure_dir(dir: &Path) -> OutputResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| OutputError::IoError(format!("{}: {e}", dir.display())))
}

/// Sanitize one path component for filesystem safety
///
/// - `/`, `\`, `:` → `_`
/// - `..` → `__`
fn sanitize_component(name: &str) -> String {
    name.replace("..", "__").replace(['/', '\\', ':'], "_")
}
