//! Archive source adapters
//!
//! Each supported archive has one [`ArchiveSource`] implementation that knows
//! its URL layout, collector allow-list, data type spellings and how files are
//! bucketed on disk. Use [`create_source`] to obtain the adapter for a
//! [`Source`].

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::output::OutputLayout;
use crate::registry::{CollectorRegistry, RegistryError};

pub mod ripe;
pub mod routeviews;

pub use ripe::RipeSource;
pub use routeviews::RouteViewsSource;

/// Source adapter errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Unknown archive name
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// Collector is not published by the selected archive
    #[error("invalid collector: {collector} (source {source_name})")]
    InvalidCollector {
        /// Archive name
        source_name: String,
        /// Rejected collector name
        collector: String,
    },

    /// Data type spelling not recognized by the selected archive
    #[error("invalid data type: {data_type} (source {source_name} accepts {accepted})")]
    InvalidDataType {
        /// Archive name
        source_name: String,
        /// Rejected data type
        data_type: String,
        /// Accepted spellings, comma separated
        accepted: String,
    },

    /// Embedded collector registry could not be used
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for source adapter operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Supported archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// RIPE NCC Routing Information Service
    Ripe,
    /// University of Oregon RouteViews
    RouteViews,
}

impl Source {
    /// All supported archives
    pub const ALL: [Source; 2] = [Source::Ripe, Source::RouteViews];

    /// Lowercase archive name, also used as the top-level output directory
    pub fn name(&self) -> &'static str {
        match self {
            Source::Ripe => "ripe",
            Source::RouteViews => "routeviews",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ripe" => Ok(Source::Ripe),
            "routeviews" => Ok(Source::RouteViews),
            _ => Err(SourceError::InvalidSource(s.to_string())),
        }
    }
}

/// What a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Full routing table snapshots (RIPE `bview`, RouteViews `rib`)
    Snapshot,
    /// Incremental update streams
    Updates,
    /// Both of the above, plus anything unclassified
    All,
}

impl DataType {
    /// Whether a file of `kind` belongs to this request
    pub fn includes(&self, kind: FileKind) -> bool {
        match self {
            DataType::All => true,
            DataType::Snapshot => kind == FileKind::Snapshot,
            DataType::Updates => kind == FileKind::Updates,
        }
    }
}

/// Classification of a single archive file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// Routing table snapshot
    Snapshot,
    /// Update stream
    Updates,
    /// Neither could be determined
    Unknown,
}

impl FileKind {
    /// Best-effort classification from the file name alone
    ///
    /// Only used where the index page does not already tell us the kind.
    pub fn sniff(file_name: &str) -> Self {
        if file_name.contains("bview") || file_name.contains("rib") {
            FileKind::Snapshot
        } else if file_name.contains("updates") {
            FileKind::Updates
        } else {
            FileKind::Unknown
        }
    }
}

/// One index page a source wants listed for a given day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexQuery {
    /// Index page URL; file URLs are `{url}/{file_name}`
    pub url: String,
    /// File kind implied by the index, when the archive separates them
    pub kind: Option<FileKind>,
}

/// A file selected for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// File name as listed on the index page
    pub file_name: String,
    /// Absolute download URL
    pub download_url: String,
    /// Classification used for the output bucket
    pub kind: FileKind,
    /// Destination on local disk
    pub local_path: std::path::PathBuf,
}

/// Archive-specific knowledge needed to resolve one day's files
pub trait ArchiveSource: Send + Sync {
    /// Which archive this adapter serves
    fn source(&self) -> Source;

    /// Extension of archive files on the index pages (`gz`, `bz2`)
    fn extension(&self) -> &str;

    /// Reject collectors the archive does not publish
    fn validate_collector(&self, collector: &str) -> SourceResult<()>;

    /// Parse a data type using this archive's spellings
    fn parse_data_type(&self, value: &str) -> SourceResult<DataType>;

    /// Index pages to list for `date`
    fn index_queries(&self, collector: &str, date: NaiveDate, data_type: DataType)
        -> Vec<IndexQuery>;

    /// Output directory name for a file kind
    fn bucket(&self, kind: FileKind) -> &'static str;

    /// Classify a file found on the page produced by `query`
    fn classify(&self, query: &IndexQuery, file_name: &str) -> FileKind {
        query.kind.unwrap_or_else(|| FileKind::sniff(file_name))
    }

    /// Select the files for one day from raw month listings
    ///
    /// `listings` pairs each query with the unfiltered names found on its page.
    /// A file is kept when its name contains the day as `YYYYMMDD` and its kind
    /// is included by `data_type`. Names listed by more than one index are kept
    /// once, at their first occurrence. Names that are not a single plain
    /// path component are skipped.
    fn select_files(
        &self,
        listings: &[(IndexQuery, Arc<Vec<String>>)],
        date: NaiveDate,
        data_type: DataType,
        collector: &str,
        output_root: &Path,
    ) -> Vec<RemoteFile> {
        let day = date.format("%Y%m%d").to_string();
        let layout = OutputLayout::new(output_root);
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for (query, names) in listings {
            for name in names.iter() {
                if !name.contains(&day) {
                    continue;
                }
                if !is_plain_file_name(name) {
                    warn!(
                        file = %name,
                        index = %query.url,
                        "Skipping listed name that is not a plain file name"
                    );
                    continue;
                }
                let kind = self.classify(query, name);
                if !data_type.includes(kind) || !seen.insert(name.clone()) {
                    continue;
                }
                let dir = layout.bucket_dir(self.source().name(), self.bucket(kind), collector, date);
                files.push(RemoteFile {
                    file_name: name.clone(),
                    download_url: format!("{}/{}", query.url, name),
                    kind,
                    local_path: dir.join(name),
                });
            }
        }

        files
    }
}

/// Whether `name` can be joined onto a directory without leaving it
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Create the adapter for `source` from the embedded registry
pub fn create_source(source: Source) -> SourceResult<Box<dyn ArchiveSource>> {
    let registry = CollectorRegistry::load().map_err(|e| SourceError::Registry(e.clone()))?;
    let entry = registry.source(source.name())?;

    match source {
        Source::Ripe => Ok(Box::new(RipeSource::from_entry(entry))),
        Source::RouteViews => Ok(Box::new(RouteViewsSource::from_entry(entry))),
    }
}

/// Month path segment used by both archives (`YYYY.MM`)
pub fn month_segment(date: NaiveDate) -> String {
    date.format("%Y.%m").to_string()
}
