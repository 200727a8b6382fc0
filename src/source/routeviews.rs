//! RouteViews archive adapter
//!
//! Layout: `https://archive.routeviews.org/{collector path}/{YYYY.MM}/RIBS/`
//! and `.../UPDATES/` are separate listings. A file's kind follows from the
//! listing it was found on.

use chrono::NaiveDate;
use std::collections::HashMap;

use super::{month_segment, ArchiveSource, DataType, FileKind, IndexQuery, Source, SourceError, SourceResult};
use crate::registry::SourceEntry;

/// Path segment of the snapshot listing
const RIBS_SEGMENT: &str = "RIBS";
/// Path segment of the updates listing
const UPDATES_SEGMENT: &str = "UPDATES";

/// Adapter for RouteViews
#[derive(Debug, Clone)]
pub struct RouteViewsSource {
    base_url: String,
    extension: String,
    collector_paths: HashMap<String, String>,
}

impl RouteViewsSource {
    /// Build from a registry entry
    pub fn from_entry(entry: &SourceEntry) -> Self {
        Self {
            base_url: entry.base_url().trim_end_matches('/').to_string(),
            extension: entry.extension().to_string(),
            collector_paths: entry.collector_paths(),
        }
    }

    /// Create with custom base URL (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Month directory for a collector, or `None` for unknown collectors
    pub fn month_url(&self, collector: &str, date: NaiveDate) -> Option<String> {
        self.collector_paths
            .get(collector)
            .map(|path| format!("{}/{}/{}", self.base_url, path, month_segment(date)))
    }

    fn query(&self, month_url: &str, kind: FileKind) -> IndexQuery {
        let segment = match kind {
            FileKind::Updates => UPDATES_SEGMENT,
            _ => RIBS_SEGMENT,
        };
        IndexQuery {
            url: format!("{month_url}/{segment}"),
            kind: Some(kind),
        }
    }
}

impl ArchiveSource for RouteViewsSource {
    fn source(&self) -> Source {
        Source::RouteViews
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn validate_collector(&self, collector: &str) -> SourceResult<()> {
        if self.collector_paths.contains_key(collector) {
            Ok(())
        } else {
            Err(SourceError::InvalidCollector {
                source_name: Source::RouteViews.name().to_string(),
                collector: collector.to_string(),
            })
        }
    }

    fn parse_data_type(&self, value: &str) -> SourceResult<DataType> {
        match value {
            "rib" => Ok(DataType::Snapshot),
            "updates" => Ok(DataType::Updates),
            "all" => Ok(DataType::All),
            _ => Err(SourceError::InvalidDataType {
                source_name: Source::RouteViews.name().to_string(),
                data_type: value.to_string(),
                accepted: "rib, updates, all".to_string(),
            }),
        }
    }

    fn index_queries(&self, collector: &str, date: NaiveDate, data_type: DataType) -> Vec<IndexQuery> {
        let Some(month_url) = self.month_url(collector, date) else {
            return Vec::new();
        };

        match data_type {
            DataType::Snapshot => vec![self.query(&month_url, FileKind::Snapshot)],
            DataType::Updates => vec![self.query(&month_url, FileKind::Updates)],
            DataType::All => vec![
                self.query(&month_url, FileKind::Snapshot),
                self.query(&month_url, FileKind::Updates),
            ],
        }
    }

    fn bucket(&self, kind: FileKind) -> &'static str {
        match kind {
            FileKind::Snapshot => "ribs",
            FileKind::Updates => "updates",
            FileKind::Unknown => "unknown",
        }
    }
}
