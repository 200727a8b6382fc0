//! RIPE RIS archive adapter
//!
//! Layout: `https://data.ris.ripe.net/{collector}/{YYYY.MM}/` is a single
//! listing holding both `bview.*.gz` snapshots and `updates.*.gz` streams.

use chrono::NaiveDate;
use std::collections::HashSet;

use super::{month_segment, ArchiveSource, DataType, FileKind, IndexQuery, Source, SourceError, SourceResult};
use crate::registry::SourceEntry;

const RIPE_BASE_URL: &str = "https://data.ris.ripe.net";

/// Adapter for RIPE RIS
#[derive(Debug, Clone)]
pub struct RipeSource {
    base_url: String,
    extension: String,
    collectors: HashSet<String>,
}

impl RipeSource {
    /// Build from a registry entry
    pub fn from_entry(entry: &SourceEntry) -> Self {
        Self {
            base_url: entry.base_url().trim_end_matches('/').to_string(),
            extension: entry.extension().to_string(),
            collectors: entry
                .collectors()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
        }
    }

    /// Create with custom base URL (for testing)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Index page for a collector and month
    pub fn month_url(&self, collector: &str, date: NaiveDate) -> String {
        format!("{}/{}/{}", self.base_url, collector, month_segment(date))
    }
}

impl Default for RipeSource {
    fn default() -> Self {
        Self {
            base_url: RIPE_BASE_URL.to_string(),
            extension: "gz".to_string(),
            collectors: (0..=26).map(|n| format!("rrc{n:02}")).collect(),
        }
    }
}

impl ArchiveSource for RipeSource {
    fn source(&self) -> Source {
        Source::Ripe
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn validate_collector(&self, collector: &str) -> SourceResult<()> {
        if self.collectors.contains(collector) {
            Ok(())
        } else {
            Err(SourceError::InvalidCollector {
                source_name: Source::Ripe.name().to_string(),
                collector: collector.to_string(),
            })
        }
    }

    fn parse_data_type(&self, value: &str) -> SourceResult<DataType> {
        match value {
            "bview" => Ok(DataType::Snapshot),
            "updates" => Ok(DataType::Updates),
            "all" => Ok(DataType::All),
            _ => Err(SourceError::InvalidDataType {
                source_name: Source::Ripe.name().to_string(),
                data_type: value.to_string(),
                accepted: "bview, updates, all".to_string(),
            }),
        }
    }

    fn index_queries(&self, collector: &str, date: NaiveDate, _data_type: DataType) -> Vec<IndexQuery> {
        // One combined listing; the data type filter is applied per file name.
        vec![IndexQuery {
            url: self.month_url(collector, date),
            kind: None,
        }]
    }

    fn bucket(&self, kind: FileKind) -> &'static str {
        match kind {
            FileKind::Snapshot => "bview",
            FileKind::Updates => "updates",
            FileKind::Unknown => "unknown",
        }
    }
}
