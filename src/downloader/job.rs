//! Download request and per-day task planning

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

use super::config::DEFAULT_CONCURRENCY;
use super::DownloadError;
use crate::source::{DataType, Source};

/// Input date format (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What to download
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest {
    /// Archive to download from
    pub source: Source,
    /// Collector name, validated against the archive's allow-list
    pub collector: String,
    /// Data type in the archive's own spelling (`bview`, `rib`, `updates`, `all`)
    pub data_type: String,
    /// First day, `YYYY-MM-DD`
    pub start_date: String,
    /// Last day (inclusive), `YYYY-MM-DD`
    pub end_date: String,
    /// Root of the output hierarchy
    pub output_root: PathBuf,
    /// Maximum concurrently running day tasks (0 selects the default)
    pub max_concurrency: usize,
}

impl DownloadRequest {
    /// Create a request writing below the current directory with default concurrency
    pub fn new(
        source: Source,
        collector: impl Into<String>,
        data_type: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            source,
            collector: collector.into(),
            data_type: data_type.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            output_root: PathBuf::from("."),
            max_concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the output root
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Set the concurrency bound
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Concurrency bound with 0 mapped to the default
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency == 0 {
            DEFAULT_CONCURRENCY
        } else {
            self.max_concurrency
        }
    }

    /// Parse and check the date range
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), DownloadError> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;
        if start > end {
            return Err(DownloadError::InvalidDateRange(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok((start, end))
    }
}

/// Work unit for a single calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTask {
    /// Collector name
    pub collector: String,
    /// Requested data type
    pub data_type: DataType,
    /// Day to resolve
    pub date: NaiveDate,
    /// Root of the output hierarchy
    pub output_root: PathBuf,
}

/// One task per day in `[start, end]`, in date order
pub fn plan_days(
    collector: &str,
    data_type: DataType,
    start: NaiveDate,
    end: NaiveDate,
    output_root: &std::path::Path,
) -> Vec<DayTask> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| DayTask {
            collector: collector.to_string(),
            data_type,
            date,
            output_root: output_root.to_path_buf(),
        })
        .collect()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, DownloadError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        DownloadError::InvalidDateRange(format!("invalid date '{value}': expected YYYY-MM-DD ({e})"))
    })
}
