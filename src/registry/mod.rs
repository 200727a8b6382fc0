//! Collector registry for the supported BGP archives
//!
//! The registry is embedded at compile time and lists, for each archive, its
//! base URL, archive file extension, recognized data types and the collectors
//! it publishes together with their path below the base URL.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Embedded registry data
const REGISTRY_JSON: &str = include_str!("collectors.json");

/// Global registry instance (loaded once)
static REGISTRY: Lazy<Result<CollectorRegistry, RegistryError>> =
    Lazy::new(|| CollectorRegistry::from_json(REGISTRY_JSON));

/// Registry of archives and their collectors
#[derive(Debug, Clone)]
pub struct CollectorRegistry {
    #[allow(dead_code)]
    schema_version: String,
    #[allow(dead_code)]
    last_updated: String,
    sources: Vec<SourceEntry>,
}

impl CollectorRegistry {
    /// Load the embedded registry
    ///
    /// This is a singleton operation - the registry is loaded once and cached.
    pub fn load() -> Result<&'static Self, &'static RegistryError> {
        REGISTRY.as_ref()
    }

    /// Load embedded registry, returning an owned copy
    pub fn load_embedded() -> Result<Self, RegistryError> {
        Self::from_json(REGISTRY_JSON)
    }

    /// Parse registry from JSON string
    fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawRegistry = serde_json::from_str(json)
            .map_err(|e| RegistryError::ParseError(format!("Failed to parse registry: {e}")))?;

        for source in &raw.sources {
            if source.collectors.is_empty() {
                return Err(RegistryError::ParseError(format!(
                    "Source {} lists no collectors",
                    source.name
                )));
            }
        }

        Ok(Self {
            schema_version: raw.schema_version,
            last_updated: raw.last_updated,
            sources: raw.sources,
        })
    }

    /// All archive entries, in registry order
    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    /// Look up an archive by its lowercase name (`ripe`, `routeviews`)
    pub fn source(&self, name: &str) -> Result<&SourceEntry, RegistryError> {
        self.sources
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::NotFound(format!("Source {name} not found in registry")))
    }
}

/// A single archive in the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    name: String,
    description: String,
    base_url: String,
    extension: String,
    data_types: Vec<String>,
    collectors: Vec<CollectorEntry>,
}

impl SourceEntry {
    /// Archive name used on the command line and in output paths
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Base URL of the archive, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// File extension of archive files listed in the index pages
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Data type spellings accepted for this archive
    pub fn data_types(&self) -> &[String] {
        &self.data_types
    }

    /// Collectors published by this archive
    pub fn collectors(&self) -> &[CollectorEntry] {
        &self.collectors
    }

    /// Find a collector by name
    pub fn collector(&self, name: &str) -> Option<&CollectorEntry> {
        self.collectors.iter().find(|c| c.name == name)
    }

    /// Collector name to archive path mapping
    pub fn collector_paths(&self) -> HashMap<String, String> {
        self.collectors
            .iter()
            .map(|c| (c.name.clone(), c.path.clone()))
            .collect()
    }
}

/// A collector and its path below the archive base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorEntry {
    name: String,
    path: String,
}

impl CollectorEntry {
    /// Collector name as accepted on the command line
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the collector's monthly directories below the base URL
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Raw registry structure for deserialization
#[derive(Debug, Deserialize)]
struct RawRegistry {
    schema_version: String,
    last_updated: String,
    sources: Vec<SourceEntry>,
}

/// Errors that can occur when working with the registry
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    /// Failed to parse registry JSON
    #[error("registry parse error: {0}")]
    ParseError(String),

    /// Source not found in registry
    #[error("not found: {0}")]
    NotFound(String),
}
