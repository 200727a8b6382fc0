//! CLI command for listing supported archives and collectors

use crate::registry::{CollectorRegistry, SourceEntry};
use crate::source::Source;
use anyhow::{Context, Result};
use clap::Args;
use std::str::FromStr;

use super::OutputFormat;

/// Sources subcommand
#[derive(Debug, Args)]
pub struct SourcesCommand {
    /// Only list this archive (ripe or routeviews)
    #[arg(long)]
    pub source: Option<String>,
}

impl SourcesCommand {
    /// Execute the sources command
    pub fn execute(&self, format: OutputFormat) -> Result<()> {
        let registry = CollectorRegistry::load_embedded()?;
        let entries = self.select(&registry)?;

        match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries)
                        .context("Failed to serialize sources to JSON")?
                );
            }
            OutputFormat::Human => {
                for entry in entries {
                    println!("{} - {}", entry.name(), entry.description());
                    println!("  base url:   {}", entry.base_url());
                    println!("  extension:  .{}", entry.extension());
                    println!("  data types: {}", entry.data_types().join(", "));
                    println!("  collectors:");
                    for collector in entry.collectors() {
                        println!("    {:<10} {}", collector.name(), collector.path());
                    }
                    println!();
                }
            }
        }

        Ok(())
    }

    /// Registry entries matching the `--source` filter
    fn select<'a>(&self, registry: &'a CollectorRegistry) -> Result<Vec<&'a SourceEntry>> {
        match &self.source {
            Some(name) => {
                let source = Source::from_str(name)?;
                Ok(vec![registry.source(source.name())?])
            }
            None => Ok(registry.sources().iter().collect()),
        }
    }
}
