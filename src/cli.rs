//! Command-line interface for flowmap

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flowmap")]
#[command(about = "Reconcile two elementary flow lists into a mapping table")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./flowmap.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress progress spinners and summaries
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Log level requested by `--verbose` / `--quiet`; verbose wins
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Warn
        } else {
            log::LevelFilter::Info
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default flowmap.json in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Match a source flow list against a target flow list
    Merge {
        /// Source flow list (csv, tsv, parquet, json, jsonl)
        source: PathBuf,

        /// Target flow list (csv, tsv, parquet, json, jsonl)
        target: PathBuf,

        /// Name of the source nomenclature (defaults to the file stem)
        #[arg(long)]
        source_name: Option<String>,

        /// Name of the target nomenclature (defaults to the file stem)
        #[arg(long)]
        target_name: Option<String>,

        /// Mapper recorded on every row (overrides the configured mapper)
        #[arg(long)]
        author: Option<String>,

        /// Output file for the mapping (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format: "csv" or "json"
        #[arg(long, value_parser = OutputFormat::parse)]
        format: Option<OutputFormat>,
    },

    /// Validate that a flow list can be merged
    Check {
        /// Flow list to validate
        input: PathBuf,
    },
}

/// Serialization of the mapping table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'csv' or 'json'", s)),
        }
    }

    /// Format implied by a file extension, if any
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}
