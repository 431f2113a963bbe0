//! Configuration file handling
//!
//! `flowmap.json` carries the defaults a team shares between runs: who maps,
//! memo texts, output format, and the rename table applied after joins.

use crate::assemble::Memos;
use crate::cli::OutputFormat;
use crate::error::{FlowmapError, Result};
use crate::merge::MergeSettings;
use crate::schema::{CanonicalField, RenameTable};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "flowmap.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowmapConfig {
    pub version: String,
    pub mapper: Option<String>,
    pub verifier: String,
    pub memos: Memos,
    pub output_format: OutputFormat,
    pub renames: RenameTable,
}

impl Default for FlowmapConfig {
    fn default() -> Self {
        Self {
            version: crate::FORMAT_VERSION.to_string(),
            mapper: None,
            verifier: String::new(),
            memos: Memos::default(),
            output_format: OutputFormat::default(),
            renames: RenameTable::standard(),
        }
    }
}

impl FlowmapConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            FlowmapError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Use `explicit` when given, else `flowmap.json` in `dir` if it exists,
    /// else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Write a default configuration into `dir`; an existing file is kept
    /// unless `force` is set
    pub fn create_default(dir: &Path, force: bool) -> Result<PathBuf> {
        let path = dir.join(CONFIG_FILE_NAME);
        Self::write_default(&path, force)?;
        Ok(path)
    }

    /// Write a default configuration to `path`
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(FlowmapError::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        fs::write(path, serde_json::to_string_pretty(&Self::default())?)?;
        log::info!("Created configuration at {}", path.display());
        Ok(())
    }

    /// Every rename must produce a canonical field name, otherwise the
    /// renamed column would vanish at projection
    pub fn validate(&self) -> Result<()> {
        for (from, to) in self.renames.iter() {
            if CanonicalField::from_name(to).is_none() {
                return Err(FlowmapError::config(format!(
                    "Rename of '{}' targets '{}', which is not a mapping field",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn merge_settings(&self) -> MergeSettings {
        MergeSettings {
            renames: self.renames.clone(),
            verifier: self.verifier.clone(),
            memos: self.memos.clone(),
        }
    }
}
