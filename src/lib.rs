//! # flowmap
//!
//! Reconciles two elementary flow lists into a mapping table: flows are
//! matched by identifier first, then by name and context, and everything
//! left over on either side is reported as unmatched.

pub mod cli;
pub mod error;
pub mod schema;
pub mod table;
pub mod matching;
pub mod residue;
pub mod units;
pub mod assemble;
pub mod merge;
pub mod config;
pub mod data;
pub mod commands;
pub mod output;
pub mod progress;

pub use assemble::{MappingTable, MatchCondition};
pub use error::{FlowmapError, Result};
pub use merge::{merge_flow_lists, FlowMerger, ListNames};
pub use table::Table;

/// Current format version for flowmap configuration files
pub const FORMAT_VERSION: &str = "1.0.0";
