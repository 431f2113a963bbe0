//! Error types for flowmap operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlowmapError>;

#[derive(Error, Debug)]
pub enum FlowmapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Duplicate flow in {list}: Flowable '{flowable}' with Context '{context}' appears more than once")]
    DuplicateFlow {
        list: String,
        flowable: String,
        context: String,
    },

    #[error("Missing column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl FlowmapError {
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    /// Whether this error is a violated input precondition rather than an
    /// environmental failure
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::DuplicateFlow { .. } | Self::MissingColumn { .. })
    }
}
