//! Flow list loading using DuckDB

use crate::error::{FlowmapError, Result};
use crate::schema::REQUIRED_COLUMNS;
use crate::table::{Cell, Table};
use duckdb::Connection;
use std::path::Path;

/// Reads flow lists from delimited, Parquet or JSON files into [`Table`]s
pub struct FlowLoader {
    connection: Connection,
}

impl FlowLoader {
    /// Create a loader backed by an in-memory DuckDB connection
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET enable_progress_bar=false", [])?;
        // Row order is part of the output contract
        connection.execute("SET preserve_insertion_order=true", [])?;

        Ok(Self { connection })
    }

    /// Load a flow list and check the required columns exist
    pub fn load_flows(&self, file_path: &Path) -> Result<Table> {
        let table = self.load_table(file_path)?;
        let label = file_path.display().to_string();
        for column in REQUIRED_COLUMNS {
            table.require_column(column, &label)?;
        }
        log::info!("Loaded {} flows from {}", table.len(), file_path.display());
        Ok(table)
    }

    /// Load any supported file with every column read as text
    pub fn load_table(&self, file_path: &Path) -> Result<Table> {
        if !file_path.exists() {
            return Err(FlowmapError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        if !file_path.is_file() {
            return Err(FlowmapError::invalid_input(format!(
                "Path is not a file: {}",
                file_path.display()
            )));
        }

        let reader = Self::reader_expression(file_path)?;
        let create_view_sql = format!("CREATE OR REPLACE VIEW flow_view AS SELECT * FROM {}", reader);

        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| self.convert_duckdb_error(e, file_path))?;

        let columns = self.column_names()?;
        let rows = self.extract_rows(&columns)?;
        Table::from_rows(columns, rows)
    }

    /// DuckDB table function reading `file_path`, chosen by extension
    fn reader_expression(file_path: &Path) -> Result<String> {
        let extension = file_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        let path = sql_string(&file_path.to_string_lossy());

        match extension.as_str() {
            "csv" => Ok(format!(
                "read_csv({}, delim = ',', header = true, all_varchar = true)",
                path
            )),
            "tsv" => Ok(format!(
                "read_csv({}, delim = '\\t', header = true, all_varchar = true)",
                path
            )),
            "parquet" => Ok(format!("read_parquet({})", path)),
            "json" | "jsonl" => Ok(format!("read_json_auto({})", path)),
            _ => Err(FlowmapError::invalid_input(format!(
                "Unsupported file format: {} (expected csv, tsv, parquet, json or jsonl)",
                file_path.display()
            ))),
        }
    }

    /// Convert DuckDB errors to appropriate FlowmapError types
    fn convert_duckdb_error(&self, error: duckdb::Error, file_path: &Path) -> FlowmapError {
        let error_msg = error.to_string();

        if error_msg.contains("CSV Error")
            || error_msg.contains("Could not convert")
            || error_msg.contains("Invalid CSV")
            || error_msg.contains("Unterminated quoted field")
        {
            FlowmapError::invalid_input(format!(
                "Malformed CSV file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("JSON") {
            FlowmapError::invalid_input(format!(
                "Malformed JSON file '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else if error_msg.contains("Permission denied") {
            FlowmapError::invalid_input(format!(
                "Permission denied accessing file: {}",
                file_path.display()
            ))
        } else if error_msg.contains("UTF-8") || error_msg.contains("encoding") {
            FlowmapError::invalid_input(format!(
                "File encoding error '{}': {}",
                file_path.display(),
                error_msg
            ))
        } else {
            FlowmapError::DuckDb(error)
        }
    }

    /// Column names of the current view in their original order
    fn column_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.connection.prepare("DESCRIBE flow_view").map_err(|e| {
            FlowmapError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| FlowmapError::data_processing(format!("Failed to query column info: {}", e)))?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                FlowmapError::data_processing(format!("Failed to process column info row: {}", e))
            })?);
        }

        Ok(columns)
    }

    /// All rows of the current view, every value cast to text
    fn extract_rows(&self, columns: &[String]) -> Result<Vec<Vec<Cell>>> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let select_list = columns
            .iter()
            .map(|c| format!("CAST({} AS VARCHAR)", sql_identifier(c)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {} FROM flow_view", select_list);

        let mut stmt = self.connection.prepare(&sql).map_err(|e| {
            FlowmapError::data_processing(format!("Failed to prepare data extraction query: {}", e))
        })?;

        let column_count = columns.len();
        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    cells.push(row.get::<_, Option<String>>(i)?);
                }
                Ok(cells)
            })
            .map_err(|e| FlowmapError::data_processing(format!("Failed to extract data rows: {}", e)))?;

        let mut data = Vec::new();
        for row in rows {
            data.push(row.map_err(|e| {
                FlowmapError::data_processing(format!("Failed to process data row: {}", e))
            })?);
        }

        Ok(data)
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        Self::reader_expression(file_path).is_ok()
    }
}

/// Quote a string literal for SQL
fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote an identifier for SQL
fn sql_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
