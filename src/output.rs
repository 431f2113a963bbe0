//! Output formatting utilities

use crate::assemble::MappingTable;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::merge::MergeSummary;
use crate::schema::CanonicalField;
use crate::units::{ReportSink, UnitMismatch};
use indexmap::IndexMap;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Pretty printer for flowmap output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print the row counts of a merge
    pub fn print_merge_summary(summary: &MergeSummary, lists: (&str, &str)) {
        println!("🔗 Flow mapping: {} → {}", lists.0, lists.1);
        println!("├─ Source flows: {}", summary.source_flows);
        println!("├─ Target flows: {}", summary.target_flows);
        println!("├─ ✅ Matched by UUID: {}", summary.identifier_matches);
        println!("├─ ✅ Matched by name and context: {}", summary.name_context_matches);
        println!("├─ ❌ Source flows without match: {}", summary.source_residues);
        println!("├─ ❌ Target flows without match: {}", summary.target_residues);
        if summary.unit_mismatches > 0 {
            println!("└─ ⚠️  Unit mismatches: {}", summary.unit_mismatches);
        } else {
            println!("└─ ✅ Units: consistent");
        }
    }

    /// Print matched flows whose units disagree
    pub fn print_unit_mismatches(mismatches: &[UnitMismatch]) {
        if mismatches.is_empty() {
            return;
        }

        println!("⚠️  Inconsistent units, fix manually:");
        for (i, mismatch) in mismatches.iter().enumerate() {
            let prefix = if i == mismatches.len() - 1 { "└─" } else { "├─" };
            println!(
                "{} {} [{}] ({}) {} → {} [{}] ({}) {}",
                prefix,
                text(&mismatch.source_flow_name),
                text(&mismatch.source_flow_context),
                text(&mismatch.source_flow_uuid),
                text(&mismatch.source_unit),
                text(&mismatch.target_flow_name),
                text(&mismatch.target_flow_context),
                text(&mismatch.target_flow_uuid),
                text(&mismatch.target_unit),
            );
        }
    }

    /// Print the result of validating one flow list
    pub fn print_check_result(path: &Path, rows: usize, columns: &[String]) {
        println!("✅ {} can be merged", path.display());
        println!("├─ Flows: {}", rows);
        println!("└─ Columns: {}", columns.join(", "));
    }
}

/// Report sink that prints mismatches for a human reviewer
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub reported: usize,
}

impl ReportSink for ConsoleSink {
    fn unit_mismatches(&mut self, mismatches: &[UnitMismatch]) {
        self.reported += mismatches.len();
        PrettyPrinter::print_unit_mismatches(mismatches);
    }
}

/// Writes mapping tables as CSV or JSON
pub struct MappingWriter;

impl MappingWriter {
    /// Write to `path` in the given format
    pub fn write_to_path(mapping: &MappingTable, path: &Path, format: OutputFormat) -> Result<()> {
        let file = File::create(path)?;
        Self::write(mapping, BufWriter::new(file), format)?;
        log::info!("Wrote {} mapping rows to {}", mapping.len(), path.display());
        Ok(())
    }

    pub fn write<W: Write>(mapping: &MappingTable, writer: W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => Self::write_csv(mapping, writer),
            OutputFormat::Json => Self::write_json(mapping, writer),
        }
    }

    /// Header of canonical field names, missing values as empty fields
    pub fn write_csv<W: Write>(mapping: &MappingTable, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(mapping.fields().iter().map(|f| f.name()))?;
        for record in mapping.records() {
            csv_writer.write_record(record.iter().map(|v| v.as_deref().unwrap_or("")))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Array of objects keyed by canonical field name, missing values as null
    pub fn write_json<W: Write>(mapping: &MappingTable, mut writer: W) -> Result<()> {
        let rows: Vec<IndexMap<&str, Value>> = mapping
            .rows()
            .iter()
            .map(|row| {
                mapping
                    .fields()
                    .iter()
                    .map(|field| {
                        let value = match (*field, row.conversion_factor) {
                            (CanonicalField::ConversionFactor, Some(factor)) => {
                                Value::from(factor)
                            }
                            _ => row.value(*field).map(Value::String).unwrap_or(Value::Null),
                        };
                        (field.name(), value)
                    })
                    .collect()
            })
            .collect();

        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
