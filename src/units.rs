//! Unit consistency check on confirmed matches

use crate::schema::{CanonicalField, MATCHED};
use crate::table::Table;
use serde::Serialize;

/// A confirmed match whose two sides declare different units
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitMismatch {
    pub source_flow_name: Option<String>,
    pub source_flow_uuid: Option<String>,
    pub source_flow_context: Option<String>,
    pub source_unit: Option<String>,
    pub target_flow_name: Option<String>,
    pub target_flow_uuid: Option<String>,
    pub target_flow_context: Option<String>,
    pub target_unit: Option<String>,
}

/// Receiver for data-quality findings meant for a human reviewer
pub trait ReportSink {
    fn unit_mismatches(&mut self, mismatches: &[UnitMismatch]);
}

/// Sink that warns through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn unit_mismatches(&mut self, mismatches: &[UnitMismatch]) {
        if mismatches.is_empty() {
            return;
        }
        log::warn!("Inconsistent units on {} matched flows, fix manually", mismatches.len());
        for mismatch in mismatches {
            log::warn!(
                "  {} ({}) [{}] -> {} ({}) [{}]",
                mismatch.source_flow_name.as_deref().unwrap_or(""),
                mismatch.source_flow_uuid.as_deref().unwrap_or(""),
                mismatch.source_unit.as_deref().unwrap_or(""),
                mismatch.target_flow_name.as_deref().unwrap_or(""),
                mismatch.target_flow_uuid.as_deref().unwrap_or(""),
                mismatch.target_unit.as_deref().unwrap_or(""),
            );
        }
    }
}

/// Sink that discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn unit_mismatches(&mut self, _mismatches: &[UnitMismatch]) {}
}

impl ReportSink for Vec<UnitMismatch> {
    fn unit_mismatches(&mut self, mismatches: &[UnitMismatch]) {
        self.extend_from_slice(mismatches);
    }
}

/// Collect the confirmed matches (`MatchCondition = "="`) whose source and
/// target units differ. Residue rows are never inspected. Two missing units
/// count as equal.
pub fn find_unit_mismatches(data: &Table) -> Vec<UnitMismatch> {
    let cell = |row: usize, field: CanonicalField| data.value(row, field.name()).map(str::to_string);

    (0..data.len())
        .filter(|&row| data.value(row, CanonicalField::MatchCondition.name()) == Some(MATCHED))
        .filter(|&row| {
            data.value(row, CanonicalField::SourceUnit.name())
                != data.value(row, CanonicalField::TargetUnit.name())
        })
        .map(|row| UnitMismatch {
            source_flow_name: cell(row, CanonicalField::SourceFlowName),
            source_flow_uuid: cell(row, CanonicalField::SourceFlowUUID),
            source_flow_context: cell(row, CanonicalField::SourceFlowContext),
            source_unit: cell(row, CanonicalField::SourceUnit),
            target_flow_name: cell(row, CanonicalField::TargetFlowName),
            target_flow_uuid: cell(row, CanonicalField::TargetFlowUUID),
            target_flow_context: cell(row, CanonicalField::TargetFlowContext),
            target_unit: cell(row, CanonicalField::TargetUnit),
        })
        .collect()
}
