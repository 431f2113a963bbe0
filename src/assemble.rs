//! Assembly of the final mapping table
//!
//! Takes the concatenated match and residue rows, stamps provenance fields,
//! projects onto the canonical field list and sorts.

use crate::error::{FlowmapError, Result};
use crate::schema::{CanonicalField, MATCHED, UNMATCHED};
use crate::table::Table;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Marker distinguishing confirmed correspondences from residues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchCondition {
    #[serde(rename = "=")]
    Match,
    #[serde(rename = "!")]
    Unmatched,
}

impl MatchCondition {
    pub fn symbol(self) -> &'static str {
        match self {
            MatchCondition::Match => MATCHED,
            MatchCondition::Unmatched => UNMATCHED,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            MATCHED => Some(MatchCondition::Match),
            UNMATCHED => Some(MatchCondition::Unmatched),
            _ => None,
        }
    }
}

/// Free-text memo fields stamped on every row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Memos {
    pub memo_mapper: String,
    pub memo_verifier: String,
    pub memo_source: String,
    pub memo_target: String,
}

impl Default for Memos {
    fn default() -> Self {
        Self {
            memo_mapper: "Automated match".to_string(),
            memo_verifier: String::new(),
            memo_source: String::new(),
            memo_target: String::new(),
        }
    }
}

/// Audit metadata stamped once per run
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub mapper: String,
    pub verifier: String,
    pub last_updated: DateTime<FixedOffset>,
    pub memos: Memos,
}

impl Provenance {
    /// Provenance for `mapper` stamped with the current local time
    pub fn now(mapper: impl Into<String>) -> Self {
        Self::at(mapper, Local::now().fixed_offset())
    }

    pub fn at(mapper: impl Into<String>, last_updated: DateTime<FixedOffset>) -> Self {
        Self {
            mapper: mapper.into(),
            verifier: String::new(),
            last_updated,
            memos: Memos::default(),
        }
    }

    pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.verifier = verifier.into();
        self
    }

    pub fn with_memos(mut self, memos: Memos) -> Self {
        self.memos = memos;
        self
    }

    /// `LastUpdated` text: RFC 3339, microseconds, numeric offset
    pub fn timestamp(&self) -> String {
        self.last_updated.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

/// One row of the mapping table; each field is absent when the
/// corresponding column did not exist or the cell was missing
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MappingRow {
    pub source_list_name: Option<String>,
    pub source_flow_name: Option<String>,
    pub source_flow_uuid: Option<String>,
    pub source_flow_context: Option<String>,
    pub source_unit: Option<String>,
    pub match_condition: Option<MatchCondition>,
    pub conversion_factor: Option<f64>,
    pub target_list_name: Option<String>,
    pub target_flow_name: Option<String>,
    pub target_flow_uuid: Option<String>,
    pub target_flow_context: Option<String>,
    pub target_unit: Option<String>,
    pub mapper: Option<String>,
    pub verifier: Option<String>,
    pub last_updated: Option<String>,
    pub memo_mapper: Option<String>,
    pub memo_verifier: Option<String>,
    pub memo_source: Option<String>,
    pub memo_target: Option<String>,
}

impl MappingRow {
    /// Text rendering of one field, `None` when absent
    pub fn value(&self, field: CanonicalField) -> Option<String> {
        match field {
            CanonicalField::MatchCondition => self.match_condition.map(|c| c.symbol().to_string()),
            CanonicalField::ConversionFactor => self.conversion_factor.map(|f| format!("{:?}", f)),
            _ => self.text(field).cloned().flatten(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.match_condition == Some(MatchCondition::Match)
    }

    fn set(&mut self, field: CanonicalField, raw: Option<&str>) -> Result<()> {
        match field {
            CanonicalField::MatchCondition => {
                self.match_condition = match raw {
                    Some(s) => Some(MatchCondition::parse(s).ok_or_else(|| {
                        FlowmapError::data_processing(format!("Unknown match condition '{}'", s))
                    })?),
                    None => None,
                };
            }
            CanonicalField::ConversionFactor => {
                self.conversion_factor = match raw {
                    Some(s) if !s.is_empty() => Some(s.parse::<f64>().map_err(|_| {
                        FlowmapError::data_processing(format!("Invalid conversion factor '{}'", s))
                    })?),
                    _ => None,
                };
            }
            _ => {
                if let Some(slot) = self.text_mut(field) {
                    *slot = raw.map(str::to_string);
                }
            }
        }
        Ok(())
    }

    fn text(&self, field: CanonicalField) -> Option<&Option<String>> {
        let slot = match field {
            CanonicalField::SourceListName => &self.source_list_name,
            CanonicalField::SourceFlowName => &self.source_flow_name,
            CanonicalField::SourceFlowUUID => &self.source_flow_uuid,
            CanonicalField::SourceFlowContext => &self.source_flow_context,
            CanonicalField::SourceUnit => &self.source_unit,
            CanonicalField::TargetListName => &self.target_list_name,
            CanonicalField::TargetFlowName => &self.target_flow_name,
            CanonicalField::TargetFlowUUID => &self.target_flow_uuid,
            CanonicalField::TargetFlowContext => &self.target_flow_context,
            CanonicalField::TargetUnit => &self.target_unit,
            CanonicalField::Mapper => &self.mapper,
            CanonicalField::Verifier => &self.verifier,
            CanonicalField::LastUpdated => &self.last_updated,
            CanonicalField::MemoMapper => &self.memo_mapper,
            CanonicalField::MemoVerifier => &self.memo_verifier,
            CanonicalField::MemoSource => &self.memo_source,
            CanonicalField::MemoTarget => &self.memo_target,
            CanonicalField::MatchCondition | CanonicalField::ConversionFactor => return None,
        };
        Some(slot)
    }

    fn text_mut(&mut self, field: CanonicalField) -> Option<&mut Option<String>> {
        let slot = match field {
            CanonicalField::SourceListName => &mut self.source_list_name,
            CanonicalField::SourceFlowName => &mut self.source_flow_name,
            CanonicalField::SourceFlowUUID => &mut self.source_flow_uuid,
            CanonicalField::SourceFlowContext => &mut self.source_flow_context,
            CanonicalField::SourceUnit => &mut self.source_unit,
            CanonicalField::TargetListName => &mut self.target_list_name,
            CanonicalField::TargetFlowName => &mut self.target_flow_name,
            CanonicalField::TargetFlowUUID => &mut self.target_flow_uuid,
            CanonicalField::TargetFlowContext => &mut self.target_flow_context,
            CanonicalField::TargetUnit => &mut self.target_unit,
            CanonicalField::Mapper => &mut self.mapper,
            CanonicalField::Verifier => &mut self.verifier,
            CanonicalField::LastUpdated => &mut self.last_updated,
            CanonicalField::MemoMapper => &mut self.memo_mapper,
            CanonicalField::MemoVerifier => &mut self.memo_verifier,
            CanonicalField::MemoSource => &mut self.memo_source,
            CanonicalField::MemoTarget => &mut self.memo_target,
            CanonicalField::MatchCondition | CanonicalField::ConversionFactor => return None,
        };
        Some(slot)
    }
}

/// Final mapping: the canonical fields present in the data, in canonical
/// order, and the sorted rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingTable {
    fields: Vec<CanonicalField>,
    rows: Vec<MappingRow>,
}

impl MappingTable {
    pub fn fields(&self) -> &[CanonicalField] {
        &self.fields
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn count(&self, condition: MatchCondition) -> usize {
        self.rows
            .iter()
            .filter(|row| row.match_condition == Some(condition))
            .count()
    }

    /// Rows as text cells over [`MappingTable::fields`]
    pub fn records(&self) -> impl Iterator<Item = Vec<Option<String>>> + '_ {
        self.rows
            .iter()
            .map(move |row| self.fields.iter().map(|f| row.value(*f)).collect())
    }
}

/// Stamp provenance columns onto `data`, project it onto the canonical
/// fields that exist, and sort by source name, context and unit.
///
/// Canonical columns absent from `data` are omitted without error. The sort
/// is stable and orders missing values last.
pub fn assemble(data: &Table, provenance: &Provenance) -> Result<MappingTable> {
    let mut stamped = data.clone();
    stamp(&mut stamped, provenance);

    let fields: Vec<CanonicalField> = CanonicalField::ALL
        .iter()
        .copied()
        .filter(|field| stamped.has_column(field.name()))
        .collect();
    let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
    let projected = stamped.select(&names);

    let mut rows = Vec::with_capacity(projected.len());
    for cells in projected.rows() {
        let mut row = MappingRow::default();
        for (field, cell) in fields.iter().zip(cells) {
            row.set(*field, cell.as_deref())?;
        }
        rows.push(row);
    }

    rows.sort_by(|a, b| {
        missing_last(&a.source_flow_name, &b.source_flow_name)
            .then_with(|| missing_last(&a.source_flow_context, &b.source_flow_context))
            .then_with(|| missing_last(&a.source_unit, &b.source_unit))
    });

    log::debug!("Assembled {} mapping rows over {} fields", rows.len(), fields.len());
    Ok(MappingTable { fields, rows })
}

fn stamp(data: &mut Table, provenance: &Provenance) {
    let stamps = [
        (CanonicalField::Mapper, provenance.mapper.clone()),
        (CanonicalField::Verifier, provenance.verifier.clone()),
        (CanonicalField::LastUpdated, provenance.timestamp()),
        (CanonicalField::MemoMapper, provenance.memos.memo_mapper.clone()),
        (CanonicalField::MemoSource, provenance.memos.memo_source.clone()),
        (CanonicalField::MemoTarget, provenance.memos.memo_target.clone()),
        (CanonicalField::MemoVerifier, provenance.memos.memo_verifier.clone()),
    ];
    for (field, value) in stamps {
        data.fill_column(field.name(), Some(value));
    }
}

fn missing_last(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
