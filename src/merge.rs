//! The reconciliation pipeline: two flow lists in, one mapping table out
//!
//! Stages run strictly forward: identifier matching, name/context matching
//! on what is left, the unit check on confirmed matches, residue detection
//! for each side, and final assembly.

use crate::assemble::{assemble, MappingTable, Memos, Provenance};
use crate::error::{FlowmapError, Result};
use crate::matching::{match_by_identifier, match_by_name_context};
use crate::residue::detect_residue;
use crate::schema::{
    CanonicalField, FlowAttribute, RenameTable, Side, CONTEXT, FLOWABLE, FLOW_UUID,
    IDENTITY_FACTOR, MATCHED, REQUIRED_COLUMNS,
};
use crate::table::Table;
use crate::units::{find_unit_mismatches, LogSink, ReportSink};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// Names identifying the two nomenclatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNames {
    pub source: String,
    pub target: String,
}

impl ListNames {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }
}

/// Row counts of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub source_flows: usize,
    pub target_flows: usize,
    pub identifier_matches: usize,
    pub name_context_matches: usize,
    pub source_residues: usize,
    pub target_residues: usize,
    pub unit_mismatches: usize,
}

impl MergeSummary {
    pub fn confirmed_matches(&self) -> usize {
        self.identifier_matches + self.name_context_matches
    }

    pub fn total_rows(&self) -> usize {
        self.confirmed_matches() + self.source_residues + self.target_residues
    }
}

/// Mapping table plus the counts that produced it
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub mapping: MappingTable,
    pub summary: MergeSummary,
}

/// Knobs that shape the output but not the matching
#[derive(Debug, Clone, Default)]
pub struct MergeSettings {
    pub renames: RenameTable,
    pub verifier: String,
    pub memos: Memos,
}

/// Runs the matching pipeline with fixed settings
#[derive(Debug, Clone, Default)]
pub struct FlowMerger {
    settings: MergeSettings,
}

impl FlowMerger {
    pub fn new(settings: MergeSettings) -> Self {
        Self { settings }
    }

    /// Reconcile `source` with `target`, stamping the current time
    pub fn run(
        &self,
        source: &Table,
        target: &Table,
        lists: &ListNames,
        author: &str,
        sink: &mut dyn ReportSink,
    ) -> Result<MergeOutcome> {
        self.execute(source, target, lists, self.provenance(Provenance::now(author)), sink)
    }

    /// Same as [`FlowMerger::run`] with an explicit `LastUpdated` stamp
    pub fn run_at(
        &self,
        source: &Table,
        target: &Table,
        lists: &ListNames,
        author: &str,
        last_updated: DateTime<FixedOffset>,
        sink: &mut dyn ReportSink,
    ) -> Result<MergeOutcome> {
        self.execute(
            source,
            target,
            lists,
            self.provenance(Provenance::at(author, last_updated)),
            sink,
        )
    }

    fn provenance(&self, base: Provenance) -> Provenance {
        base.with_verifier(self.settings.verifier.clone())
            .with_memos(self.settings.memos.clone())
    }

    fn execute(
        &self,
        source: &Table,
        target: &Table,
        lists: &ListNames,
        provenance: Provenance,
        sink: &mut dyn ReportSink,
    ) -> Result<MergeOutcome> {
        validate_flow_table(source, &format!("{} list", Side::Source))?;
        validate_flow_table(target, &format!("{} list", Side::Target))?;
        warn_repeated_identifiers(source, Side::Source)?;
        warn_repeated_identifiers(target, Side::Target)?;

        let renames = &self.settings.renames;

        let by_identifier = match_by_identifier(source, target, renames)?;

        let source_rest = source.filter_by_columns(
            &by_identifier,
            &[FLOW_UUID],
            &[FlowAttribute::Uuid.field(Side::Source).name()],
        )?;
        let target_rest = target.filter_by_columns(
            &by_identifier,
            &[FLOW_UUID],
            &[FlowAttribute::Uuid.field(Side::Target).name()],
        )?;
        let by_name_context = match_by_name_context(&source_rest, &target_rest, renames)?;

        let mut confirmed = Table::concat([&by_identifier, &by_name_context]);
        confirmed.fill_column(CanonicalField::MatchCondition.name(), Some(MATCHED.to_string()));
        confirmed.fill_column(
            CanonicalField::ConversionFactor.name(),
            Some(format!("{:?}", IDENTITY_FACTOR)),
        );
        confirmed.fill_column(CanonicalField::SourceListName.name(), Some(lists.source.clone()));
        confirmed.fill_column(CanonicalField::TargetListName.name(), Some(lists.target.clone()));

        let mismatches = find_unit_mismatches(&confirmed);
        sink.unit_mismatches(&mismatches);

        let source_residue = detect_residue(source, &confirmed, lists.get(Side::Source), Side::Source)?;
        let target_residue = detect_residue(target, &confirmed, lists.get(Side::Target), Side::Target)?;

        let data = Table::concat([&confirmed, &source_residue, &target_residue]);
        let mapping = assemble(&data, &provenance)?;

        let summary = MergeSummary {
            source_flows: source.len(),
            target_flows: target.len(),
            identifier_matches: by_identifier.len(),
            name_context_matches: by_name_context.len(),
            source_residues: source_residue.len(),
            target_residues: target_residue.len(),
            unit_mismatches: mismatches.len(),
        };
        log::debug!("Merge summary: {:?}", summary);

        Ok(MergeOutcome { mapping, summary })
    }
}

/// Reconcile two flow lists with default settings, reporting unit
/// mismatches through the log
pub fn merge_flow_lists(
    source: &Table,
    target: &Table,
    source_list_name: &str,
    target_list_name: &str,
    author: &str,
) -> Result<MappingTable> {
    let lists = ListNames::new(source_list_name, target_list_name);
    FlowMerger::default()
        .run(source, target, &lists, author, &mut LogSink)
        .map(|outcome| outcome.mapping)
}

/// Check the input preconditions of one flow list: the required columns
/// exist and no two rows share both `Flowable` and `Context`. `list` names
/// the table in errors.
pub fn validate_flow_table(flows: &Table, list: &str) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        flows.require_column(column, list)?;
    }

    if let Some(duplicate) = flows.first_duplicate(&[FLOWABLE, CONTEXT], list)? {
        let mut values = duplicate.into_iter().map(Option::unwrap_or_default);
        return Err(FlowmapError::DuplicateFlow {
            list: list.to_string(),
            flowable: values.next().unwrap_or_default(),
            context: values.next().unwrap_or_default(),
        });
    }

    Ok(())
}

fn warn_repeated_identifiers(flows: &Table, side: Side) -> Result<()> {
    let repeated = flows.repeated_values(FLOW_UUID, &format!("{} list", side))?;
    if !repeated.is_empty() {
        log::warn!(
            "{} {} identifiers occur on more than one flow (first: {}); each pairing yields its own match",
            repeated.len(),
            side,
            repeated[0]
        );
    }
    Ok(())
}
