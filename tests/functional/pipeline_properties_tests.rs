//! Properties of the reconciliation pipeline over whole flow lists

use chrono::{FixedOffset, TimeZone};
use flowmap::merge::{FlowMerger, ListNames, MergeOutcome};
use flowmap::units::{NullSink, UnitMismatch};
use flowmap::{merge_flow_lists, FlowmapError, MatchCondition, Table};
use std::collections::HashMap;

fn flow_list(rows: &[(&str, &str, &str, &str)]) -> Table {
    Table::from_records(
        rows.iter()
            .map(|(uuid, name, context, unit)| {
                vec![
                    ("Flowable", *name),
                    ("Context", *context),
                    ("Flow UUID", *uuid),
                    ("Unit", *unit),
                ]
            })
            .collect(),
    )
}

fn run(source: &Table, target: &Table) -> MergeOutcome {
    let stamp = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 1, 8, 0, 0)
        .unwrap();
    FlowMerger::default()
        .run_at(source, target, &ListNames::new("src", "tgt"), "tester", stamp, &mut NullSink)
        .unwrap()
}

/// Lists with overlapping identifiers, overlapping names, and flows unique
/// to either side
fn generated_lists(size: usize) -> (Table, Table) {
    let mut source = Vec::new();
    let mut target = Vec::new();
    let mut state: u64 = 7;
    for i in 0..size {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let context = ["air", "water", "soil"][(state >> 33) as usize % 3];
        let name = format!("substance {}", i);
        match (state >> 40) % 4 {
            0 => {
                source.push((format!("id-{}", i), name.clone(), context, "kg"));
                target.push((format!("id-{}", i), format!("{} renamed", name), context, "kg"));
            }
            1 => {
                source.push((format!("s-{}", i), name.clone(), context, "kg"));
                target.push((format!("t-{}", i), name, context, "g"));
            }
            2 => source.push((format!("s-{}", i), name, context, "kg")),
            _ => target.push((format!("t-{}", i), name, context, "kg")),
        }
    }

    let to_table = |rows: &[(String, String, &str, &str)]| {
        let borrowed: Vec<(&str, &str, &str, &str)> = rows
            .iter()
            .map(|(u, n, c, unit)| (u.as_str(), n.as_str(), *c, *unit))
            .collect();
        flow_list(&borrowed)
    };
    (to_table(&source), to_table(&target))
}

fn occurrences<'a>(values: impl Iterator<Item = Option<&'a str>>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for value in values.flatten().filter(|v| !v.is_empty()) {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn test_every_flow_appears_exactly_once() {
    let (source, target) = generated_lists(200);
    let outcome = run(&source, &target);
    let rows = outcome.mapping.rows();

    let source_ids = occurrences(rows.iter().map(|r| r.source_flow_uuid.as_deref()));
    let target_ids = occurrences(rows.iter().map(|r| r.target_flow_uuid.as_deref()));

    assert_eq!(source_ids.len(), source.len());
    assert_eq!(target_ids.len(), target.len());
    assert!(source_ids.values().all(|&n| n == 1));
    assert!(target_ids.values().all(|&n| n == 1));

    assert_eq!(outcome.summary.total_rows(), outcome.mapping.len());
    assert_eq!(
        outcome.mapping.count(MatchCondition::Match),
        outcome.summary.confirmed_matches()
    );
    assert_eq!(
        outcome.mapping.count(MatchCondition::Unmatched),
        outcome.summary.source_residues + outcome.summary.target_residues
    );
    assert_eq!(
        outcome.summary.confirmed_matches() + outcome.summary.source_residues,
        source.len()
    );
    assert_eq!(
        outcome.summary.confirmed_matches() + outcome.summary.target_residues,
        target.len()
    );
}

#[test]
fn test_identifier_match_never_reappears() {
    // Shares an identifier with one target flow and a name/context with another
    let source = flow_list(&[("1", "benzene", "air", "kg")]);
    let target = flow_list(&[("1", "benzol", "air", "kg"), ("2", "benzene", "air", "kg")]);

    let outcome = run(&source, &target);
    assert_eq!(outcome.summary.identifier_matches, 1);
    assert_eq!(outcome.summary.name_context_matches, 0);
    assert_eq!(outcome.summary.source_residues, 0);
    assert_eq!(outcome.summary.target_residues, 1);

    let source_rows: Vec<_> = outcome
        .mapping
        .rows()
        .iter()
        .filter(|r| r.source_flow_uuid.as_deref() == Some("1"))
        .collect();
    assert_eq!(source_rows.len(), 1);
    assert_eq!(source_rows[0].target_flow_name.as_deref(), Some("benzol"));
}

#[test]
fn test_matching_is_idempotent() {
    let (source, target) = generated_lists(60);
    let first = run(&source, &target);
    let second = run(&source, &target);
    assert_eq!(first.mapping, second.mapping);
    assert_eq!(first.summary, second.summary);
}

#[test]
fn test_only_timestamp_varies_between_runs() {
    let source = flow_list(&[("1", "foo", "air", "kg")]);
    let lists = ListNames::new("a", "b");
    let merger = FlowMerger::default();
    let early = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let late = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

    let first = merger.run_at(&source, &source, &lists, "x", early, &mut NullSink).unwrap();
    let second = merger.run_at(&source, &source, &lists, "x", late, &mut NullSink).unwrap();

    let mut a = first.mapping.rows()[0].clone();
    let mut b = second.mapping.rows()[0].clone();
    assert_ne!(a.last_updated, b.last_updated);
    a.last_updated = None;
    b.last_updated = None;
    assert_eq!(a, b);
}

#[test]
fn test_duplicate_target_flow_fails_before_output() {
    let source = flow_list(&[("1", "foo", "air", "kg")]);
    let target = flow_list(&[("1", "foo", "air", "kg"), ("2", "foo", "air", "t")]);

    let err = merge_flow_lists(&source, &target, "a", "b", "x").unwrap_err();
    assert!(matches!(err, FlowmapError::DuplicateFlow { .. }));
}

#[test]
fn test_identifier_example() {
    let source = flow_list(&[("1", "foo", "air", "kg")]);
    let target = flow_list(&[("1", "foo", "air", "kg")]);

    let mapping = merge_flow_lists(&source, &target, "a", "b", "x").unwrap();
    assert_eq!(mapping.len(), 1);
    let row = &mapping.rows()[0];
    assert_eq!(row.source_flow_uuid.as_deref(), Some("1"));
    assert_eq!(row.target_flow_uuid.as_deref(), Some("1"));
    assert_eq!(row.match_condition, Some(MatchCondition::Match));
}

#[test]
fn test_unit_mismatch_is_reported_not_blocking() {
    let source = flow_list(&[("a", "fish", "air", "kg")]);
    let target = flow_list(&[("b", "fish", "air", "g")]);

    let mut reported: Vec<UnitMismatch> = Vec::new();
    let stamp = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let outcome = FlowMerger::default()
        .run_at(&source, &target, &ListNames::new("a", "b"), "x", stamp, &mut reported)
        .unwrap();

    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].source_unit.as_deref(), Some("kg"));
    assert_eq!(reported[0].target_unit.as_deref(), Some("g"));

    let row = &outcome.mapping.rows()[0];
    assert_eq!(row.match_condition, Some(MatchCondition::Match));
    assert_eq!(row.source_unit.as_deref(), Some("kg"));
    assert_eq!(row.target_unit.as_deref(), Some("g"));
}

#[test]
fn test_residue_example() {
    let source = flow_list(&[("1", "lead", "soil", "kg")]);
    let target = Table::new(["Flowable", "Context", "Flow UUID", "Unit"]);

    let outcome = run(&source, &target);
    assert_eq!(outcome.mapping.len(), 1);
    let row = &outcome.mapping.rows()[0];
    assert_eq!(row.match_condition, Some(MatchCondition::Unmatched));
    assert_eq!(row.source_flow_name.as_deref(), Some("lead"));
    assert_eq!(row.target_flow_name.as_deref(), Some(""));
    assert_eq!(row.conversion_factor, None);
}

#[test]
fn test_output_sorted_by_source_name_context_unit() {
    let (source, target) = generated_lists(80);
    let outcome = run(&source, &target);

    let keys: Vec<(String, String, String)> = outcome
        .mapping
        .rows()
        .iter()
        .map(|r| {
            (
                r.source_flow_name.clone().unwrap_or_default(),
                r.source_flow_context.clone().unwrap_or_default(),
                r.source_unit.clone().unwrap_or_default(),
            )
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}
