//! Edge case tests for data-related scenarios

use crate::common::assertions::column;
use crate::common::{sample_data, CliTestRunner};
use flowmap::data::FlowLoader;
use flowmap::FlowmapError;

#[test]
fn test_missing_required_column() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv("source.csv", &[vec!["Flowable", "Context", "Unit"], vec!["water", "air", "kg"]])
        .unwrap();
    runner
        .fixture()
        .create_csv("target.csv", &sample_data::target_flows())
        .unwrap();

    let error = runner.merge("source.csv", "target.csv", "mapping.csv").unwrap_err();
    assert!(matches!(error, FlowmapError::MissingColumn { ref column, .. } if column == "Flow UUID"));
    assert!(!runner.fixture().path("mapping.csv").exists());
}

#[test]
fn test_duplicate_flow_produces_no_output() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv("source.csv", &sample_data::source_flows())
        .unwrap();
    runner
        .fixture()
        .create_csv(
            "target.csv",
            &sample_data::flows(&[["lead", "soil", "1", "kg"], ["lead", "soil", "2", "t"]]),
        )
        .unwrap();

    let error = runner.merge("source.csv", "target.csv", "mapping.csv").unwrap_err();
    match error {
        FlowmapError::DuplicateFlow { list, flowable, context } => {
            assert_eq!(list, "target list");
            assert_eq!(flowable, "lead");
            assert_eq!(context, "soil");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!runner.fixture().path("mapping.csv").exists());
}

#[test]
fn test_quoted_fields_and_unicode_survive() {
    let runner = CliTestRunner::new().unwrap();
    let content = "Flowable,Context,Flow UUID,Unit\n\
                   \"Carbon dioxide, fossil\",émission/air,0001,kg\n\
                   \"Naphthalene \"\"2-methyl\"\"\",排放/水,0002,kg\n";
    runner.fixture().create_raw("source.csv", content).unwrap();
    runner.fixture().create_raw("target.csv", content).unwrap();

    runner.merge("source.csv", "target.csv", "mapping.csv").unwrap();
    let (header, records) = runner.fixture().read_csv("mapping.csv");

    let name = column(&header, "SourceFlowName");
    let context = column(&header, "SourceFlowContext");
    let uuid = column(&header, "SourceFlowUUID");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0][name], "Carbon dioxide, fossil");
    assert_eq!(records[0][context], "émission/air");
    assert_eq!(records[0][uuid], "0001");
    assert_eq!(records[1][name], "Naphthalene \"2-methyl\"");
    assert_eq!(records[1][context], "排放/水");
}

#[test]
fn test_missing_identifiers_fall_back_to_name_context() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_raw(
            "source.csv",
            "Flowable,Context,Flow UUID,Unit\nwater,air,,kg\nsilver,soil,,kg\n",
        )
        .unwrap();
    runner
        .fixture()
        .create_raw(
            "target.csv",
            "Flowable,Context,Flow UUID,Unit\nwater,air,,kg\ngold,soil,,kg\n",
        )
        .unwrap();

    runner.merge("source.csv", "target.csv", "mapping.csv").unwrap();
    let (header, records) = runner.fixture().read_csv("mapping.csv");
    let condition = column(&header, "MatchCondition");

    // Missing identifiers never pair with each other
    assert_eq!(records.len(), 3);
    assert_eq!(records.iter().filter(|r| r[condition] == "=").count(), 1);
    assert_eq!(records.iter().filter(|r| r[condition] == "!").count(), 2);
}

#[test]
fn test_extra_columns_are_not_in_output() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_raw(
            "source.csv",
            "Flowable,Context,Flow UUID,Unit,CAS No\nlead,soil,1,kg,7439-92-1\n",
        )
        .unwrap();
    runner
        .fixture()
        .create_raw(
            "target.csv",
            "Flow UUID,Unit,Flowable,Context,Synonyms\n1,kg,lead,soil,plumbum\n",
        )
        .unwrap();

    runner.merge("source.csv", "target.csv", "mapping.csv").unwrap();
    let (header, records) = runner.fixture().read_csv("mapping.csv");
    assert!(!header.iter().any(|h| h.contains("CAS") || h.contains("Synonyms")));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0][column(&header, "TargetFlowName")], "lead");
}

#[test]
fn test_repeated_identifier_pairs_with_each_flow() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv(
            "source.csv",
            &sample_data::flows(&[["lead", "soil", "1", "kg"], ["lead", "water", "1", "kg"]]),
        )
        .unwrap();
    runner
        .fixture()
        .create_csv("target.csv", &sample_data::flows(&[["lead", "soil", "1", "kg"]]))
        .unwrap();

    runner.merge("source.csv", "target.csv", "mapping.csv").unwrap();
    let (header, records) = runner.fixture().read_csv("mapping.csv");
    let condition = column(&header, "MatchCondition");
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r[condition] == "="));
}

#[test]
fn test_unsupported_input_format() {
    let runner = CliTestRunner::new().unwrap();
    runner.fixture().create_raw("source.xlsx", "not a spreadsheet").unwrap();
    runner
        .fixture()
        .create_csv("target.csv", &sample_data::target_flows())
        .unwrap();

    let error = runner.merge("source.xlsx", "target.csv", "mapping.csv").unwrap_err();
    assert!(error.to_string().contains("Unsupported file format"));
}

#[test]
fn test_nonexistent_input_file() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_csv("target.csv", &sample_data::target_flows())
        .unwrap();

    let error = runner.merge("missing.csv", "target.csv", "mapping.csv").unwrap_err();
    assert!(error.to_string().contains("File not found"));
}

#[test]
fn test_tsv_input() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner
        .fixture()
        .create_raw(
            "flows.tsv",
            "Flowable\tContext\tFlow UUID\tUnit\nsulfur dioxide, low population\tair\t0042\tkg\n",
        )
        .unwrap();

    let loader = FlowLoader::new().unwrap();
    let table = loader.load_flows(&path).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.value(0, "Flowable"), Some("sulfur dioxide, low population"));
    assert_eq!(table.value(0, "Flow UUID"), Some("0042"));
}
