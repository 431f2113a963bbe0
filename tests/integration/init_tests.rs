//! Integration tests for `flowmap init`

use crate::common::CliTestRunner;
use flowmap::config::FlowmapConfig;
use flowmap::FlowmapError;

#[test]
fn test_init_writes_loadable_default_config() {
    let runner = CliTestRunner::new().unwrap();
    let path = runner.fixture().arg("flowmap.json");

    runner.expect_success(&["--quiet", "--config", &path, "init"]);

    let config = FlowmapConfig::load(&runner.fixture().path("flowmap.json")).unwrap();
    assert_eq!(config, FlowmapConfig::default());
    assert_eq!(config.version, flowmap::FORMAT_VERSION);
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let runner = CliTestRunner::new().unwrap();
    runner
        .fixture()
        .create_raw("flowmap.json", r#"{"mapper": "kim"}"#)
        .unwrap();
    let path = runner.fixture().arg("flowmap.json");

    let error = runner.expect_failure(&["--quiet", "--config", &path, "init"]);
    assert!(matches!(error, FlowmapError::Config { .. }));
    assert!(runner.fixture().read("flowmap.json").contains("kim"));

    runner.expect_success(&["--quiet", "--config", &path, "init", "--force"]);
    assert!(!runner.fixture().read("flowmap.json").contains("kim"));
}
