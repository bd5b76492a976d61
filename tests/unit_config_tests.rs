//! # Config Unit Tests / 配置单元测试

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use suite_runner::config::{InputMode, RunnerConfig, load_config};
use suite_runner::core::execution::ExecutionSettings;
use tempfile::tempdir;

const FULL: &str = r#"
language = "zh-CN"

[interpreter]
command = "stack runghc --"
input = "stdin"
timeout_ms = 750

[extractor]
command = "./parser"
build = "ghc parser.hs -o parser"

[patch]
entry_point = "run"
harness = "runOne ({command})"

[workspace]
extension = "lhs"
ignore = ["vendor"]
artifact_dir = "/var/tmp/suite"
"#;

#[test]
fn every_key_is_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SuiteRunner.toml");
    fs::write(&path, FULL).unwrap();

    let config = load_config(&path).unwrap();

    assert_eq!(config.language.as_deref(), Some("zh-CN"));
    assert_eq!(config.interpreter.input, InputMode::Stdin);
    assert_eq!(config.extractor.build.as_deref(), Some("ghc parser.hs -o parser"));
    assert_eq!(config.patch.entry_point, "run");
    assert_eq!(config.workspace.ignore, vec!["vendor".to_string()]);
    assert_eq!(config.workspace.artifact_dir, Some(PathBuf::from("/var/tmp/suite")));

    let settings = ExecutionSettings::from_config(&config).unwrap();
    assert_eq!(settings.program, "stack");
    assert_eq!(settings.args, vec!["runghc".to_string(), "--".to_string()]);
    assert_eq!(settings.timeout, Duration::from_millis(750));
    assert_eq!(settings.harness, "runOne ({command})");
}

#[test]
fn wrong_value_type_is_an_error_with_context() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SuiteRunner.toml");
    fs::write(&path, "[interpreter]\ntimeout_ms = \"fast\"\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("timeout_ms"));
}

#[test]
fn serialized_defaults_load_back_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("SuiteRunner.toml");
    fs::write(&path, toml::to_string_pretty(&RunnerConfig::default()).unwrap()).unwrap();

    assert_eq!(load_config(&path).unwrap(), RunnerConfig::default());
}
