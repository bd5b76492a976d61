//! End-to-end tests of the execution engine against a stand-in interpreter.
//!
//! 使用替身解释器对执行引擎进行端到端测试。
#![cfg(unix)]

mod common;

use common::*;
use std::path::Path;
use std::time::{Duration, Instant};
use suite_runner::core::config::InputMode;
use suite_runner::core::execution::{ExecutionSettings, QueuedCase, run_test_case};
use suite_runner::core::models::{Outcome, OutcomeKind, Span};
use suite_runner::core::tree::{FileId, TestId};

fn queued(file: &Path, name: &str, command: &str, line: u32) -> QueuedCase {
    QueuedCase {
        id: TestId::new(&FileId::from_path(file), name),
        file: file.to_path_buf(),
        name: name.to_string(),
        command: command.to_string(),
        span: Span::new(line, 0, line, 40),
    }
}

fn command_of(test_line: &str) -> &str {
    test_line.split_once(" = ").unwrap().1
}

#[tokio::test]
async fn passing_case_is_passed_and_artifact_removed() {
    let fixture = Fixture::new();
    let file = fixture.source("Tests.hs", &source_with_tests(&[PASSING]));
    let settings = ExecutionSettings::from_config(&fixture.config(5_000)).unwrap();

    let outcome = run_test_case(&queued(&file, "addOne", command_of(PASSING), 4), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Passed, "{outcome:?}");
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn failing_case_carries_diff_and_location() {
    let fixture = Fixture::new();
    let file = fixture.source("Tests.hs", &source_with_tests(&[FAILING]));
    let settings = ExecutionSettings::from_config(&fixture.config(5_000)).unwrap();

    let outcome = run_test_case(&queued(&file, "addTwo", command_of(FAILING), 4), &settings).await;

    let Outcome::Failed {
        message,
        diff,
        location,
        ..
    } = outcome
    else {
        panic!("expected a failure, got {outcome:?}");
    };
    assert_eq!(message, "addTwo: 0 / 1");
    let diff = diff.expect("diff");
    assert_eq!(diff.expected, "addTwo 1 = 3");
    assert_eq!(diff.received, "addTwo 1 = 2");
    let location = location.expect("location");
    assert_eq!(location.file, file);
    assert_eq!(location.span.start_line, 4);
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn timeout_is_failed_and_artifact_removed() {
    let fixture = Fixture::new();
    let file = fixture.source("Tests.hs", &source_with_tests(&[SLOW]));
    let settings = ExecutionSettings::from_config(&fixture.config(300)).unwrap();

    let started = Instant::now();
    let outcome = run_test_case(&queued(&file, "slow", command_of(SLOW), 4), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Failed, "{outcome:?}");
    assert!(outcome.message().unwrap().contains("timeout"));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn missing_entry_point_is_errored_without_spawning() {
    let fixture = Fixture::new();
    let file = fixture.source("NoMain.hs", &format!("module NoMain where\n\n{PASSING}\n"));
    let mut config = fixture.config(5_000);
    config.interpreter.command = "/nonexistent/interpreter".to_string();
    let settings = ExecutionSettings::from_config(&config).unwrap();

    let outcome = run_test_case(&queued(&file, "addOne", command_of(PASSING), 2), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Errored);
    assert!(outcome.message().unwrap().contains("no entry point found"));
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn abnormal_exit_is_errored_with_diagnostics() {
    let fixture = Fixture::new();
    let file = fixture.source("Tests.hs", &source_with_tests(&[CRASHING]));
    let settings = ExecutionSettings::from_config(&fixture.config(5_000)).unwrap();

    let outcome = run_test_case(&queued(&file, "crash", command_of(CRASHING), 4), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Errored);
    assert!(outcome.message().unwrap().contains("interpreter exploded"));
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn unreadable_source_is_errored() {
    let fixture = Fixture::new();
    let file = fixture.src().join("Missing.hs");
    let settings = ExecutionSettings::from_config(&fixture.config(5_000)).unwrap();

    let outcome = run_test_case(&queued(&file, "addOne", "true", 0), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Errored);
    assert!(outcome.message().unwrap().contains("Missing.hs"));
}

#[tokio::test]
async fn missing_interpreter_is_errored_and_cleans_up() {
    let fixture = Fixture::new();
    let file = fixture.source("Tests.hs", &source_with_tests(&[PASSING]));
    let mut config = fixture.config(5_000);
    config.interpreter.command = fixture.root().join("bin/no-such-interpreter").display().to_string();
    let settings = ExecutionSettings::from_config(&config).unwrap();

    let outcome = run_test_case(&queued(&file, "addOne", command_of(PASSING), 4), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Errored);
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn stdin_input_mode_pipes_the_patched_source() {
    let fixture = Fixture::new();
    let file = fixture.source("Tests.hs", &source_with_tests(&[FAILING]));
    let mut config = fixture.config(5_000);
    config.interpreter.command = fixture.root().join("bin/stdin-interpreter").display().to_string();
    config.interpreter.input = InputMode::Stdin;
    let settings = ExecutionSettings::from_config(&config).unwrap();

    let outcome = run_test_case(&queued(&file, "addTwo", command_of(FAILING), 4), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Failed, "{outcome:?}");
    assert_eq!(fixture.leftover_artifacts(), 0);
}

#[tokio::test]
async fn interpreter_runs_in_the_source_directory() {
    let fixture = Fixture::new();
    std::fs::write(fixture.src().join("marker.txt"), "here").unwrap();
    let test = "test cwd = test -f marker.txt && echo 'cwd: 1 / 1'";
    let file = fixture.source("Tests.hs", &source_with_tests(&[test]));
    let settings = ExecutionSettings::from_config(&fixture.config(5_000)).unwrap();

    let outcome = run_test_case(&queued(&file, "cwd", command_of(test), 4), &settings).await;

    assert_eq!(outcome.kind(), OutcomeKind::Passed, "{outcome:?}");
}

#[tokio::test]
async fn source_file_is_never_modified() {
    let fixture = Fixture::new();
    let body = source_with_tests(&[FAILING]);
    let file = fixture.source("Tests.hs", &body);
    let settings = ExecutionSettings::from_config(&fixture.config(5_000)).unwrap();

    run_test_case(&queued(&file, "addTwo", command_of(FAILING), 4), &settings).await;

    assert_eq!(std::fs::read_to_string(&file).unwrap(), body);
}
