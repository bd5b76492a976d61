//! The command extractor adapter against a stand-in parser executable.
//!
//! 使用替身解析器可执行文件测试命令提取器适配器。
#![cfg(unix)]

mod common;

use common::*;
use suite_runner::core::config::ExtractorConfig;
use suite_runner::core::extractor::{CommandExtractor, ExtractError, Extractor};
use suite_runner::core::models::Span;

fn extractor(fixture: &Fixture) -> CommandExtractor {
    CommandExtractor::new(fixture.root().join("bin/extractor").display().to_string(), vec![])
}

#[tokio::test]
async fn extracts_descriptors_in_declaration_order() {
    let fixture = Fixture::new();
    let source = source_with_tests(&["test addOne = f 1", "test addTwo = f 2"]);

    let descriptors = extractor(&fixture).extract(&source).await.unwrap();

    let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["addOne", "addTwo"]);
    assert_eq!(descriptors[0].command, "f 1");
    assert_eq!(descriptors[1].command, "f 2");
    // `main = runTests` sits on line 3; the tests follow the blank line.
    assert_eq!(descriptors[0].span, Span::new(4, 0, 4, 17));
}

#[tokio::test]
async fn identical_input_gives_identical_output() {
    let fixture = Fixture::new();
    let source = source_with_tests(&[PASSING, FAILING]);
    let extractor = extractor(&fixture);

    let first = extractor.extract(&source).await.unwrap();
    let second = extractor.extract(&source).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_source_yields_nothing() {
    let fixture = Fixture::new();
    assert!(extractor(&fixture).extract("").await.unwrap().is_empty());
}

#[tokio::test]
async fn failing_parser_is_a_parse_error() {
    let fixture = Fixture::new();
    let err = extractor(&fixture)
        .extract("test a = f\nsyntax error\n")
        .await
        .unwrap_err();

    match err {
        ExtractError::Parse(detail) => assert!(detail.contains("parse error on input")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn garbage_output_is_a_protocol_error() {
    let fixture = Fixture::new();
    let program = fixture.script("chatty", "#!/bin/sh\ncat >/dev/null\necho 'hello there'\n");

    let err = CommandExtractor::new(program.display().to_string(), vec![])
        .extract("anything")
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractError::Protocol(_)), "{err:?}");
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    let err = CommandExtractor::new("/nonexistent/parser", vec![])
        .extract("x")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Spawn { .. }), "{err:?}");
}

#[tokio::test]
async fn ensure_built_runs_build_only_when_missing() {
    let fixture = Fixture::new();
    let config = ExtractorConfig {
        command: "./parser".to_string(),
        build: Some("sh -c 'touch parser && chmod +x parser'".to_string()),
    };
    let extractor = CommandExtractor::from_config(&config).unwrap();

    assert!(extractor.ensure_built(fixture.root()).await.unwrap());
    assert!(fixture.root().join("parser").exists());
    assert!(!extractor.ensure_built(fixture.root()).await.unwrap());
}

#[tokio::test]
async fn failing_build_is_not_fatal() {
    let fixture = Fixture::new();
    let config = ExtractorConfig {
        command: "./parser".to_string(),
        build: Some("false".to_string()),
    };
    let extractor = CommandExtractor::from_config(&config).unwrap();

    assert!(!extractor.ensure_built(fixture.root()).await.unwrap());
}
