//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! Runs one test case: read its file, patch the entry point to invoke the
//! harness on the case's command, write the patched artifact to a private
//! temporary path, run the interpreter under a timeout, and classify what it
//! printed. The artifact is removed on every exit path.
//!
//! 运行一个测试用例：读取其文件，修补入口点以通过测试框架调用用例命令，
//! 将修补后的产物写入私有临时路径，在超时限制内运行解释器，并对输出进行分类。
//! 产物在所有退出路径上都会被删除。

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::core::config::{InputMode, RunnerConfig};
use crate::core::harness;
use crate::core::models::{Location, Outcome, Span};
use crate::core::patch;
use crate::infra::command::{self, ProcessOutput, Termination, split_command};
use crate::infra::fs::ArtifactFile;
use crate::infra::t;

/// Everything the engine needs to run one test case. Detached from the tree
/// so execution never touches tree state.
///
/// 引擎运行一个测试用例所需的全部信息。与测试树分离，因此执行过程不会触及树的状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedCase {
    pub id: crate::core::tree::TestId,
    pub file: PathBuf,
    pub name: String,
    pub command: String,
    pub span: Span,
}

/// Interpreter and patching settings resolved from the configuration.
/// 从配置中解析出的解释器与修补设置。
#[derive(Debug, Clone)]
pub struct ExecutionSettings {
    pub program: String,
    pub args: Vec<String>,
    pub input: InputMode,
    pub timeout: Duration,
    pub entry_point: String,
    pub harness: String,
    pub artifact_dir: Option<PathBuf>,
}

impl ExecutionSettings {
    pub fn from_config(config: &RunnerConfig) -> Result<Self> {
        let (program, args) = split_command(&config.interpreter.command)?;
        Ok(Self {
            program,
            args,
            input: config.interpreter.input,
            timeout: Duration::from_millis(config.interpreter.timeout_ms),
            entry_point: config.patch.entry_point.clone(),
            harness: config.patch.harness.clone(),
            artifact_dir: config.workspace.artifact_dir.clone(),
        })
    }
}

/// Environment and tooling failures while running a case. Each one becomes an
/// [`Outcome::Errored`] for that case alone.
///
/// 运行用例时的环境与工具错误。每个错误只会使该用例的结果变为 [`Outcome::Errored`]。
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to read {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    EntryPointNotFound(String),

    #[error("failed to write patched artifact: {0}")]
    WriteArtifact(#[source] std::io::Error),

    #[error("failed to run interpreter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// The main entry point for running a single test case. Never fails: every
/// problem is folded into the returned [`Outcome`].
///
/// 运行单个测试用例的主入口。永远不会失败：所有问题都会被折叠进返回的 [`Outcome`]。
pub async fn run_test_case(case: &QueuedCase, settings: &ExecutionSettings) -> Outcome {
    let start = Instant::now();
    match execute(case, settings).await {
        Ok((output, duration)) => classify(case, output, duration, settings.timeout),
        Err(e) => {
            tracing::warn!(case = %case.id, error = %e, "test case errored");
            Outcome::Errored {
                duration: start.elapsed(),
                message: t!("run.error_testing", name = &case.name, error = e).to_string(),
            }
        }
    }
}

async fn execute(case: &QueuedCase, settings: &ExecutionSettings) -> Result<(ProcessOutput, Duration), ExecutionError> {
    let start = Instant::now();

    let source = tokio::fs::read_to_string(&case.file)
        .await
        .map_err(|source| ExecutionError::ReadSource {
            path: case.file.clone(),
            source,
        })?;

    let invocation = patch::harness_invocation(&settings.harness, &case.command);
    let patched = patch::patch_entry_point(&source, &settings.entry_point, &invocation).ok_or_else(|| {
        ExecutionError::EntryPointNotFound(t!("run.no_entry_point", entry = &settings.entry_point).to_string())
    })?;

    let extension = case.file.extension().and_then(|e| e.to_str());
    let artifact = ArtifactFile::create(settings.artifact_dir.as_deref(), extension, &patched)
        .map_err(ExecutionError::WriteArtifact)?;
    tracing::debug!(case = %case.id, artifact = %artifact.path().display(), "wrote patched artifact");

    let result = invoke(case, settings, artifact.path(), &patched).await;

    if let Err(e) = artifact.close() {
        tracing::warn!(case = %case.id, error = %e, "failed to remove patched artifact");
    }

    result.map(|output| (output, start.elapsed()))
}

async fn invoke(
    case: &QueuedCase,
    settings: &ExecutionSettings,
    artifact: &Path,
    patched: &str,
) -> Result<ProcessOutput, ExecutionError> {
    let mut cmd = tokio::process::Command::new(&settings.program);
    cmd.args(&settings.args);
    if let Some(dir) = case.file.parent().filter(|d| !d.as_os_str().is_empty()) {
        cmd.current_dir(dir);
    }

    let stdin = match settings.input {
        InputMode::Path => {
            cmd.arg(artifact);
            None
        }
        InputMode::Stdin => Some(patched.to_string()),
    };

    command::run_with_timeout(cmd, stdin, settings.timeout)
        .await
        .map_err(|source| ExecutionError::Spawn {
            program: settings.program.clone(),
            source,
        })
}

/// Maps a finished interpreter run to an outcome.
///
/// - killed by the timeout → `Failed` with a timeout message
/// - non-zero or abnormal exit → `Errored` with the captured diagnostics
/// - normal exit → `Passed` if the harness reported no failing assertion,
///   otherwise `Failed` with the expected/received diff and the case location
///
/// 将一次已结束的解释器运行映射为结果。
pub fn classify(case: &QueuedCase, output: ProcessOutput, duration: Duration, timeout: Duration) -> Outcome {
    let status = match output.termination {
        Termination::TimedOut => {
            tracing::info!(case = %case.id, ?timeout, "test case timed out");
            return Outcome::Failed {
                duration,
                message: t!("run.timeout", name = &case.name, timeout = timeout.as_millis()).to_string(),
                diff: None,
                location: Some(location(case)),
            };
        }
        Termination::Exited(status) => status,
    };

    if !status.success() {
        let detail = [output.stderr.trim(), output.stdout.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        let error = format!("{status}\n{detail}");
        return Outcome::Errored {
            duration,
            message: t!("run.error_testing", name = &case.name, error = error.trim_end()).to_string(),
        };
    }

    let report = harness::parse_report(&case.name, &output.stdout);
    if report.passed() {
        Outcome::Passed { duration }
    } else {
        Outcome::Failed {
            duration,
            message: report.message(&case.name),
            diff: report.diff(&case.name),
            location: Some(location(case)),
        }
    }
}

fn location(case: &QueuedCase) -> Location {
    Location {
        file: case.file.clone(),
        span: case.span,
    }
}
