//! # Test Case Extractor Module / 测试用例提取模块
//!
//! Boundary to the language-specific parsing service that turns source text
//! into an ordered list of [`TestDescriptor`]s. The core only depends on the
//! [`Extractor`] trait; [`CommandExtractor`] is the default adapter, talking to
//! an external executable over stdin/stdout with a JSON payload.
//!
//! 与特定语言解析服务之间的边界，将源码文本转换为有序的 [`TestDescriptor`] 列表。
//! 核心只依赖 [`Extractor`] trait；[`CommandExtractor`] 是默认适配器，
//! 通过标准输入/输出以 JSON 格式与外部可执行文件通信。

use serde::Deserialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::core::config::ExtractorConfig;
use crate::core::models::{Span, TestDescriptor};
use crate::infra::command::split_command;

/// Errors raised while extracting test cases from a source file.
/// 从源文件提取测试用例时产生的错误。
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source text could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The extractor printed something that is not a descriptor list.
    #[error("malformed extractor output: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("failed to start extractor `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns source text into test-case descriptors.
///
/// Implementations must be idempotent for identical input, must not mutate
/// shared state, and must return descriptors in top-to-bottom declaration
/// order. An empty list is a valid answer.
pub trait Extractor {
    fn extract(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<Vec<TestDescriptor>, ExtractError>> + Send;
}

/// One record of the extractor's JSON wire format. Rows are 1-indexed.
/// 提取器 JSON 传输格式中的一条记录。行号从 1 开始。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTestCase {
    pub name: String,
    pub row_start: u32,
    pub row_stop: u32,
    pub col_start: u32,
    pub col_stop: u32,
    pub command: String,
}

impl From<RawTestCase> for TestDescriptor {
    fn from(raw: RawTestCase) -> Self {
        TestDescriptor {
            name: raw.name,
            span: Span::new(
                raw.row_start.saturating_sub(1),
                raw.col_start,
                raw.row_stop.saturating_sub(1),
                raw.col_stop,
            ),
            command: raw.command,
        }
    }
}

/// Decodes the extractor's JSON array, preserving element order.
/// 解码提取器输出的 JSON 数组，保持元素顺序。
pub fn decode_descriptors(json: &str) -> Result<Vec<TestDescriptor>, ExtractError> {
    let raw: Vec<RawTestCase> = serde_json::from_str(json)?;
    Ok(raw.into_iter().map(TestDescriptor::from).collect())
}

/// Runs an external executable: source on stdin, JSON descriptors on stdout.
/// 运行外部可执行文件：源码写入标准输入，JSON 描述符从标准输出读取。
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
    build: Option<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            build: None,
        }
    }

    /// Builds an extractor from the `[extractor]` configuration table.
    pub fn from_config(config: &ExtractorConfig) -> anyhow::Result<Self> {
        let (program, args) = split_command(&config.command)?;
        Ok(Self {
            program,
            args,
            build: config.build.clone(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the configured build command if the extractor executable is a
    /// path that does not exist yet. Returns `true` when a build ran and
    /// succeeded. A failing build is logged and reported as `Ok(false)`.
    ///
    /// 如果提取器可执行文件是尚不存在的路径，则运行配置的构建命令。
    /// 构建运行并成功时返回 `true`。构建失败会记录日志并返回 `Ok(false)`。
    pub async fn ensure_built(&self, working_dir: &Path) -> anyhow::Result<bool> {
        let Some(build) = &self.build else {
            return Ok(false);
        };

        let executable = resolve_against(working_dir, &self.program);
        if executable.exists() || !looks_like_path(&self.program) {
            return Ok(false);
        }

        tracing::info!(command = %build, "building extractor");
        let (program, args) = split_command(build)?;
        let status = tokio::process::Command::new(&program)
            .args(&args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .status()
            .await;

        match status {
            Ok(status) if status.success() => Ok(true),
            Ok(status) => {
                tracing::warn!(%status, command = %build, "building extractor failed");
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, command = %build, "building extractor failed");
                Ok(false)
            }
        }
    }
}

impl Extractor for CommandExtractor {
    async fn extract(&self, source: &str) -> Result<Vec<TestDescriptor>, ExtractError> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExtractError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = source.to_owned();
            // Feed stdin concurrently so a chatty extractor can't deadlock on a full pipe.
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    tracing::debug!(error = %e, "extractor closed stdin early");
                }
            });
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(ExtractError::Parse(detail));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        decode_descriptors(stdout.trim())
    }
}

fn looks_like_path(program: &str) -> bool {
    program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') || Path::new(program).exists()
}

fn resolve_against(dir: &Path, program: &str) -> PathBuf {
    let path = Path::new(program);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}
