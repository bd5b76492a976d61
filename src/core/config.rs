//! # Configuration Module / 配置模块
//!
//! Runner settings loaded from a TOML file (`SuiteRunner.toml` by default).
//! Every key is optional; a missing file yields the defaults.
//!
//! 从 TOML 文件（默认 `SuiteRunner.toml`）加载的运行器设置。
//! 所有键都是可选的；文件不存在时使用默认值。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::t;

/// The default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "SuiteRunner.toml";

/// How the patched artifact is handed to the interpreter.
/// 修补后的产物如何交给解释器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// The artifact path is appended as the last argument.
    /// 产物路径作为最后一个参数追加。
    #[default]
    Path,
    /// The artifact contents are written to the interpreter's stdin.
    /// 产物内容写入解释器的标准输入。
    Stdin,
}

/// Settings for the external interpreter that runs patched artifacts.
/// 运行修补产物的外部解释器的设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InterpreterConfig {
    /// Program and leading arguments, split like a shell would.
    /// 程序及其前置参数，按 shell 规则拆分。
    #[serde(default = "default_interpreter")]
    pub command: String,
    #[serde(default)]
    pub input: InputMode,
    /// Wall-clock budget per test case, in milliseconds.
    /// 每个测试用例的挂钟时间预算（毫秒）。
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            command: default_interpreter(),
            input: InputMode::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Settings for the external test-case extraction service.
/// 外部测试用例提取服务的设置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractorConfig {
    #[serde(default = "default_extractor")]
    pub command: String,
    /// Command that builds the extractor when its executable is missing.
    /// 当提取器可执行文件不存在时用于构建它的命令。
    #[serde(default)]
    pub build: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            command: default_extractor(),
            build: None,
        }
    }
}

/// How the entry point of a source file is rewritten for a single case.
/// 如何为单个用例改写源文件的入口点。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PatchConfig {
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// Harness invocation; `{command}` is replaced by the case's command.
    /// 测试框架调用形式；`{command}` 会被替换为用例的命令。
    #[serde(default = "default_harness")]
    pub harness: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            entry_point: default_entry_point(),
            harness: default_harness(),
        }
    }
}

/// Which files belong to the test tree and where artifacts are written.
/// 哪些文件属于测试树，以及产物写入的位置。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Directory names skipped during discovery.
    /// 发现过程中跳过的目录名。
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
    /// Where patched artifacts go. Defaults to the system temp dir.
    /// 修补产物的存放位置。默认为系统临时目录。
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            ignore: default_ignore(),
            artifact_dir: None,
        }
    }
}

/// Represents the entire runner configuration, loaded from a TOML file.
/// 代表从 TOML 文件加载的整个运行器配置。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub patch: PatchConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

fn default_interpreter() -> String {
    "runghc".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_extractor() -> String {
    "parser".to_string()
}

fn default_entry_point() -> String {
    "main".to_string()
}

fn default_harness() -> String {
    "goTest $ {command}".to_string()
}

fn default_extension() -> String {
    "hs".to_string()
}

fn default_ignore() -> Vec<String> {
    [".git", "dist-newstyle", ".stack-work", "target", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Parses a configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RunnerConfig> {
    toml::from_str(content).with_context(|| t!("config.parse_failed").to_string())
}

/// Loads the configuration at `path`. A missing file yields the defaults,
/// any other read or parse failure is an error.
///
/// 加载 `path` 处的配置。文件不存在时返回默认值，
/// 其他读取或解析失败均视为错误。
pub fn load_config(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(RunnerConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    parse_config(&content)
}
