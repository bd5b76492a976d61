//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures shared by discovery and
//! execution: test-case descriptors and their source spans, the reconciliation
//! generation stamp, and the per-case run outcome.
//!
//! 此模块定义了发现与执行阶段共享的核心数据结构：
//! 测试用例描述符及其源码范围、协调代数标记，以及单个用例的运行结果。

use crate::infra::t;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A 0-indexed region of a source file.
/// 源文件中的一个区域（从 0 开始计数）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Display for Span {
    /// Renders the span with 1-based line numbers, the way editors show them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line + 1,
            self.start_col,
            self.end_line + 1,
            self.end_col
        )
    }
}

/// One test case discovered in a source file.
/// Produced fresh by every extraction and never mutated afterwards.
///
/// 在源文件中发现的一个测试用例。
/// 每次提取都会重新生成，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDescriptor {
    /// The test case name, unique within its file by convention.
    /// 测试用例名称，按约定在文件内唯一。
    pub name: String,
    /// Where the declaration lives in the source.
    /// 声明在源码中的位置。
    pub span: Span,
    /// The expression handed to the harness to run this case.
    /// 交给测试框架执行此用例的表达式。
    pub command: String,
}

/// Stamp identifying which reconciliation pass created a tree node.
/// The value is threaded explicitly through reconciliation instead of living
/// in process-wide state.
///
/// 标识哪一次协调过程创建了树节点的标记。
/// 该值在协调过程中显式传递，而不是保存在进程级全局状态中。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the generation that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Expected-vs-received text for a failed case, one line per failing assertion
/// in declaration order. The pair is always stored as `(expected, received)`.
///
/// 失败用例的期望值与实际值文本，每个失败断言占一行，按声明顺序排列。
/// 始终以 `(expected, received)` 的顺序存储。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub expected: String,
    pub received: String,
}

/// Source location attached to a failure for the host's diagnostics gutter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: PathBuf,
    pub span: Span,
}

/// Coarse classification of an [`Outcome`], used for counting and display.
/// [`Outcome`] 的粗粒度分类，用于计数和显示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Passed,
    Failed,
    Errored,
    Skipped,
}

/// The terminal result of running a single test case.
/// Exactly one outcome is reported per case per run request.
///
/// 运行单个测试用例的最终结果。
/// 每个运行请求中，每个用例只报告一个结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Every assertion of the case held.
    /// 用例的所有断言均成立。
    Passed { duration: Duration },
    /// The case ran and produced wrong values, or exceeded its time budget.
    /// 用例运行后产生了错误的值，或超出了时间预算。
    Failed {
        duration: Duration,
        /// Summary line from the harness, or the timeout notice.
        /// 来自测试框架的摘要行，或超时提示。
        message: String,
        /// Present when the harness reported failing assertions.
        /// 当测试框架报告了失败的断言时存在。
        diff: Option<Diff>,
        location: Option<Location>,
    },
    /// The case could not be run: tooling or environment problem.
    /// 用例无法运行：工具或环境问题。
    Errored { duration: Duration, message: String },
    /// The run was cancelled before this case started.
    /// 运行在此用例开始之前被取消。
    Skipped,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Passed { .. } => OutcomeKind::Passed,
            Outcome::Failed { .. } => OutcomeKind::Failed,
            Outcome::Errored { .. } => OutcomeKind::Errored,
            Outcome::Skipped => OutcomeKind::Skipped,
        }
    }

    /// Failed or errored outcomes both make a run unsuccessful.
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. } | Outcome::Errored { .. })
    }

    /// Gets the duration of the outcome. Returns None for skipped cases.
    /// 获取结果的持续时间。对于跳过的用例返回 None。
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Outcome::Passed { duration }
            | Outcome::Failed { duration, .. }
            | Outcome::Errored { duration, .. } => Some(*duration),
            Outcome::Skipped => None,
        }
    }

    /// Gets the message carried by a failed or errored outcome.
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Failed { message, .. } | Outcome::Errored { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Gets the localized status of the outcome for display.
    /// 以本地化字符串形式获取结果状态以供显示。
    pub fn status_str(&self, locale: &str) -> String {
        match self.kind() {
            OutcomeKind::Passed => t!("status.passed", locale = locale).to_string(),
            OutcomeKind::Failed => t!("status.failed", locale = locale).to_string(),
            OutcomeKind::Errored => t!("status.errored", locale = locale).to_string(),
            OutcomeKind::Skipped => t!("status.skipped", locale = locale).to_string(),
        }
    }
}
