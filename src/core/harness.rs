//! # Harness Report Module / 测试框架报告模块
//!
//! Reads the structured report the harness prints on standard output.
//! Two line shapes matter for a case named `name`:
//!
//! ```text
//! > name <arguments> = <received>
//!   test case expected: <expected>
//! name: <passed> / <total>
//! ```
//!
//! The first two form one failure record (lines in between are ignored), the
//! last one is the summary. Parsing is line-oriented with exact prefixes, so a
//! received value that itself looks like a summary line does not confuse it.
//!
//! 读取测试框架在标准输出上打印的结构化报告。
//! 对于名为 `name` 的用例，有两种重要的行格式：失败记录（两行）和摘要行。
//! 解析按行进行并使用精确前缀匹配，因此看起来像摘要行的实际值不会造成混淆。

use crate::core::models::Diff;

/// Marker introducing the expected value of a failing assertion.
pub const EXPECTED_MARKER: &str = "test case expected: ";

/// One failing assertion reported by the harness.
/// 测试框架报告的一个失败断言。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub arguments: String,
    pub received: String,
    pub expected: String,
}

/// The `<name>: <passed> / <total>` count line.
/// `<name>: <passed> / <total>` 计数行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub passed: u32,
    pub total: u32,
    /// The line as printed, used as the failure message.
    pub line: String,
}

/// Everything the harness said about one test case.
/// 测试框架关于一个测试用例输出的全部信息。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessReport {
    pub summary: Option<Summary>,
    pub failures: Vec<FailureRecord>,
}

impl HarnessReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Concatenates all failing assertions in report order as
    /// `(expected, received)`, each rendered `name args = value`.
    ///
    /// 按报告顺序将所有失败断言拼接为 `(expected, received)`，
    /// 每一行渲染为 `name args = value`。
    pub fn diff(&self, name: &str) -> Option<Diff> {
        if self.failures.is_empty() {
            return None;
        }
        let render = |value: fn(&FailureRecord) -> &str| {
            self.failures
                .iter()
                .map(|f| format!("{name} {} = {}", f.arguments, value(f)))
                .collect::<Vec<_>>()
                .join("\n")
        };
        Some(Diff {
            expected: render(|f| &f.expected),
            received: render(|f| &f.received),
        })
    }

    /// The summary line, or a synthesized one when the harness printed none.
    pub fn message(&self, name: &str) -> String {
        match &self.summary {
            Some(summary) => summary.line.clone(),
            None => format!("{name}: {} failing assertion(s)", self.failures.len()),
        }
    }
}

/// Parses the harness output for the case called `name`.
/// 解析名为 `name` 的用例的测试框架输出。
pub fn parse_report(name: &str, stdout: &str) -> HarnessReport {
    let failure_prefix = format!("> {name} ");
    let mut report = HarnessReport::default();
    let mut pending: Option<(String, String)> = None;

    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix(&failure_prefix) {
            // A new record starts; an unfinished one before it is dropped.
            pending = rest
                .split_once(" = ")
                .map(|(args, received)| (args.trim().to_string(), received.to_string()));
            continue;
        }

        if line.starts_with("> ") {
            // A record for another case; whatever was pending is incomplete.
            pending = None;
            continue;
        }

        if let Some(index) = line.find(EXPECTED_MARKER) {
            if let Some((arguments, received)) = pending.take() {
                report.failures.push(FailureRecord {
                    arguments,
                    received,
                    expected: line[index + EXPECTED_MARKER.len()..].to_string(),
                });
            }
            continue;
        }

        if report.summary.is_none() {
            report.summary = parse_summary(name, line);
        }
    }

    report
}

fn parse_summary(name: &str, line: &str) -> Option<Summary> {
    let trimmed = line.trim();
    let counts = trimmed.strip_prefix(name)?.strip_prefix(": ")?;
    let (passed, total) = counts.split_once(" / ")?;
    Some(Summary {
        passed: passed.trim().parse().ok()?,
        total: total.trim().parse().ok()?,
        line: trimmed.to_string(),
    })
}
