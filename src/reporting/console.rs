//! # Console Reporting Module / 控制台报告模块
//!
//! This module renders test trees and run progress in the console with
//! colours and localised messages.
//!
//! 此模块以彩色和本地化消息在控制台中呈现测试树和运行进度。

use colored::*;

use crate::core::models::Outcome;
use crate::core::run::RunSummary;
use crate::core::tree::{TestId, TestTree};
use crate::infra::t;
use crate::reporting::events::RunObserver;

/// Prints each case's terminal status as it arrives. Transcript lines
/// ("Running ..." / "Completed ...") are shown only when `show_output` is set.
///
/// 在每个用例结束时打印其最终状态。只有设置 `show_output` 时才显示运行记录行。
pub struct ConsoleReporter {
    locale: String,
    show_output: bool,
}

impl ConsoleReporter {
    pub fn new(locale: &str, show_output: bool) -> Self {
        Self {
            locale: locale.to_string(),
            show_output,
        }
    }
}

impl RunObserver for ConsoleReporter {
    fn finished(&self, id: &TestId, outcome: &Outcome) {
        let status = outcome.status_str(&self.locale);
        let status = match outcome {
            Outcome::Passed { .. } => status.green(),
            Outcome::Failed { .. } => status.red(),
            Outcome::Errored { .. } => status.magenta(),
            Outcome::Skipped => status.dimmed(),
        };
        let duration = outcome
            .duration()
            .map(|d| format!("{:.2?}", d))
            .unwrap_or_else(|| "N/A".to_string());

        println!("  - {:<10} | {:<60} | {:>10}", status, id, duration);
    }

    fn append_output(&self, line: &str) {
        if self.show_output {
            println!("{}", line.dimmed());
        }
    }
}

/// Prints the files of the tree with their errors and test cases.
///
/// 打印树中的文件及其错误和测试用例。
///
/// # Output Format / 输出格式
/// ```text
/// Tests.hs  (/work/Tests.hs)
///   - addOne                      line 12
///   - addTwo                      line 15
/// Broken.hs  (/work/Broken.hs)
///   ! parse error on input `='
/// ```
pub fn print_tree(tree: &TestTree) {
    for file in tree.files() {
        println!("{}  {}", file.label.bold(), format!("({})", file.path.display()).dimmed());
        if let Some(error) = &file.error {
            println!("  {} {}", "!".red().bold(), error.red());
        }
        for case in file.cases() {
            println!(
                "  - {:<40} {}",
                case.name.cyan(),
                t!("list.line", line = case.span.start_line + 1)
            );
        }
    }
}

/// Prints the totals of a finished run.
/// 打印已完成运行的统计数据。
pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", t!("run.summary_banner").bold());
    println!(
        "{}",
        t!(
            "run.summary_counts",
            total = summary.total(),
            passed = summary.passed().to_string().green(),
            failed = summary.failed().to_string().red(),
            errored = summary.errored().to_string().magenta(),
            skipped = summary.skipped().to_string().dimmed(),
            elapsed = format!("{:.2?}", summary.elapsed)
        )
    );
}

/// Prints the message, location and expected/received diff of every case
/// that failed or errored.
///
/// 打印每个失败或出错用例的消息、位置以及期望值/实际值差异。
pub fn print_failure_details(summary: &RunSummary) {
    let failures: Vec<_> = summary
        .results
        .iter()
        .filter(|r| r.outcome.is_failure())
        .collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", t!("run.failure_banner").red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            result.outcome.status_str(&rust_i18n::locale()).red(),
            result.case.name.cyan()
        );

        if let Outcome::Failed {
            location: Some(location),
            ..
        } = &result.outcome
        {
            println!("  {}:{}", location.file.display(), location.span);
        }

        if let Some(message) = result.outcome.message() {
            println!("\n{}", message);
        }

        if let Outcome::Failed { diff: Some(diff), .. } = &result.outcome {
            println!("\n--- {} ---", t!("run.expected").green());
            println!("{}", diff.expected);
            println!("--- {} ---", t!("run.received").red());
            println!("{}", diff.received);
        }
        println!("\n{}", "-".repeat(80));
    }
}
