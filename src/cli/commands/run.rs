//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: discover the workspace, select
//! test cases, run them through the interpreter and report the results.
//! Ctrl-C cancels cooperatively; cases that have not started are skipped.
//!
//! 此模块实现 `run` 命令：发现工作区、选择测试用例、通过解释器运行并报告结果。
//! Ctrl-C 以协作方式取消；尚未开始的用例会被跳过。

use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::core::config::RunnerConfig;
use crate::core::execution::ExecutionSettings;
use crate::core::extractor::CommandExtractor;
use crate::core::run::{RunRequest, execute_queue};
use crate::core::tree::{NodeId, TestTree};
use crate::core::workspace::Workspace;
use crate::infra::fs::absolute_path;
use crate::infra::t;
use crate::reporting::console::{ConsoleReporter, print_failure_details, print_summary};

/// Options of the `run` subcommand.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub root: PathBuf,
    /// Substrings of test ids to include; empty means everything.
    pub filters: Vec<String>,
    /// Substrings of test ids to leave out.
    pub excludes: Vec<String>,
    pub jobs: usize,
    pub show_output: bool,
}

/// Executes the run command with the provided options.
///
/// # Returns
/// An error if the workspace cannot be loaded, or if any test case failed,
/// errored or was interrupted.
pub async fn execute(config: &RunnerConfig, options: RunOptions) -> Result<()> {
    let selective = !options.filters.is_empty() || !options.excludes.is_empty();
    let mut workspace = load_workspace(config, &options.root, selective).await?;
    let settings = ExecutionSettings::from_config(config)?;

    let request = build_request(workspace.tree(), &options.filters, &options.excludes);
    let reporter = ConsoleReporter::new(&rust_i18n::locale(), options.show_output);
    let queue = workspace.plan(&request, &reporter).await;
    report_file_errors(workspace.tree());

    if queue.is_empty() {
        println!("{}", t!("run.no_cases").green());
        return Ok(());
    }

    println!(
        "{}",
        t!("run.starting", count = queue.len(), jobs = options.jobs.max(1)).bold()
    );

    let cancel = setup_signal_handler();
    let summary = execute_queue(queue, &settings, options.jobs, &cancel, &reporter).await;

    print_failure_details(&summary);
    print_summary(&summary);

    if summary.has_failures() {
        anyhow::bail!(
            t!(
                "run.failed",
                failed = summary.failed(),
                errored = summary.errored()
            )
            .to_string()
        );
    }
    if cancel.is_cancelled() {
        anyhow::bail!(t!("run.interrupted", skipped = summary.skipped()).to_string());
    }

    println!("\n{}", t!("run.all_passed").green().bold());
    Ok(())
}

/// Builds the workspace for `root`, building the extractor first if needed.
/// With `resolve_all` every file is parsed up front; otherwise files stay
/// unresolved until a run needs them.
///
/// 为 `root` 构建工作区，必要时先构建提取器。
/// `resolve_all` 为真时预先解析所有文件，否则文件在运行需要时才解析。
pub(crate) async fn load_workspace(
    config: &RunnerConfig,
    root: &Path,
    resolve_all: bool,
) -> Result<Workspace<CommandExtractor>> {
    let root = absolute_path(root)?;
    let extractor = CommandExtractor::from_config(&config.extractor)?;

    let cwd = env::current_dir().context(t!("run.cwd_failed").to_string())?;
    if extractor.ensure_built(&cwd).await? {
        println!("{}", t!("extractor.built", program = extractor.program()).cyan());
    }

    let mut workspace = Workspace::new(extractor, &config.workspace);
    workspace.discover(&root)?;
    if resolve_all {
        workspace.resolve_all().await;
    }
    Ok(workspace)
}

/// Turns substring filters into a run request over test case ids.
/// 将子串过滤器转换为针对测试用例标识的运行请求。
pub fn build_request(tree: &TestTree, filters: &[String], excludes: &[String]) -> RunRequest {
    let matching = |patterns: &[String]| -> Vec<NodeId> {
        tree.files()
            .flat_map(|file| file.cases())
            .filter(|case| patterns.iter().any(|p| case.id.as_str().contains(p.as_str())))
            .map(|case| NodeId::Case(case.id.clone()))
            .collect()
    };

    let request = if filters.is_empty() {
        RunRequest::all()
    } else {
        RunRequest::only(matching(filters))
    };
    request.excluding(matching(excludes))
}

fn report_file_errors(tree: &TestTree) {
    for file in tree.files() {
        if let Some(error) = &file.error {
            eprintln!(
                "{} {}",
                t!("run.file_error", file = file.path.display()).yellow(),
                error
            );
        }
    }
}

fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Span, TestDescriptor};
    use crate::core::tree::{FileId, TestId};

    fn tree() -> TestTree {
        let mut tree = TestTree::new();
        for (path, names) in [("/w/A.hs", ["addOne", "addTwo"]), ("/w/B.hs", ["maxOf", "minOf"])] {
            let id = tree.get_or_create(Path::new(path)).id.clone();
            let descriptors = names
                .iter()
                .map(|n| TestDescriptor {
                    name: n.to_string(),
                    span: Span::default(),
                    command: n.to_string(),
                })
                .collect();
            tree.apply(&id, Ok(descriptors));
        }
        tree
    }

    fn case(path: &str, name: &str) -> NodeId {
        NodeId::Case(TestId::new(&FileId::from_path(Path::new(path)), name))
    }

    #[test]
    fn no_filters_requests_everything() {
        assert_eq!(build_request(&tree(), &[], &[]), RunRequest::all());
    }

    #[test]
    fn filters_match_file_and_case_names() {
        let request = build_request(&tree(), &["B.hs".into(), "addTwo".into()], &["minOf".into()]);
        assert_eq!(
            request.include,
            Some(vec![case("/w/A.hs", "addTwo"), case("/w/B.hs", "maxOf"), case("/w/B.hs", "minOf")])
        );
        assert_eq!(request.exclude, vec![case("/w/B.hs", "minOf")]);
    }
}
