//! # Run Request Module / 运行请求模块
//!
//! Turns a run request into an ordered queue of test cases, then drives the
//! queue through the execution engine while reporting progress.
//!
//! Discovery resolves files that were never reconciled before enqueuing their
//! cases. Execution checks cancellation only between cases: a case that has
//! not started when the token fires is reported skipped, a case already
//! running is left to finish or time out.
//!
//! 将运行请求转换为有序的测试用例队列，然后驱动队列通过执行引擎并报告进度。
//!
//! 发现阶段会在入队前解析从未协调过的文件。执行阶段只在用例之间检查取消：
//! 取消时尚未开始的用例被报告为跳过，已在运行的用例会运行到结束或超时。

use futures::{StreamExt, stream};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::execution::{ExecutionSettings, QueuedCase, run_test_case};
use crate::core::extractor::Extractor;
use crate::core::models::{Outcome, OutcomeKind};
use crate::core::tree::{FileId, NodeId, TestCaseNode, TestId, TestTree};
use crate::reporting::events::RunObserver;

/// Which nodes a run covers. `include: None` means every file in the tree.
/// 运行所覆盖的节点。`include: None` 表示树中的所有文件。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub include: Option<Vec<NodeId>>,
    pub exclude: Vec<NodeId>,
}

impl RunRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(include: Vec<NodeId>) -> Self {
        Self {
            include: Some(include),
            exclude: Vec::new(),
        }
    }

    pub fn excluding(mut self, exclude: Vec<NodeId>) -> Self {
        self.exclude = exclude;
        self
    }
}

/// One executed (or skipped) case and its terminal outcome.
/// 一个已执行（或跳过）的用例及其最终结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    pub case: QueuedCase,
    pub outcome: Outcome,
}

/// Totals for a finished run, results in enqueue order.
/// 已完成运行的统计，结果按入队顺序排列。
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<CaseResult>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn count(&self, kind: OutcomeKind) -> usize {
        self.results.iter().filter(|r| r.outcome.kind() == kind).count()
    }

    pub fn passed(&self) -> usize {
        self.count(OutcomeKind::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeKind::Failed)
    }

    pub fn errored(&self) -> usize {
        self.count(OutcomeKind::Errored)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeKind::Skipped)
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// True when any case failed or errored.
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.outcome.is_failure())
    }
}

/// Walks the requested nodes in order and builds the execution queue.
/// Unresolved files are reconciled from disk first. Every queued case is
/// reported `enqueued`.
///
/// 按顺序遍历请求的节点并构建执行队列。未解析的文件会先从磁盘协调。
/// 每个入队的用例都会报告 `enqueued`。
pub async fn plan_run<E: Extractor>(
    tree: &mut TestTree,
    extractor: &E,
    request: &RunRequest,
    observer: &dyn RunObserver,
) -> Vec<QueuedCase> {
    let requested: Vec<NodeId> = match &request.include {
        Some(include) => include.clone(),
        None => tree.file_ids().into_iter().map(NodeId::File).collect(),
    };
    let excluded: HashSet<&NodeId> = request.exclude.iter().collect();
    let mut expanded: HashSet<FileId> = HashSet::new();
    let mut seen: HashSet<TestId> = HashSet::new();
    let mut queue = Vec::new();

    for node in requested {
        if excluded.contains(&node) {
            continue;
        }

        match node {
            NodeId::Case(id) => {
                let Some((file, case)) = tree.find_case(&id) else {
                    tracing::debug!(case = %id, "requested test case no longer exists");
                    continue;
                };
                if seen.insert(case.id.clone()) {
                    observer.enqueued(&case.id);
                    queue.push(queued(file.path.clone(), case));
                }
            }
            NodeId::File(id) => {
                if !expanded.insert(id.clone()) {
                    continue;
                }
                let Some(resolved) = tree.get(&id).map(|file| file.resolved) else {
                    tracing::debug!(file = %id, "requested file no longer exists");
                    continue;
                };
                if !resolved {
                    tree.update_from_disk(extractor, &id).await;
                }
                let Some(file) = tree.get(&id) else {
                    continue;
                };

                // Cases are taken from the file itself, so nodes sharing a
                // name are all queued. Cases requested on their own earlier
                // are not queued twice.
                let fresh: Vec<&TestCaseNode> = file
                    .cases()
                    .filter(|case| !excluded.contains(&NodeId::Case(case.id.clone())))
                    .filter(|case| !seen.contains(&case.id))
                    .collect();
                for case in fresh {
                    seen.insert(case.id.clone());
                    observer.enqueued(&case.id);
                    queue.push(queued(file.path.clone(), case));
                }
            }
        }
    }

    tracing::debug!(count = queue.len(), "planned run");
    queue
}

fn queued(file: PathBuf, case: &TestCaseNode) -> QueuedCase {
    QueuedCase {
        id: case.id.clone(),
        file,
        name: case.name.clone(),
        command: case.command.clone(),
        span: case.span,
    }
}

/// Runs the queue and reports every case exactly once.
///
/// With `jobs <= 1` the whole queue runs strictly in order, one interpreter at
/// a time. With more jobs, up to `jobs` distinct files run at once while each
/// file's cases stay sequential and in order.
///
/// 运行队列并对每个用例恰好报告一次。
///
/// `jobs <= 1` 时整个队列严格按顺序运行，一次只有一个解释器。
/// 更多并发时，最多 `jobs` 个不同文件同时运行，每个文件内的用例仍按顺序依次运行。
pub async fn execute_queue(
    queue: Vec<QueuedCase>,
    settings: &ExecutionSettings,
    jobs: usize,
    cancel: &CancellationToken,
    observer: &dyn RunObserver,
) -> RunSummary {
    let start = Instant::now();

    let results = if jobs <= 1 {
        run_sequence(queue, settings, cancel, observer).await
    } else {
        let batches = group_by_file(queue);
        stream::iter(
            batches
                .into_iter()
                .map(|batch| run_sequence(batch, settings, cancel, observer)),
        )
        .buffered(jobs)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .flatten()
        .collect()
    };

    RunSummary {
        results,
        elapsed: start.elapsed(),
    }
}

async fn run_sequence(
    queue: Vec<QueuedCase>,
    settings: &ExecutionSettings,
    cancel: &CancellationToken,
    observer: &dyn RunObserver,
) -> Vec<CaseResult> {
    let mut results = Vec::with_capacity(queue.len());

    for case in queue {
        observer.append_output(&format!("Running {}", case.id));

        let outcome = if cancel.is_cancelled() {
            Outcome::Skipped
        } else {
            observer.started(&case.id);
            run_test_case(&case, settings).await
        };
        observer.finished(&case.id, &outcome);

        observer.append_output(&format!("Completed {}", case.id));
        results.push(CaseResult { case, outcome });
    }

    results
}

/// Splits the queue into per-file batches, keeping first-seen file order and
/// the original order inside each batch.
fn group_by_file(queue: Vec<QueuedCase>) -> Vec<Vec<QueuedCase>> {
    let mut batches: Vec<Vec<QueuedCase>> = Vec::new();
    for case in queue {
        match batches.iter_mut().find(|b| b[0].file == case.file) {
            Some(batch) => batch.push(case),
            None => batches.push(vec![case]),
        }
    }
    batches
}
