//! # Run Events Module / 运行事件模块
//!
//! The reporting surface a run request drives. For every test case the host
//! sees `enqueued`, then either `skipped` or `started` followed by exactly one
//! terminal outcome, with free-form log lines bracketing each case.
//!
//! 运行请求所驱动的报告接口。对于每个测试用例，宿主会先收到 `enqueued`，
//! 然后是 `skipped`，或者 `started` 加上恰好一个最终结果，每个用例前后都有自由格式的日志行。

use std::sync::Mutex;

use crate::core::models::Outcome;
use crate::core::tree::TestId;

/// Receives run progress. Implementations must be shareable across the
/// concurrently running per-file queues.
pub trait RunObserver: Send + Sync {
    fn enqueued(&self, _id: &TestId) {}

    fn started(&self, _id: &TestId) {}

    /// Called exactly once per enqueued case with its terminal outcome.
    /// 每个已入队的用例恰好调用一次，传入其最终结果。
    fn finished(&self, id: &TestId, outcome: &Outcome);

    /// Free-form transcript text, one line per call.
    fn append_output(&self, _line: &str) {}
}

/// One observed step of a run.
/// 运行过程中观察到的一个步骤。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Enqueued(TestId),
    Started(TestId),
    Finished(TestId, Outcome),
    Output(String),
}

/// Observer that records every event in order, for tests and post-run reports.
/// 按顺序记录所有事件的观察者，用于测试和运行后的报告。
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<RunEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: RunEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Terminal outcomes in the order they were reported.
    pub fn outcomes(&self) -> Vec<(TestId, Outcome)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RunEvent::Finished(id, outcome) => Some((id, outcome)),
                _ => None,
            })
            .collect()
    }
}

impl RunObserver for EventRecorder {
    fn enqueued(&self, id: &TestId) {
        self.push(RunEvent::Enqueued(id.clone()));
    }

    fn started(&self, id: &TestId) {
        self.push(RunEvent::Started(id.clone()));
    }

    fn finished(&self, id: &TestId, outcome: &Outcome) {
        self.push(RunEvent::Finished(id.clone(), outcome.clone()));
    }

    fn append_output(&self, line: &str) {
        self.push(RunEvent::Output(line.to_string()));
    }
}

/// Forwards every event to each of its observers in turn.
/// 依次将每个事件转发给其中的每个观察者。
pub struct Fanout<'a>(pub Vec<&'a dyn RunObserver>);

impl RunObserver for Fanout<'_> {
    fn enqueued(&self, id: &TestId) {
        self.0.iter().for_each(|o| o.enqueued(id));
    }

    fn started(&self, id: &TestId) {
        self.0.iter().for_each(|o| o.started(id));
    }

    fn finished(&self, id: &TestId, outcome: &Outcome) {
        self.0.iter().for_each(|o| o.finished(id, outcome));
    }

    fn append_output(&self, line: &str) {
        self.0.iter().for_each(|o| o.append_output(line));
    }
}
