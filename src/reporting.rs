//! # Reporting Module / 报告模块
//!
//! Run progress events and their console rendering. The console reporter
//! prints a coloured, localised transcript, per-case statuses, failure diffs
//! and a final summary.
//!
//! 运行进度事件及其控制台呈现。控制台报告器打印彩色、本地化的运行记录、
//! 每个用例的状态、失败差异以及最终摘要。

pub mod console;
pub mod events;

// Re-export common reporting items
pub use console::{ConsoleReporter, print_failure_details, print_summary, print_tree};
pub use events::{EventRecorder, RunEvent, RunObserver};
