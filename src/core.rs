//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Suite Runner: data models,
//! configuration, the test tree and its reconciliation, entry-point patching,
//! harness-output parsing, the execution engine and run scheduling.
//!
//! 此模块包含 Suite Runner 的核心功能：数据模型、配置、测试树及其协调、
//! 入口点修补、测试框架输出解析、执行引擎和运行调度。

pub mod config;
pub mod execution;
pub mod extractor;
pub mod harness;
pub mod models;
pub mod patch;
pub mod run;
pub mod tree;
pub mod workspace;

// Re-exports
pub use config::RunnerConfig;
pub use execution::run_test_case;
pub use models::Outcome;
pub use tree::TestTree;
