//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Suite Runner,
//! including subprocess execution, file system operations, and i18n support.
//!
//! 此模块为 Suite Runner 提供基础设施服务，
//! 包括子进程执行、文件系统操作和国际化支持。

pub mod command;
pub mod fs;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
