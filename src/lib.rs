//! # Suite Runner Library / Suite Runner 库
//!
//! This library discovers test cases declared inside source files, keeps them
//! in an incrementally reconciled test tree, and runs each case in isolation
//! by patching the file's entry point and invoking an external interpreter.
//!
//! 此库发现源文件中声明的测试用例，将其保存在增量协调的测试树中，
//! 并通过修补文件入口点和调用外部解释器来隔离运行每个用例。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, test tree, execution engine and run scheduling
//! - `infra` - Subprocess capture, temporary artifacts and workspace discovery
//! - `reporting` - Run events and console output
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、测试树、执行引擎和运行调度
//! - `infra` - 子进程捕获、临时产物和工作区发现
//! - `reporting` - 运行事件和控制台输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::models;

/// Initializes internationalization (i18n).
///
/// Uses `requested` when given, otherwise the system locale. The full locale
/// (e.g. "zh-CN") is tried first, then its language part (e.g. "en" from
/// "en-US"), and finally the default language ("en").
///
/// 初始化国际化（i18n）。优先使用 `requested`，否则使用系统区域设置。
/// 先尝试完整区域（如 "zh-CN"），再尝试语言部分，最后回退到默认语言 "en"。
pub fn init(requested: Option<&str>) {
    let locale = requested
        .map(str::to_string)
        .or_else(sys_locale::get_locale)
        .unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(resolve_locale(&locale));
}

/// Maps a locale tag onto one of the bundled locales.
pub fn resolve_locale(locale: &str) -> &'static str {
    let available = rust_i18n::available_locales!();
    let find = |tag: &str| available.iter().copied().find(|l| l.eq_ignore_ascii_case(tag));

    find(locale)
        .or_else(|| locale.split(['-', '_']).next().and_then(find))
        .or_else(|| {
            // "zh" or "zh_CN" style tags select the Chinese catalogue.
            let language = locale.split(['-', '_']).next()?;
            available.iter().copied().find(|l| l.starts_with(language))
        })
        .unwrap_or("en")
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
