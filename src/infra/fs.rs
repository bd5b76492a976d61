//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the file system side of discovery and execution:
//! walking a workspace for source files and managing the private temporary
//! copies (patched artifacts) that test cases are executed from.
//!
//! 此模块提供发现和执行所需的文件系统功能：
//! 遍历工作区查找源文件，以及管理执行测试用例所用的私有临时副本（修补产物）。

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::{DirEntry, WalkDir};

/// Recursively collects files with the given extension under `root`.
/// Hidden directories and directories named in `ignore` are skipped.
/// The result is sorted for deterministic tree order.
///
/// 递归收集 `root` 下具有指定扩展名的文件。
/// 跳过隐藏目录以及 `ignore` 中列出的目录。结果经过排序以保证树顺序确定。
///
/// # Arguments
/// * `root` - A directory to walk, or a single file
/// * `extension` - File extension without the leading dot, e.g. `hs`
/// * `ignore` - Directory names that are never entered
pub fn discover_files(root: &Path, extension: &str, ignore: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if root.is_file() {
        if has_extension(root, extension) {
            files.push(root.to_path_buf());
        }
        return Ok(files);
    }

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry, ignore));
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to scan workspace: {}", root.display()))?;
        if entry.file_type().is_file() && has_extension(entry.path(), extension) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_skipped_dir(entry: &DirEntry, ignore: &[String]) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || ignore.iter().any(|i| i.as_str() == name.as_ref())
}

/// Checks whether `path` ends in `.{extension}`.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(extension)
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// A patched copy of a source file living at a private, unique path.
/// The file on disk is removed when this value is dropped, on every exit
/// path including errors and panics.
///
/// 位于私有、唯一路径上的源文件修补副本。
/// 当此值被丢弃时（包括错误和 panic 在内的所有退出路径），磁盘上的文件都会被删除。
#[derive(Debug)]
pub struct ArtifactFile {
    file: NamedTempFile,
}

impl ArtifactFile {
    /// Writes `contents` to a fresh uniquely-named file in `dir`
    /// (the system temp dir when `None`), keeping `extension` so the
    /// interpreter recognises the file type.
    ///
    /// 将 `contents` 写入 `dir`（为 `None` 时使用系统临时目录）中一个新的唯一命名文件，
    /// 并保留 `extension`，以便解释器识别文件类型。
    pub fn create(dir: Option<&Path>, extension: Option<&str>, contents: &str) -> std::io::Result<Self> {
        let suffix = extension.map(|e| format!(".{e}")).unwrap_or_default();
        let mut builder = tempfile::Builder::new();
        builder.prefix("suite-runner-").suffix(&suffix);

        let mut file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(contents.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Deletes the artifact now, surfacing any removal error.
    /// 立即删除产物，并返回删除时的错误。
    pub fn close(self) -> std::io::Result<()> {
        self.file.close()
    }
}
