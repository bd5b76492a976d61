//! # Workspace Synchronisation Module / 工作区同步模块
//!
//! Keeps the test tree in step with the workspace: initial discovery,
//! filesystem change events and in-memory document edits. Files are created
//! unresolved and only parsed when someone asks for their children, when a
//! run needs them, or when their editor contents change.
//!
//! 使测试树与工作区保持同步：初始发现、文件系统变更事件以及内存中的文档编辑。
//! 文件创建时处于未解析状态，只有在需要其子节点、运行需要它们或编辑器内容变化时才会被解析。

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::config::WorkspaceConfig;
use crate::core::execution::QueuedCase;
use crate::core::extractor::Extractor;
use crate::core::models::Generation;
use crate::core::run::{RunRequest, plan_run};
use crate::core::tree::{FileId, TestTree};
use crate::infra::fs::{discover_files, has_extension};
use crate::reporting::events::RunObserver;

/// A filesystem change reported by a watcher.
/// 由文件监视器报告的文件系统变更。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(PathBuf),
    Changed(PathBuf),
    Deleted(PathBuf),
}

/// Unsaved editor contents for a file.
/// 某个文件尚未保存的编辑器内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpdate {
    pub path: PathBuf,
    pub text: String,
}

/// The test tree together with the extractor that feeds it.
/// 测试树及为其提供数据的提取器。
pub struct Workspace<E> {
    tree: TestTree,
    extractor: E,
    extension: String,
    ignore: Vec<String>,
}

impl<E: Extractor> Workspace<E> {
    pub fn new(extractor: E, config: &WorkspaceConfig) -> Self {
        Self {
            tree: TestTree::new(),
            extractor,
            extension: config.extension.clone(),
            ignore: config.ignore.clone(),
        }
    }

    pub fn tree(&self) -> &TestTree {
        &self.tree
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &self.extension)
    }

    /// Adds an unresolved node for every matching file under `root`.
    /// Returns how many files the walk found.
    ///
    /// 为 `root` 下每个匹配的文件添加一个未解析节点。返回找到的文件数量。
    pub fn discover(&mut self, root: &Path) -> Result<usize> {
        let files = discover_files(root, &self.extension, &self.ignore)?;
        for path in &files {
            self.tree.get_or_create(path);
        }
        tracing::info!(root = %root.display(), count = files.len(), "discovered source files");
        Ok(files.len())
    }

    /// Reconciles one file from disk, as when its children are first expanded.
    pub async fn resolve(&mut self, id: &FileId) -> Option<Generation> {
        self.tree.update_from_disk(&self.extractor, id).await
    }

    /// Reconciles every file that has not been parsed yet.
    /// 协调所有尚未解析的文件。
    pub async fn resolve_all(&mut self) {
        let unresolved: Vec<FileId> = self
            .tree
            .files()
            .filter(|f| !f.resolved)
            .map(|f| f.id.clone())
            .collect();
        for id in unresolved {
            self.resolve(&id).await;
        }
    }

    /// Applies a watcher event. A change only triggers parsing for files that
    /// were already resolved; others stay lazy.
    ///
    /// 应用一个监视器事件。只有已解析的文件在变更时才会重新解析，其余文件保持惰性。
    pub async fn handle_event(&mut self, event: FileEvent) {
        match event {
            FileEvent::Created(path) if self.accepts(&path) => {
                self.tree.get_or_create(&path);
            }
            FileEvent::Changed(path) if self.accepts(&path) => {
                let file = self.tree.get_or_create(&path);
                if file.resolved {
                    let id = file.id.clone();
                    self.tree.update_from_disk(&self.extractor, &id).await;
                }
            }
            FileEvent::Deleted(path) => {
                self.tree.remove(&FileId::from_path(&path));
            }
            other => tracing::trace!(?other, "ignoring event for non-matching file"),
        }
    }

    /// Reconciles a file from unsaved editor text. Files without the
    /// configured extension are ignored.
    ///
    /// 根据未保存的编辑器文本协调文件。没有配置扩展名的文件会被忽略。
    pub async fn update_document(&mut self, update: DocumentUpdate) -> Option<Generation> {
        if !self.accepts(&update.path) {
            return None;
        }
        let id = self.tree.get_or_create(&update.path).id.clone();
        self.tree
            .update_from_contents(&self.extractor, &id, &update.text)
            .await
    }

    /// Builds the execution queue for `request`.
    pub async fn plan(&mut self, request: &RunRequest, observer: &dyn RunObserver) -> Vec<QueuedCase> {
        plan_run(&mut self.tree, &self.extractor, request, observer).await
    }
}
