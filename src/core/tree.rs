//! # Test Tree Module / 测试树模块
//!
//! The in-memory hierarchy of test nodes (files → test cases) and the
//! reconciliation that keeps it consistent with fresh extraction results.
//!
//! A file's children are rebuilt off to the side on a stack of frames and
//! swapped in with a single assignment once the whole pass has succeeded, so
//! observers never see a half-rebuilt subtree. A failed extraction leaves the
//! previous children in place and only records the error.
//!
//! 测试节点（文件 → 测试用例）的内存层级结构，以及使其与最新提取结果保持一致的协调逻辑。
//!
//! 文件的子节点在一个帧栈上单独重建，整个过程成功后通过一次赋值替换，
//! 因此观察者永远不会看到重建了一半的子树。提取失败时保留之前的子节点，只记录错误。

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::extractor::{ExtractError, Extractor};
use crate::core::models::{Generation, Span, TestDescriptor};

/// Stable identity of a file node: the file's URI.
/// 文件节点的稳定标识：文件的 URI。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(String);

impl FileId {
    pub fn from_path(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a test case: parent file identity plus the case name.
/// Unchanged files yield equal ids across reconciliation passes.
///
/// 测试用例的标识：父文件标识加上用例名称。
/// 文件未改变时，多次协调产生的标识相等。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(String);

impl TestId {
    pub fn new(file: &FileId, name: &str) -> Self {
        Self(format!("{}/{}", file.as_str(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A leaf node: one runnable test case.
/// 叶子节点：一个可运行的测试用例。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseNode {
    pub id: TestId,
    pub name: String,
    pub command: String,
    pub span: Span,
    /// The reconciliation pass that created this node.
    /// 创建此节点的协调过程。
    pub generation: Generation,
}

/// A source file and the test cases discovered in it.
/// 一个源文件及其中发现的测试用例。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub id: FileId,
    pub path: PathBuf,
    pub label: String,
    pub children: Vec<TestNode>,
    /// Whether the file has been reconciled at least once.
    /// 文件是否至少被协调过一次。
    pub resolved: bool,
    /// Set when the file failed to read or parse, or has colliding names.
    /// 当文件读取或解析失败，或存在重名用例时设置。
    pub error: Option<String>,
}

impl FileNode {
    fn new(path: &Path) -> Self {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            id: FileId::from_path(path),
            path: path.to_path_buf(),
            label,
            children: Vec::new(),
            resolved: false,
            error: None,
        }
    }

    /// Iterates over the test cases below this file in tree order.
    pub fn cases(&self) -> std::vec::IntoIter<&TestCaseNode> {
        let mut cases = Vec::new();
        self.collect_cases(&mut cases);
        cases.into_iter()
    }

    fn collect_cases<'a>(&'a self, out: &mut Vec<&'a TestCaseNode>) {
        for child in &self.children {
            match child {
                TestNode::Case(case) => out.push(case),
                TestNode::File(file) => file.collect_cases(out),
            }
        }
    }
}

/// A node of the test tree, carrying its own typed payload.
/// 测试树中的节点，携带自身的类型化数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestNode {
    File(FileNode),
    Case(TestCaseNode),
}

impl TestNode {
    pub fn label(&self) -> &str {
        match self {
            TestNode::File(file) => &file.label,
            TestNode::Case(case) => &case.name,
        }
    }
}

/// Reference to any node of the tree, used by run requests.
/// 对树中任意节点的引用，供运行请求使用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeId {
    File(FileId),
    Case(TestId),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::File(id) => id.fmt(f),
            NodeId::Case(id) => id.fmt(f),
        }
    }
}

/// One level of the rebuild stack: the children accumulated for a node.
struct Frame {
    children: Vec<TestNode>,
}

/// Builds a file's new children off to the side.
struct ChildrenBuilder {
    frames: Vec<Frame>,
}

impl ChildrenBuilder {
    fn new() -> Self {
        Self {
            frames: vec![Frame { children: Vec::new() }],
        }
    }

    fn push(&mut self, node: TestNode) {
        if let Some(frame) = self.frames.last_mut() {
            frame.children.push(node);
        }
    }

    /// Closes frames until `depth` remain. A closed inner frame is folded into
    /// its parent; the root frame's children are returned once it closes.
    fn ascend(&mut self, depth: usize) -> Option<Vec<TestNode>> {
        while self.frames.len() > depth {
            let finished = self.frames.pop()?;
            match self.frames.last_mut() {
                Some(parent) => parent.children.extend(finished.children),
                None => return Some(finished.children),
            }
        }
        None
    }

    fn finish(mut self) -> Vec<TestNode> {
        self.ascend(0).unwrap_or_default()
    }
}

/// Replaces `file`'s children with nodes built from `descriptors`, stamped
/// with `generation`. The previous children are replaced in one assignment.
/// Returns the names that occurred more than once, in first-seen order.
///
/// 用由 `descriptors` 构建、标记为 `generation` 的节点替换 `file` 的子节点。
/// 旧的子节点通过一次赋值被替换。返回出现多次的名称（按首次出现顺序）。
pub fn rebuild(file: &mut FileNode, descriptors: Vec<TestDescriptor>, generation: Generation) -> Vec<String> {
    let mut builder = ChildrenBuilder::new();
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for descriptor in descriptors {
        if !seen.insert(descriptor.name.clone()) && !duplicates.contains(&descriptor.name) {
            duplicates.push(descriptor.name.clone());
        }
        builder.push(TestNode::Case(TestCaseNode {
            id: TestId::new(&file.id, &descriptor.name),
            name: descriptor.name,
            command: descriptor.command,
            span: descriptor.span,
            generation,
        }));
    }

    file.children = builder.finish();
    file.resolved = true;
    duplicates
}

/// Owns all file nodes and the next reconciliation generation.
/// 持有所有文件节点以及下一个协调代数。
#[derive(Debug, Default)]
pub struct TestTree {
    files: Vec<FileNode>,
    generation: Generation,
}

impl TestTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation the next reconciliation pass will stamp.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.files.iter()
    }

    pub fn file_ids(&self) -> Vec<FileId> {
        self.files.iter().map(|f| f.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, id: &FileId) -> Option<&FileNode> {
        self.files.iter().find(|f| &f.id == id)
    }

    fn get_mut(&mut self, id: &FileId) -> Option<&mut FileNode> {
        self.files.iter_mut().find(|f| &f.id == id)
    }

    /// Returns the node for `path`, creating an unresolved one if needed.
    /// 返回 `path` 对应的节点，必要时创建一个未解析的节点。
    pub fn get_or_create(&mut self, path: &Path) -> &mut FileNode {
        let id = FileId::from_path(path);
        let index = match self.files.iter().position(|f| f.id == id) {
            Some(index) => index,
            None => {
                tracing::debug!(file = %id, "creating file node");
                self.files.push(FileNode::new(path));
                self.files.len() - 1
            }
        };
        &mut self.files[index]
    }

    /// Detaches a file and its whole subtree.
    /// 移除一个文件及其整个子树。
    pub fn remove(&mut self, id: &FileId) -> Option<FileNode> {
        let index = self.files.iter().position(|f| &f.id == id)?;
        tracing::debug!(file = %id, "removing file node");
        Some(self.files.remove(index))
    }

    /// Finds a test case anywhere in the tree.
    pub fn find_case(&self, id: &TestId) -> Option<(&FileNode, &TestCaseNode)> {
        self.files
            .iter()
            .find_map(|file| file.cases().find(|case| &case.id == id).map(|case| (file, case)))
    }

    /// Applies one extraction result to a file. On success the children are
    /// rebuilt with the current generation and the generation advances; on
    /// failure the children stay as they were and `error` is set.
    ///
    /// 将一次提取结果应用到文件。成功时使用当前代数重建子节点并推进代数；
    /// 失败时保留子节点不变并设置 `error`。
    ///
    /// # Returns
    /// The generation stamped on the new children, or `None` if the file is
    /// unknown or extraction failed.
    pub fn apply(
        &mut self,
        id: &FileId,
        extracted: Result<Vec<TestDescriptor>, ExtractError>,
    ) -> Option<Generation> {
        let generation = self.generation;
        let file = self.get_mut(id)?;

        match extracted {
            Ok(descriptors) => {
                let count = descriptors.len();
                let duplicates = rebuild(file, descriptors, generation);
                file.error = if duplicates.is_empty() {
                    None
                } else {
                    tracing::warn!(file = %id, ?duplicates, "duplicate test case names");
                    Some(format!("duplicate test case name(s): {}", duplicates.join(", ")))
                };
                tracing::debug!(file = %id, %generation, count, "reconciled");
                self.generation = generation.next();
                Some(generation)
            }
            Err(e) => {
                tracing::warn!(file = %id, error = %e, "extraction failed, keeping previous test cases");
                file.error = Some(e.to_string());
                None
            }
        }
    }

    /// Extracts test cases from `text` and reconciles the file with them.
    /// 从 `text` 中提取测试用例并据此协调文件。
    pub async fn update_from_contents<E: Extractor>(
        &mut self,
        extractor: &E,
        id: &FileId,
        text: &str,
    ) -> Option<Generation> {
        let extracted = extractor.extract(text).await;
        self.apply(id, extracted)
    }

    /// Reads the file from disk and reconciles it. A read failure sets the
    /// file's error and leaves its children untouched.
    ///
    /// 从磁盘读取文件并协调。读取失败时设置文件错误，子节点保持不变。
    pub async fn update_from_disk<E: Extractor>(&mut self, extractor: &E, id: &FileId) -> Option<Generation> {
        let path = self.get(id)?.path.clone();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => self.update_from_contents(extractor, id, &text).await,
            Err(e) => {
                tracing::warn!(file = %id, error = %e, "failed to read file");
                if let Some(file) = self.get_mut(id) {
                    file.error = Some(ExtractError::Io(e).to_string());
                }
                None
            }
        }
    }
}
