//! # List Command Module / 列表命令模块
//!
//! Discovers the workspace, parses every matching file and prints the tree.
//!
//! 发现工作区、解析所有匹配的文件并打印测试树。

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::core::config::RunnerConfig;
use crate::core::extractor::CommandExtractor;
use crate::core::workspace::Workspace;
use crate::infra::t;
use crate::reporting::console::print_tree;

pub async fn execute(config: &RunnerConfig, root: &Path) -> Result<()> {
    let workspace = super::run::load_workspace(config, root, true).await?;
    report(&workspace);
    Ok(())
}

fn report(workspace: &Workspace<CommandExtractor>) {
    let tree = workspace.tree();
    if tree.is_empty() {
        println!("{}", t!("list.no_files").yellow());
        return;
    }

    print_tree(tree);

    let cases: usize = tree.files().map(|f| f.cases().len()).sum();
    println!(
        "\n{}",
        t!("list.totals", files = tree.len(), cases = cases).bold()
    );
}
