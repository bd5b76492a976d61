//! # Init Command Module / 初始化命令模块
//!
//! Creates a `SuiteRunner.toml` configuration file, either with defaults or
//! through a short interactive wizard.
//!
//! 创建 `SuiteRunner.toml` 配置文件，可以使用默认值，也可以通过简短的交互式向导。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use std::fs;
use std::path::Path;

use crate::core::config::{InputMode, RunnerConfig};
use crate::infra::t;

const HEADER: &str = "# Suite Runner configuration / Suite Runner 配置\n\
# `{command}` in `patch.harness` is replaced by each test case's command.\n\n";

/// Executes the init command.
///
/// # Arguments
/// * `path` - Where the configuration file is written
/// * `force` - Overwrite an existing file without asking
/// * `non_interactive` - Write the defaults without prompting
pub fn execute(path: &Path, force: bool, non_interactive: bool) -> Result<()> {
    let theme = ColorfulTheme::default();

    if path.exists() && !force {
        if non_interactive {
            println!("{}", t!("init.file_exists", path = path.display()).red());
            println!("{}", t!("init.use_force").yellow());
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init.overwrite_prompt", path = path.display()))
            .default(false)
            .interact()
            .context(t!("init.confirmation_failed").to_string())?;
        if !confirmation {
            println!("{}", t!("init.aborted"));
            return Ok(());
        }
    }

    let config = if non_interactive {
        default_config()
    } else {
        println!("\n{}", t!("init.welcome").cyan().bold());
        prompt_config(&theme)?
    };

    write_config(path, &config)
}

fn default_config() -> RunnerConfig {
    RunnerConfig {
        language: Some(rust_i18n::locale().to_string()),
        ..RunnerConfig::default()
    }
}

fn prompt_config(theme: &ColorfulTheme) -> Result<RunnerConfig> {
    let mut config = default_config();

    config.interpreter.command = Input::with_theme(theme)
        .with_prompt(t!("init.interpreter_prompt"))
        .default(config.interpreter.command)
        .interact_text()?;

    let modes = [t!("init.input_path"), t!("init.input_stdin")];
    config.interpreter.input = match Select::with_theme(theme)
        .with_prompt(t!("init.input_prompt"))
        .items(&modes)
        .default(0)
        .interact()?
    {
        0 => InputMode::Path,
        _ => InputMode::Stdin,
    };

    config.interpreter.timeout_ms = Input::with_theme(theme)
        .with_prompt(t!("init.timeout_prompt"))
        .default(config.interpreter.timeout_ms)
        .interact_text()?;

    config.extractor.command = Input::with_theme(theme)
        .with_prompt(t!("init.extractor_prompt"))
        .default(config.extractor.command)
        .interact_text()?;

    config.patch.harness = Input::with_theme(theme)
        .with_prompt(t!("init.harness_prompt"))
        .default(config.patch.harness)
        .interact_text()?;

    config.workspace.extension = Input::with_theme(theme)
        .with_prompt(t!("init.extension_prompt"))
        .default(config.workspace.extension)
        .interact_text()?;

    Ok(config)
}

fn write_config(path: &Path, config: &RunnerConfig) -> Result<()> {
    let body = toml::to_string_pretty(config).context(t!("init.serialize_failed").to_string())?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| t!("init.create_parent_dir_failed", path = parent.display()).to_string())?;
    }
    fs::write(path, format!("{HEADER}{body}"))
        .with_context(|| t!("init.write_failed", path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init.success", path = path.display()).bold()
    );
    println!("{}", t!("init.next_steps"));

    Ok(())
}
