//! # Command-Line Interface Module / 命令行接口模块
//!
//! Builds the `suite-runner` command line and dispatches to the subcommands.
//! The language is resolved before the parser is built so help text is
//! localised too.
//!
//! 构建 `suite-runner` 命令行并分派到各个子命令。
//! 语言在构建解析器之前确定，因此帮助文本也会被本地化。

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::config::{DEFAULT_CONFIG_FILE, RunnerConfig, load_config};
use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang="))
        .map(str::to_string)
}

fn build_cli() -> Command {
    Command::new("suite-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli.about").to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli.lang").to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help(t!("cli.config").to_string())
                .value_name("CONFIG")
                .default_value(DEFAULT_CONFIG_FILE)
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cli.list_about").to_string())
                .arg(root_arg()),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cli.run_about").to_string())
                .arg(root_arg())
                .arg(
                    Arg::new("filter")
                        .short('f')
                        .long("filter")
                        .help(t!("cli.filter").to_string())
                        .value_name("PATTERN")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("exclude")
                        .short('x')
                        .long("exclude")
                        .help(t!("cli.exclude").to_string())
                        .value_name("PATTERN")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .help(t!("cli.jobs").to_string())
                        .value_name("JOBS")
                        .default_value("1")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("show-output")
                        .long("show-output")
                        .help(t!("cli.show_output").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cli.init_about").to_string())
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help(t!("cli.force").to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("cli.non_interactive").to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn root_arg() -> Arg {
    Arg::new("root")
        .help(t!("cli.root").to_string())
        .value_name("ROOT")
        .default_value(".")
        .value_parser(clap::value_parser!(PathBuf))
}

fn root(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("root")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads the configuration; its `language` applies unless `--lang` was given.
fn load_config_with_language(path: &Path, requested: Option<&str>) -> Result<RunnerConfig> {
    let config = load_config(path)?;
    if requested.is_none()
        && let Some(language) = &config.language
    {
        crate::init(Some(language));
    }
    Ok(config)
}

fn strings(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let requested = pre_parse_language();
    crate::init(requested.as_deref());

    let matches = build_cli().get_matches();
    let config_path = matches
        .get_one::<PathBuf>("config")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match matches.subcommand() {
        Some(("init", init_matches)) => {
            commands::init::execute(
                &config_path,
                init_matches.get_flag("force"),
                init_matches.get_flag("non-interactive"),
            )?;
        }
        Some(("list", sub_matches)) => {
            let config = load_config_with_language(&config_path, requested.as_deref())?;
            commands::list::execute(&config, &root(sub_matches)).await?;
        }
        Some(("run", sub_matches)) => {
            let config = load_config_with_language(&config_path, requested.as_deref())?;
            let options = commands::run::RunOptions {
                root: root(sub_matches),
                filters: strings(sub_matches, "filter"),
                excludes: strings(sub_matches, "exclude"),
                jobs: sub_matches.get_one::<usize>("jobs").copied().unwrap_or(1),
                show_output: sub_matches.get_flag("show-output"),
            };
            commands::run::execute(&config, options).await?;
        }
        _ => {
            // `subcommand_required` makes clap print help and exit before this.
        }
    }
    Ok(())
}
