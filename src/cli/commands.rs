//! # Commands Module / 命令模块
//!
//! One module per subcommand of the `suite-runner` CLI.
//!
//! `suite-runner` CLI 的每个子命令对应一个模块。

pub mod init;
pub mod list;
pub mod run;
