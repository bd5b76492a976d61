//! # Command Execution Module / 命令执行模块
//!
//! Helpers for turning configured command strings into a program plus
//! arguments, and for running a subprocess with captured output under a
//! wall-clock budget.
//!
//! 将配置中的命令字符串转换为程序和参数的辅助函数，
//! 以及在挂钟时间预算内运行子进程并捕获其输出。

use anyhow::{Context, Result, anyhow};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::task::JoinHandle;

/// How long output readers may keep draining after the process is gone.
/// A grandchild that inherited the pipes must not stall the caller.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Expands `~` and environment variables, then splits the command like a
/// POSIX shell would.
///
/// 展开 `~` 和环境变量，然后按 POSIX shell 的规则拆分命令。
///
/// # Returns
/// The program and its leading arguments.
/// 程序及其前置参数。
pub fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let expanded = shellexpand::full(command)
        .with_context(|| format!("Failed to expand command: {command}"))?
        .to_string();

    let mut parts = shlex::split(&expanded)
        .ok_or_else(|| anyhow!("Failed to parse command: {}", expanded))?
        .into_iter();

    let program = parts
        .next()
        .ok_or_else(|| anyhow!("Empty command after parsing: {:?}", command))?;
    Ok((program, parts.collect()))
}

/// How a supervised process ended.
/// 受监控进程的结束方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited on its own (successfully or not).
    /// 进程自行退出（成功或失败）。
    Exited(ExitStatus),
    /// The budget elapsed and the process was forcibly terminated.
    /// 超出预算，进程被强制终止。
    TimedOut,
}

/// Captured result of a supervised process.
/// 受监控进程的捕获结果。
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub termination: Termination,
    pub stdout: String,
    pub stderr: String,
}

/// Spawns a command, optionally feeds it `stdin`, captures stdout and stderr
/// separately, and kills it if it runs longer than `timeout`.
///
/// 派生一个命令，可选地向其写入 `stdin`，分别捕获 stdout 和 stderr，
/// 如果运行时间超过 `timeout` 则将其终止。
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
/// * `stdin` - Bytes written to the child's stdin, which is then closed.
/// * `timeout` - Wall-clock budget for the process.
///
/// # Returns
/// The termination kind and both output streams, or the spawn/wait error.
pub async fn run_with_timeout(
    mut cmd: tokio::process::Command,
    stdin: Option<String>,
    timeout: Duration,
) -> std::io::Result<ProcessOutput> {
    let mut child = cmd
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
        tokio::spawn(async move {
            if let Err(e) = pipe.write_all(input.as_bytes()).await {
                tracing::debug!(error = %e, "child closed stdin early");
            }
            // Dropping the pipe closes it so the child sees EOF.
        });
    }

    let stdout_handle = child.stdout.take().map(spawn_reader);
    let stderr_handle = child.stderr.take().map(spawn_reader);

    let termination = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => Termination::Exited(status?),
        Err(_) => {
            tracing::debug!(?timeout, "process exceeded its budget, killing it");
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to kill timed-out process");
            }
            Termination::TimedOut
        }
    };

    let stdout = collect_reader(stdout_handle).await;
    let stderr = collect_reader(stderr_handle).await;

    Ok(ProcessOutput {
        termination,
        stdout,
        stderr,
    })
}

fn spawn_reader<R>(mut stream: R) -> JoinHandle<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Err(e) = stream.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "failed to read child output");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

async fn collect_reader(handle: Option<JoinHandle<String>>) -> String {
    let Some(mut handle) = handle else {
        return String::new();
    };

    match tokio::time::timeout(READER_GRACE, &mut handle).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to join output reader");
            String::new()
        }
        Err(_) => {
            handle.abort();
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_handles_quotes() {
        let (program, args) = split_command(r#"runghc -i"src dir" --ghc-arg=-Wall"#).unwrap();
        assert_eq!(program, "runghc");
        assert_eq!(args, vec!["-isrc dir".to_string(), "--ghc-arg=-Wall".to_string()]);
    }

    #[test]
    fn split_command_rejects_empty() {
        assert!(split_command("   ").is_err());
    }

    #[test]
    fn split_command_rejects_unbalanced_quotes() {
        assert!(split_command("runghc \"oops").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_streams_separately() {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg("echo out; echo err >&2");
        let output = run_with_timeout(cmd, None, Duration::from_secs(5)).await.unwrap();

        assert!(matches!(output.termination, Termination::Exited(s) if s.success()));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn feeds_stdin() {
        let cmd = tokio::process::Command::new("cat");
        let output = run_with_timeout(cmd, Some("hello".to_string()), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.stdout, "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn kills_process_past_its_budget() {
        let mut cmd = tokio::process::Command::new("sleep");
        cmd.arg("10");
        let started = std::time::Instant::now();
        let output = run_with_timeout(cmd, None, Duration::from_millis(200)).await.unwrap();

        assert_eq!(output.termination, Termination::TimedOut);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let cmd = tokio::process::Command::new("this_command_definitely_does_not_exist_12345");
        assert!(run_with_timeout(cmd, None, Duration::from_secs(1)).await.is_err());
    }
}
