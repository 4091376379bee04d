//! # Command Executor
//!
//! Runs an already-authorized command and turns whatever happens into an
//! [`ExecutionResult`]. `execute` never fails: a non-zero exit, a timeout, a cancellation
//! or a launch failure is expected information for the caller and is encoded in the
//! result's `exit_code` and `error` fields.
//!
//! ## Execution Flow
//!
//! 1. The shell is chosen from a fixed table (`ShellKind`). `auto` is `cmd` on Windows
//!    and `sh` elsewhere. The command string is handed to the shell as one argument.
//! 2. The child is spawned with stdin closed and stdout/stderr piped separately. On
//!    Unix it leads its own process group.
//! 3. The run is bounded by a deadline and by a cancellation scope derived from the
//!    caller's token. Whichever fires first kills the whole process group, so
//!    background descendants do not outlive the request.
//!
//! No retries are performed and output is never truncated.

mod command;
mod error;
mod process;
mod types;

pub use error::ExecutionError;
pub use types::{CommandRequest, ExecutionResult, ShellKind};

use crate::config::{DEFAULT_TIMEOUT_SECONDS, MAX_TIMEOUT_SECONDS};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Timeout actually applied to a run.
///
/// A missing or non-positive request value falls back to the policy default, a
/// non-positive policy default falls back to 60 seconds, and the result is capped at 300.
pub fn effective_timeout(requested: Option<i64>, policy_default: i64) -> u64 {
    let seconds = requested
        .filter(|t| *t > 0)
        .unwrap_or(policy_default);
    let seconds = if seconds > 0 {
        seconds
    } else {
        DEFAULT_TIMEOUT_SECONDS
    };
    seconds.min(MAX_TIMEOUT_SECONDS) as u64
}

/// Run `command` under `shell` in `working_dir`, bounded by `timeout_seconds` and by
/// `cancel`.
pub async fn execute(
    command: &str,
    working_dir: &Path,
    shell: ShellKind,
    timeout_seconds: u64,
    cancel: &CancellationToken,
) -> ExecutionResult {
    let timeout_seconds = timeout_seconds.clamp(1, MAX_TIMEOUT_SECONDS as u64);
    let scope = cancel.child_token();
    let start_time = Instant::now();

    tracing::info!(
        command,
        working_dir = %working_dir.display(),
        shell = ?shell.resolve(),
        timeout_seconds,
        "Executing command"
    );

    let cmd = command::build_shell_command(shell, command, working_dir);
    let captured =
        process::run_bounded(cmd, Duration::from_secs(timeout_seconds), &scope).await;

    let duration_ms = start_time.elapsed().as_millis() as u64;
    let (exit_code, error) = match captured.outcome {
        Ok(()) => {
            tracing::info!(command, duration_ms, "Command completed");
            (0, None)
        }
        Err(e) => {
            match &e {
                ExecutionError::Timeout { .. } | ExecutionError::Cancelled => {
                    tracing::warn!(command, duration_ms, "{}", e)
                }
                _ => tracing::info!(command, duration_ms, "Command failed: {}", e),
            }
            (e.exit_code(), Some(e.to_string()))
        }
    };

    ExecutionResult {
        command: command.to_string(),
        working_dir: working_dir.display().to_string(),
        stdout: captured.stdout,
        stderr: captured.stderr,
        exit_code,
        error,
    }
}
