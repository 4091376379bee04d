use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::error::ExecutionError;

/// How long to keep collecting output after the process tree was killed.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

type SharedBuf = Arc<Mutex<Vec<u8>>>;

/// Captured output plus the classified outcome of one run.
pub(super) struct Captured {
    pub stdout: String,
    pub stderr: String,
    pub outcome: Result<(), ExecutionError>,
}

impl Captured {
    fn launch_failed(error: std::io::Error) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            outcome: Err(ExecutionError::LaunchFailed(error)),
        }
    }
}

enum Interrupt {
    Deadline,
    Cancelled,
}

/// Spawn `cmd` and wait for it to exit and close both output streams, bounded by
/// `timeout` and by `cancel`. On either bound the whole process tree is killed.
///
/// A shell that exits before the bound is reported by its own exit status, even when
/// descendants still holding the output streams are killed at the bound.
pub(super) async fn run_bounded(
    mut cmd: tokio::process::Command,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Captured {
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return Captured::launch_failed(e),
    };
    let pid = child.id();
    tracing::debug!(?pid, "Spawned child process");

    let stdout_buf = SharedBuf::default();
    let stderr_buf = SharedBuf::default();
    let mut readers = JoinSet::new();
    if let Some(stdout) = child.stdout.take() {
        readers.spawn(drain(stdout, stdout_buf.clone()));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.spawn(drain(stderr, stderr_buf.clone()));
    }

    let deadline = tokio::time::Instant::now() + timeout;
    let exited = tokio::select! {
        status = child.wait() => Ok(status),
        _ = tokio::time::sleep_until(deadline) => Err(Interrupt::Deadline),
        _ = cancel.cancelled() => Err(Interrupt::Cancelled),
    };

    let interrupted = match exited {
        Ok(status) => {
            // The shell is gone, but a background descendant may still hold its output
            // streams open. The shell's own status decides the outcome either way.
            let streams_held = tokio::select! {
                _ = join_readers(&mut readers) => false,
                _ = tokio::time::sleep_until(deadline) => true,
                _ = cancel.cancelled() => true,
            };
            if streams_held {
                tracing::debug!(
                    ?pid,
                    "Shell exited but descendants hold its output; killing process group"
                );
                kill_process_tree(&mut child, pid);
                settle(&mut child, &mut readers, pid).await;
            }
            return Captured {
                stdout: take_lossy(&stdout_buf),
                stderr: take_lossy(&stderr_buf),
                outcome: status.map_err(ExecutionError::from).and_then(classify),
            };
        }
        Err(interrupt) => interrupt,
    };

    kill_process_tree(&mut child, pid);
    settle(&mut child, &mut readers, pid).await;

    let outcome = match interrupted {
        Interrupt::Deadline => ExecutionError::Timeout {
            seconds: timeout.as_secs(),
        },
        Interrupt::Cancelled => ExecutionError::Cancelled,
    };
    Captured {
        stdout: take_lossy(&stdout_buf),
        stderr: take_lossy(&stderr_buf),
        outcome: Err(outcome),
    }
}

/// After a kill, give the child and the output readers a bounded time to finish.
async fn settle(child: &mut Child, readers: &mut JoinSet<()>, pid: Option<u32>) {
    if tokio::time::timeout(DRAIN_GRACE, wait_for_exit(child, readers))
        .await
        .is_err()
    {
        tracing::warn!(?pid, "Output streams still open after kill; abandoning them");
        readers.abort_all();
    }
}

/// `Child::wait` returns the cached status once the child has been reaped.
async fn wait_for_exit(
    child: &mut Child,
    readers: &mut JoinSet<()>,
) -> std::io::Result<ExitStatus> {
    let status = child.wait().await?;
    join_readers(readers).await;
    Ok(status)
}

async fn join_readers(readers: &mut JoinSet<()>) {
    while readers.join_next().await.is_some() {}
}

async fn drain<R>(mut reader: R, buf: SharedBuf)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if let Ok(mut buf) = buf.lock() {
                    buf.extend_from_slice(&chunk[..n]);
                }
            }
            Err(e) => {
                tracing::debug!("Stopped reading child output: {}", e);
                break;
            }
        }
    }
}

fn take_lossy(buf: &SharedBuf) -> String {
    buf.lock()
        .map(|mut bytes| String::from_utf8_lossy(&std::mem::take(&mut *bytes)).into_owned())
        .unwrap_or_default()
}

fn classify(status: ExitStatus) -> Result<(), ExecutionError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(ExecutionError::NonZeroExit { code });
    }
    #[cfg(unix)]
    if let Some(signal) = std::os::unix::process::ExitStatusExt::signal(&status) {
        return Err(ExecutionError::Signalled { signal });
    }
    Err(ExecutionError::NonZeroExit { code: -1 })
}

/// Kill the child and everything it started.
fn kill_process_tree(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid {
        // SAFETY: the child was spawned with process_group(0), so its pid is also the
        // process group id. killpg only sends a signal; it touches no memory of ours.
        let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if rc != 0 {
            tracing::debug!(pid, "killpg failed: {}", std::io::Error::last_os_error());
        }
    }
    #[cfg(not(unix))]
    let _ = pid;

    if let Err(e) = child.start_kill() {
        tracing::debug!("start_kill failed: {}", e);
    }
}
