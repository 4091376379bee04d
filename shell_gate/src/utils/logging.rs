//! # Logging Initialization
//!
//! Sets up the `tracing` subscriber for the `shell_gate` binary.
//!
//! - **Environment Filter**: `RUST_LOG` wins when set; otherwise the given level applies
//!   to everything, with `shell_gate=debug` when the level is `debug` or finer.
//! - **File Logging**: with `log_to_file = true`, logs go to a daily rolling file in the
//!   user cache directory (via `directories`) without ANSI colors. In `serve` mode this
//!   keeps stdout free for responses.
//! - **Stderr Fallback**: when file logging is off, or the cache directory cannot be
//!   determined or written, logs go to stderr with colors.
//!
//! Initialization happens once per process; later calls are no-ops.

use anyhow::Result;
use directories::ProjectDirs;
use std::{io::stderr, path::Path, sync::Once};
use tracing_subscriber::{EnvFilter, fmt::layer, prelude::*};

static INIT: Once = Once::new();

/// Initialize verbose logging for tests.
///
/// This configures a `trace`-level subscriber that logs to stderr.
pub fn init_test_logging() {
    let _ = init_logging("trace", false);
}

/// Initializes the logging system.
///
/// # Errors
///
/// Currently infallible; the `Result` leaves room for sinks that can fail to open.
pub fn init_logging(log_level: &str, log_to_file: bool) -> Result<()> {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

        if log_to_file
            && let Some(proj_dirs) = ProjectDirs::from("com", "ShellGate", "shell_gate")
        {
            let log_dir = proj_dirs.cache_dir();

            // tracing_appender::rolling::daily panics on permission errors, so probe first.
            if test_write_permission(log_dir) {
                let file_appender = tracing_appender::rolling::daily(log_dir, "shell_gate.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(layer().with_writer(non_blocking).with_ansi(false))
                    .init();
                // Leaked so buffered lines are flushed on exit.
                Box::leak(Box::new(guard));
                return;
            }
        }

        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer().with_writer(stderr).with_ansi(true))
            .init();
    });

    Ok(())
}

fn default_directives(log_level: &str) -> String {
    match log_level {
        "debug" | "trace" => format!("{log_level},shell_gate={log_level}"),
        _ => log_level.to_string(),
    }
}

/// Create `dir` if needed and check that a file can be written there.
fn test_write_permission(dir: &Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }

    let test_file = dir.join(".shell_gate_log_test");
    match std::fs::write(&test_file, "test") {
        Ok(()) => {
            let _ = std::fs::remove_file(&test_file);
            true
        }
        Err(_) => false,
    }
}
