//! # Modes Module
//!
//! Contains the different operational modes of the `shell_gate` binary.

pub mod cli;
pub mod server;

use tokio::signal;
use tokio_util::sync::CancellationToken;

pub use cli::{run_check_mode, run_cli_mode, run_defaults_mode};
pub use server::{handle_line, run_server_mode};

/// Returns a token that is cancelled on Ctrl-C or SIGTERM.
pub(crate) fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal as unix_signal};
            match unix_signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = signal::ctrl_c() => {
                            tracing::info!("Received SIGINT, cancelling running commands...");
                        }
                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM, cancelling running commands...");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    let _ = signal::ctrl_c().await;
                    tracing::info!("Received SIGINT, cancelling running commands...");
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = signal::ctrl_c().await;
            tracing::info!("Received Ctrl-C, cancelling running commands...");
        }
        trigger.cancel();
    });
    token
}
