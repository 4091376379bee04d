//! # Server Mode
//!
//! Reads one JSON request per line on stdin and writes one JSON response per line on
//! stdout. Every request runs in its own task, so a slow command never holds up the
//! ones behind it; responses are written in completion order and carry the request's
//! `id` when one was given.
//!
//! End of input stops reading and waits for in-flight requests. Ctrl-C or SIGTERM
//! cancels every running command; their (cancelled) results are still written.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::service::ShellGate;
use crate::shell::response::{Response, ServeRequest};

pub async fn run_server_mode(gate: ShellGate) -> Result<()> {
    let shutdown = super::shutdown_token();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks = JoinSet::new();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read request from stdin")?,
            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested, no longer reading requests");
                break;
            }
        };
        let Some(line) = line else {
            tracing::debug!("stdin closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let gate = gate.clone();
        let tx = tx.clone();
        let cancel = shutdown.clone();
        tasks.spawn(async move {
            let response = handle_line(&gate, &line, &cancel).await;
            match serde_json::to_string(&response) {
                Ok(json) => {
                    let _ = tx.send(json);
                }
                Err(e) => tracing::error!("Failed to serialize response: {}", e),
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Request task failed: {}", e);
        }
    }

    drop(tx);
    writer
        .await
        .context("Response writer task failed")?
        .context("Failed to write response to stdout")?;

    tracing::info!("Server mode finished");
    Ok(())
}

/// Decode one request line and run it through the gate.
pub async fn handle_line(gate: &ShellGate, line: &str, cancel: &CancellationToken) -> Response {
    let envelope: ServeRequest = match serde_json::from_str(line) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Rejected malformed request: {}", e);
            // Echo the id if the line is at least a JSON object carrying one.
            let id = serde_json::from_str::<serde_json::Value>(line)
                .ok()
                .and_then(|v| v.get("id").cloned());
            return Response::Invalid {
                id,
                error: format!("invalid request: {}", e),
            };
        }
    };

    let ServeRequest { id, request } = envelope;
    match gate.handle(&request, cancel).await {
        Ok(result) => Response::Executed { id, result },
        Err(denial) => Response::denied(id, &request.command, &denial),
    }
}
