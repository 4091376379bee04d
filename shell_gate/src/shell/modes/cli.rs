//! # CLI Mode
//!
//! One-shot modes: execute a single command and print the result, check a command
//! against the policy, or print the default settings.

use anyhow::{Context, Result};

use crate::adapter::{CommandRequest, ShellKind};
use crate::config::Settings;
use crate::service::{Denial, ShellGate};
use crate::shell::response::Response;

/// Exit status used when a request is denied before execution.
pub const DENIED_EXIT_CODE: i32 = 2;

/// Authorize and run one command, printing the JSON result to stdout.
///
/// The process exits with [`DENIED_EXIT_CODE`] when the request is denied. An executed
/// command always returns `Ok`, whatever its own exit code; that code is in the result.
pub async fn run_cli_mode(
    gate: &ShellGate,
    command: String,
    working_dir: Option<String>,
    shell: Option<ShellKind>,
    timeout: Option<i64>,
) -> Result<()> {
    let request = CommandRequest {
        command,
        working_dir,
        shell,
        timeout_seconds: timeout,
    };

    let cancel = super::shutdown_token();
    let outcome = gate.handle(&request, &cancel).await;
    cancel.cancel();

    match outcome {
        Ok(result) => {
            println!(
                "{}",
                result
                    .to_json_pretty()
                    .context("Failed to serialize execution result")?
            );
            Ok(())
        }
        Err(denial) => {
            print_denial(&request.command, &denial)?;
            std::process::exit(DENIED_EXIT_CODE);
        }
    }
}

/// Report whether a command would pass the policy. Working directories are not checked.
pub fn run_check_mode(gate: &ShellGate, command: &str) -> Result<()> {
    match gate.check(command) {
        Ok(()) => {
            println!("allowed: {}", command);
            Ok(())
        }
        Err(e) => {
            print_denial(command, &Denial::Policy(e))?;
            std::process::exit(DENIED_EXIT_CODE);
        }
    }
}

/// Print the built-in settings as a JSON document that can seed a settings file.
pub fn run_defaults_mode() -> Result<()> {
    let json = serde_json::to_string_pretty(&Settings::default())
        .context("Failed to serialize default settings")?;
    println!("{}", json);
    Ok(())
}

fn print_denial(command: &str, denial: &Denial) -> Result<()> {
    eprintln!("Denied: {}", denial);
    let json = serde_json::to_string_pretty(&Response::denied(None, command, denial))
        .context("Failed to serialize denial")?;
    println!("{}", json);
    Ok(())
}
