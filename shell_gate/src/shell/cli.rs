//! # Shell Gate CLI
//!
//! This module contains the command-line interface definition and main entry point.

use super::modes;

use crate::{
    adapter::ShellKind,
    config::{FileSettings, SETTINGS_FILE_NAME},
    service::{AgentContext, ShellGate},
    utils::logging::init_logging,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

/// Shell Gate: policy-gated shell command execution for AI agents.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = "shell_gate runs in four modes:

1. Run: authorize and execute one command, print the JSON result.
   Example: shell_gate run --working-dir . --timeout 30 -- git status

2. Serve: read one JSON request per line on stdin, write one JSON response per line.
   Example: echo '{\"command\":\"pwd\"}' | shell_gate serve

3. Check: authorize a command without running it.
   Example: shell_gate check -- sudo ls

4. Defaults: print the built-in policy as a settings document.
   Example: shell_gate defaults"
)]
pub struct Cli {
    /// Settings file to read on every request (replaces the built-in fallback locations)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Agent directory: working directory fallback and first settings location
    #[arg(long, global = true)]
    pub agent_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log to stderr instead of file
    #[arg(long, global = true)]
    pub log_to_stderr: bool,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Mode {
    /// Authorize and execute a single command
    Run {
        /// Working directory for the command
        #[arg(long)]
        working_dir: Option<String>,

        /// Shell used to run the command
        #[arg(long, value_enum)]
        shell: Option<ShellKind>,

        /// Timeout in seconds (<= 0 uses the configured default, capped at 300)
        #[arg(long, allow_negative_numbers = true)]
        timeout: Option<i64>,

        /// The command; multiple words are joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Serve line-delimited JSON requests on stdin
    Serve,

    /// Authorize a command without running it
    Check {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print the built-in default settings
    Defaults,
}

/// Locations tried after the agent directory when no `--settings` file is given.
pub fn default_fallback_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("agents/default").join(SETTINGS_FILE_NAME)]
}

/// Build the gate described by the global flags.
pub fn build_gate(cli: &Cli) -> ShellGate {
    let fallbacks = match &cli.settings {
        Some(path) => vec![path.clone()],
        None => default_fallback_paths(),
    };
    let ctx = AgentContext {
        agent_dir: cli.agent_dir.clone(),
    };
    ShellGate::new(Arc::new(FileSettings::new(fallbacks)), ctx)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    init_logging(log_level, !cli.log_to_stderr)?;

    let gate = build_gate(&cli);

    match cli.mode {
        Mode::Run {
            working_dir,
            shell,
            timeout,
            command,
        } => {
            tracing::info!("Running in CLI mode");
            modes::run_cli_mode(&gate, command.join(" "), working_dir, shell, timeout).await
        }
        Mode::Serve => {
            tracing::info!("Running in STDIO server mode");
            modes::run_server_mode(gate).await
        }
        Mode::Check { command } => modes::run_check_mode(&gate, &command.join(" ")),
        Mode::Defaults => modes::run_defaults_mode(),
    }
}
