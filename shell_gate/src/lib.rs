//! # Shell Gate
//!
//! A policy-gated command-execution sandbox for AI agents. The agent hands over an
//! arbitrary shell command string; `shell_gate` decides whether it may run, picks the
//! working directory, shell and timeout, runs it, and returns a structured result with
//! stdout, stderr and exit status.
//!
//! ## Request Pipeline
//!
//! 1. **Policy** (`policy`): empty-command check, shell metacharacter filter, block-list,
//!    then allow-list. The first failing check denies the request.
//! 2. **Containment** (`sandbox`): the working directory is resolved to an absolute path
//!    and checked against the allowed roots.
//! 3. **Execution** (`adapter`): the command runs under the selected shell, bounded by a
//!    deadline derived from the caller's cancellation token. On deadline the whole
//!    process group is killed.
//!
//! Denials never spawn a process. Execution outcomes (non-zero exit, timeout, launch
//! failure) are always reported inside [`adapter::ExecutionResult`], never as errors.
//!
//! ## Security Note
//!
//! Pattern checks are substring based and do not parse shell grammar. They are a coarse
//! guard rail for a cooperative agent, not an isolation boundary.
//!
//! ## Modules
//!
//! - **`adapter`**: Shell selection and bounded subprocess execution.
//! - **`config`**: Policy settings, built-in defaults and settings sources.
//! - **`policy`**: Pattern matching, metacharacter scanning and authorization.
//! - **`sandbox`**: Working directory resolution and containment.
//! - **`service`**: The `evaluate` entry point tying the pipeline together.
//! - **`shell`**: The `shell_gate` command-line binary.
//! - **`utils`**: Logging setup.

pub mod adapter;
pub mod config;
pub mod policy;
pub mod sandbox;
pub mod service;
pub mod shell;
pub mod utils;

pub use adapter::{CommandRequest, ExecutionResult, ShellKind};
pub use config::Settings;
pub use service::{AgentContext, Denial, ShellGate, evaluate};
