//! # Gate Service
//!
//! The single entry point a host uses: hand over a [`CommandRequest`], get back an
//! [`ExecutionResult`] or a [`Denial`]. Settings and agent context are plain data, so the
//! engine does not depend on any particular host runtime.
//!
//! Requests share no mutable state. Each one takes its own settings snapshot at the
//! start and keeps it for the whole run.

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::adapter::{self, CommandRequest, ExecutionResult};
use crate::config::{Settings, SettingsSource};
use crate::policy::{self, PolicyError};
use crate::sandbox::{Sandbox, SandboxError};

/// Host-supplied facts about the calling agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentContext {
    /// The agent's own directory; a working directory fallback and the first place
    /// settings are looked up.
    pub agent_dir: Option<PathBuf>,
}

/// A request refused before any process was spawned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Denial {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

impl Denial {
    /// Stable machine-readable name of the denial reason.
    pub fn kind(&self) -> &'static str {
        match self {
            Denial::Policy(e) => e.kind(),
            Denial::Sandbox(e) => e.kind(),
        }
    }
}

/// Authorize, resolve the working directory, then execute.
pub async fn evaluate(
    request: &CommandRequest,
    settings: &Settings,
    ctx: &AgentContext,
    cancel: &CancellationToken,
) -> Result<ExecutionResult, Denial> {
    let command = request.command.as_str();

    if let Err(denial) = policy::authorize(command, settings) {
        tracing::info!(command, reason = denial.kind(), "Command denied: {}", denial);
        return Err(denial.into());
    }

    let sandbox = Sandbox::from_settings(settings)?;
    let working_dir = match sandbox.resolve(request.working_dir.as_deref(), ctx) {
        Ok(dir) => dir,
        Err(denial) => {
            tracing::info!(command, reason = denial.kind(), "Command denied: {}", denial);
            return Err(denial.into());
        }
    };

    let timeout = adapter::effective_timeout(request.timeout_seconds, settings.timeout_seconds);
    let shell = request.shell.unwrap_or_default();

    Ok(adapter::execute(command, &working_dir, shell, timeout, cancel).await)
}

/// A gate bound to a settings source and an agent context. Settings are loaded fresh for
/// every request.
#[derive(Clone)]
pub struct ShellGate {
    settings: Arc<dyn SettingsSource>,
    ctx: AgentContext,
}

impl std::fmt::Debug for ShellGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellGate")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl ShellGate {
    pub fn new(settings: Arc<dyn SettingsSource>, ctx: AgentContext) -> Self {
        Self { settings, ctx }
    }

    pub fn context(&self) -> &AgentContext {
        &self.ctx
    }

    /// Snapshot the current settings.
    pub fn settings(&self) -> Settings {
        self.settings.load(&self.ctx)
    }

    /// Check a command against the current policy without running it.
    pub fn check(&self, command: &str) -> Result<(), PolicyError> {
        policy::authorize(command, &self.settings())
    }

    pub async fn handle(
        &self,
        request: &CommandRequest,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, Denial> {
        let settings = self.settings();
        evaluate(request, &settings, &self.ctx, cancel).await
    }
}
