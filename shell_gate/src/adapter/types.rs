//! Type definitions for the adapter module.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Shell used to interpret the command string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    /// `cmd` on Windows, `sh` everywhere else.
    #[default]
    Auto,
    Sh,
    Bash,
    Zsh,
    Cmd,
    #[value(name = "powershell", alias = "pwsh")]
    PowerShell,
}

impl ShellKind {
    /// Map a shell name to a kind. Unknown names select `Auto`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => ShellKind::Auto,
            "sh" => ShellKind::Sh,
            "bash" => ShellKind::Bash,
            "zsh" => ShellKind::Zsh,
            "cmd" => ShellKind::Cmd,
            "powershell" | "pwsh" => ShellKind::PowerShell,
            other => {
                tracing::warn!("Unknown shell '{}', falling back to auto", other);
                ShellKind::Auto
            }
        }
    }

    /// Resolve `Auto` to the platform shell.
    pub fn resolve(self) -> Self {
        match self {
            ShellKind::Auto if cfg!(windows) => ShellKind::Cmd,
            ShellKind::Auto => ShellKind::Sh,
            other => other,
        }
    }

    /// Program and leading arguments; the command string is appended as one final
    /// argument.
    pub fn invocation(self) -> (&'static str, &'static [&'static str]) {
        match self.resolve() {
            ShellKind::Bash => ("bash", &["-c"]),
            ShellKind::Zsh => ("zsh", &["-c"]),
            ShellKind::Cmd => ("cmd", &["/C"]),
            ShellKind::PowerShell => (
                if cfg!(windows) { "powershell" } else { "pwsh" },
                &["-NoProfile", "-NonInteractive", "-Command"],
            ),
            ShellKind::Sh | ShellKind::Auto => ("sh", &["-c"]),
        }
    }
}

impl<'de> Deserialize<'de> for ShellKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(ShellKind::from_name(&name))
    }
}

/// One command execution request from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandRequest {
    /// Shell command to execute
    #[serde(default)]
    pub command: String,
    /// Working directory (defaults to the configured default, the agent directory, or the
    /// current directory)
    #[serde(default, alias = "workingDir", skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Shell to run the command with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<ShellKind>,
    /// Timeout in seconds (values <= 0 use the configured default; capped at 300)
    #[serde(
        default,
        alias = "timeoutSeconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout_seconds: Option<i64>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_shell(mut self, shell: ShellKind) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn with_timeout(mut self, seconds: i64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

/// Outcome of running a command. `error` is present only when the run was not clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutionResult {
    pub command: String,
    pub working_dir: String,
    pub stdout: String,
    pub stderr: String,
    /// Process exit code; -1 on timeout, cancellation or launch failure
    pub exit_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && self.error.is_none()
    }

    /// Two-space indented JSON document.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
