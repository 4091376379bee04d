/// Reasons the policy refuses a command before anything is spawned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("command is required")]
    EmptyCommand,

    #[error(
        "command contains shell metacharacters; set allow_shell_metacharacters to true to override"
    )]
    MetacharactersRejected,

    #[error("command blocked by security policy: matches blocked pattern '{pattern}'")]
    BlockedPattern { pattern: String },

    #[error("command not in allowed list. Allowed patterns: {}", format_patterns(.allowed))]
    NotAllowed { allowed: Vec<String> },
}

impl PolicyError {
    /// Stable machine-readable name of the denial reason.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyError::EmptyCommand => "empty_command",
            PolicyError::MetacharactersRejected => "metacharacters_rejected",
            PolicyError::BlockedPattern { .. } => "blocked_pattern",
            PolicyError::NotAllowed { .. } => "not_allowed",
        }
    }
}

fn format_patterns(patterns: &[String]) -> String {
    let quoted: Vec<String> = patterns.iter().map(|p| format!("'{}'", p)).collect();
    format!("[{}]", quoted.join(", "))
}
