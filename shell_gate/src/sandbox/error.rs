use std::path::PathBuf;

/// Errors specific to working directory resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SandboxError {
    #[error(
        "working directory '{}' is not within the allowed working director{}",
        .path.display(),
        format_scopes(.scopes)
    )]
    WorkingDirNotAllowed { path: PathBuf, scopes: Vec<PathBuf> },

    #[error("failed to resolve working directory: {0}")]
    WorkingDirResolutionFailed(String),
}

impl SandboxError {
    /// Stable machine-readable name of the denial reason.
    pub fn kind(&self) -> &'static str {
        match self {
            SandboxError::WorkingDirNotAllowed { .. } => "working_dir_not_allowed",
            SandboxError::WorkingDirResolutionFailed(_) => "working_dir_resolution_failed",
        }
    }
}

/// Format allowed roots for error messages
pub(crate) fn format_scopes(scopes: &[PathBuf]) -> String {
    if scopes.len() == 1 {
        format!("y '{}'", scopes[0].display())
    } else {
        let scope_list: Vec<String> = scopes
            .iter()
            .map(|s| format!("'{}'", s.display()))
            .collect();
        format!("ies [{}]", scope_list.join(", "))
    }
}
