use std::path::{Path, PathBuf};

use super::error::SandboxError;
use super::scopes;
use super::types::ContainmentMode;
use crate::config::Settings;
use crate::service::AgentContext;

/// Working directory rules for one request, derived from a settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    scopes: Vec<PathBuf>,
    default_dir: Option<PathBuf>,
    mode: ContainmentMode,
}

impl Sandbox {
    /// Create a Sandbox with already-absolute scopes.
    pub fn new(scopes: Vec<PathBuf>, default_dir: Option<PathBuf>, mode: ContainmentMode) -> Self {
        Self {
            scopes,
            default_dir,
            mode,
        }
    }

    /// Build the rules from settings, expanding `~` and absolutizing every configured
    /// directory.
    pub fn from_settings(settings: &Settings) -> Result<Self, SandboxError> {
        let scopes = settings
            .allowed_working_dirs
            .iter()
            .map(|dir| scopes::absolutize(&scopes::expand_tilde(dir)?))
            .collect::<Result<Vec<_>, _>>()?;

        let default_dir = settings
            .default_working_dir
            .as_deref()
            .filter(|dir| !dir.is_empty())
            .map(scopes::expand_tilde)
            .transpose()?;

        let mode = if settings.strict_working_dir_containment {
            ContainmentMode::Segment
        } else {
            ContainmentMode::Prefix
        };

        Ok(Self::new(scopes, default_dir, mode))
    }

    /// Get the allowed scopes.
    pub fn scopes(&self) -> &[PathBuf] {
        &self.scopes
    }

    pub fn mode(&self) -> ContainmentMode {
        self.mode
    }

    /// Pick the working directory for a request and check it against the allowed roots.
    ///
    /// Candidate order: the request's directory, then the configured default, then the
    /// agent directory, then the process working directory.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        ctx: &AgentContext,
    ) -> Result<PathBuf, SandboxError> {
        let candidate = match requested.filter(|dir| !dir.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => match (&self.default_dir, &ctx.agent_dir) {
                (Some(default_dir), _) => default_dir.clone(),
                (None, Some(agent_dir)) => agent_dir.clone(),
                (None, None) => std::env::current_dir().map_err(|e| {
                    SandboxError::WorkingDirResolutionFailed(format!(
                        "failed to get working directory: {}",
                        e
                    ))
                })?,
            },
        };

        let resolved = scopes::absolutize(&candidate)?;
        self.validate(&resolved)?;
        Ok(resolved)
    }

    /// Check an absolute path against the allowed roots. No roots means no restriction.
    pub fn validate(&self, path: &Path) -> Result<(), SandboxError> {
        if self.scopes.is_empty()
            || self
                .scopes
                .iter()
                .any(|scope| self.mode.contains(scope, path))
        {
            return Ok(());
        }

        tracing::debug!(path = %path.display(), "Working directory outside allowed roots");
        Err(SandboxError::WorkingDirNotAllowed {
            path: path.to_path_buf(),
            scopes: self.scopes.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox(scopes: &[&str], mode: ContainmentMode) -> Sandbox {
        Sandbox::new(scopes.iter().map(PathBuf::from).collect(), None, mode)
    }

    #[test]
    fn test_request_dir_inside_scope() {
        let sb = sandbox(&["/home/u/proj"], ContainmentMode::Prefix);
        let resolved = sb
            .resolve(Some("/home/u/proj/sub"), &AgentContext::default())
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/home/u/proj/sub"));
    }

    #[test]
    fn test_request_dir_outside_scope() {
        let sb = sandbox(&["/home/u/proj"], ContainmentMode::Prefix);
        let err = sb
            .resolve(Some("/etc"), &AgentContext::default())
            .unwrap_err();
        assert!(matches!(err, SandboxError::WorkingDirNotAllowed { .. }));
    }

    #[test]
    fn test_dotdot_escape_is_normalized_before_check() {
        let sb = sandbox(&["/home/u/proj"], ContainmentMode::Prefix);
        assert!(
            sb.resolve(Some("/home/u/proj/../other"), &AgentContext::default())
                .is_err()
        );
    }

    #[test]
    fn test_prefix_mode_admits_sibling_with_shared_prefix() {
        let sb = sandbox(&["/home/u/proj"], ContainmentMode::Prefix);
        assert!(sb.validate(Path::new("/home/u/proj-evil")).is_ok());
    }

    #[test]
    fn test_segment_mode_rejects_sibling_with_shared_prefix() {
        let sb = sandbox(&["/home/u/proj"], ContainmentMode::Segment);
        assert!(sb.validate(Path::new("/home/u/proj-evil")).is_err());
        assert!(sb.validate(Path::new("/home/u/proj/src")).is_ok());
        assert!(sb.validate(Path::new("/home/u/proj")).is_ok());
    }

    #[test]
    fn test_no_scopes_means_unrestricted() {
        let sb = sandbox(&[], ContainmentMode::Prefix);
        assert!(sb.validate(Path::new("/etc")).is_ok());
    }

    #[test]
    fn test_default_dir_used_when_request_has_none() {
        let sb = Sandbox::new(
            vec![],
            Some(PathBuf::from("/srv/work")),
            ContainmentMode::Prefix,
        );
        let ctx = AgentContext {
            agent_dir: Some(PathBuf::from("/agents/a1")),
        };
        assert_eq!(sb.resolve(None, &ctx).unwrap(), PathBuf::from("/srv/work"));
        assert_eq!(sb.resolve(Some(""), &ctx).unwrap(), PathBuf::from("/srv/work"));
        assert_eq!(
            sb.resolve(Some("/tmp/x"), &ctx).unwrap(),
            PathBuf::from("/tmp/x")
        );
    }

    #[test]
    fn test_agent_dir_then_cwd_fallback() {
        let sb = sandbox(&[], ContainmentMode::Prefix);
        let ctx = AgentContext {
            agent_dir: Some(PathBuf::from("/agents/a1")),
        };
        assert_eq!(sb.resolve(None, &ctx).unwrap(), PathBuf::from("/agents/a1"));
        assert_eq!(
            sb.resolve(None, &AgentContext::default()).unwrap(),
            std::env::current_dir().unwrap()
        );
    }

    #[test]
    fn test_from_settings_selects_mode_and_scopes() {
        let settings = Settings {
            allowed_working_dirs: vec!["/srv/./a".to_string()],
            strict_working_dir_containment: true,
            ..Settings::default()
        };
        let sb = Sandbox::from_settings(&settings).unwrap();
        assert_eq!(sb.scopes(), &[PathBuf::from("/srv/a")]);
        assert_eq!(sb.mode(), ContainmentMode::Segment);
    }
}
