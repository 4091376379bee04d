use std::path::{Path, PathBuf};

use super::error::SandboxError;

/// Expand a leading `~` or `~/` against the user's home directory.
/// Other paths (including `~user`) are returned unchanged.
pub fn expand_tilde(path: &str) -> Result<PathBuf, SandboxError> {
    let rest = if path == "~" {
        ""
    } else if let Some(rest) = path.strip_prefix("~/") {
        rest
    } else {
        return Ok(PathBuf::from(path));
    };

    let home = dirs::home_dir().ok_or_else(|| {
        SandboxError::WorkingDirResolutionFailed(format!(
            "cannot expand '{}': home directory is unknown",
            path
        ))
    })?;
    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

/// Make `path` absolute against the process working directory and normalize it
/// lexically. Symlinks are left as they are.
pub fn absolutize(path: &Path) -> Result<PathBuf, SandboxError> {
    let full_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| {
            SandboxError::WorkingDirResolutionFailed(format!(
                "cannot determine current directory: {}",
                e
            ))
        })?;
        cwd.join(path)
    };
    Ok(normalize_path_lexically(&full_path))
}

/// Normalize a path lexically (without filesystem access).
pub fn normalize_path_lexically(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut stack = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if stack
                    .last()
                    .is_some_and(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
                {
                    stack.pop();
                }
            }
            c => stack.push(c),
        }
    }

    stack.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_dot_and_dotdot() {
        assert_eq!(
            normalize_path_lexically(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn test_normalize_does_not_climb_above_root() {
        assert_eq!(
            normalize_path_lexically(Path::new("/a/../../..")),
            PathBuf::from("/")
        );
    }

    #[test]
    fn test_expand_tilde_leaves_plain_paths() {
        assert_eq!(expand_tilde("/opt/x").unwrap(), PathBuf::from("/opt/x"));
        assert_eq!(expand_tilde("~user/x").unwrap(), PathBuf::from("~user/x"));
        assert_eq!(expand_tilde("a/~/b").unwrap(), PathBuf::from("a/~/b"));
    }

    #[test]
    fn test_expand_tilde_uses_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~").unwrap(), home);
            assert_eq!(expand_tilde("~/Projects").unwrap(), home.join("Projects"));
        }
    }

    #[test]
    fn test_absolutize_relative_joins_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolutize(Path::new("sub/./dir")).unwrap(), cwd.join("sub/dir"));
    }
}
