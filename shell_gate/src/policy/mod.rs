//! # Command Authorization Policy
//!
//! Decides whether a command string may run at all. The checks run in a fixed order, and
//! the order determines which reason the caller sees:
//!
//! 1. Empty command.
//! 2. Shell metacharacters (unless `allow_shell_metacharacters`). This is a blanket
//!    defense that does not depend on what the patterns intend.
//! 3. Block-list, in configured order. The first match wins.
//! 4. Allow-list. An empty allow-list admits everything that survived the block-list.
//!
//! The block-list runs before the allow-list so a broad allow rule such as `git *` can
//! never admit a command that a block rule names.

mod error;
pub mod metachar;
pub mod pattern;

pub use error::PolicyError;
pub use metachar::contains_metacharacters;
pub use pattern::matches;

use crate::config::Settings;

/// Authorizes `command` against the policy in `settings`.
pub fn authorize(command: &str, settings: &Settings) -> Result<(), PolicyError> {
    if command.is_empty() {
        return Err(PolicyError::EmptyCommand);
    }

    if !settings.allow_shell_metacharacters && contains_metacharacters(command) {
        tracing::debug!(command, "Rejected: shell metacharacters");
        return Err(PolicyError::MetacharactersRejected);
    }

    if let Some(pattern) = settings
        .blocked_patterns
        .iter()
        .find(|p| matches(command, p))
    {
        tracing::debug!(command, pattern = %pattern, "Rejected: blocked pattern");
        return Err(PolicyError::BlockedPattern {
            pattern: pattern.clone(),
        });
    }

    if settings.allowed_patterns.is_empty() {
        return Ok(());
    }

    match settings
        .allowed_patterns
        .iter()
        .find(|p| matches(command, p))
    {
        Some(pattern) => {
            tracing::debug!(command, pattern = %pattern, "Authorized by allowed pattern");
            Ok(())
        }
        None => {
            tracing::debug!(command, "Rejected: no allowed pattern matched");
            Err(PolicyError::NotAllowed {
                allowed: settings.allowed_patterns.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(allowed: &[&str], blocked: &[&str], allow_meta: bool) -> Settings {
        Settings {
            allowed_patterns: allowed.iter().map(|s| s.to_string()).collect(),
            blocked_patterns: blocked.iter().map(|s| s.to_string()).collect(),
            allow_shell_metacharacters: allow_meta,
            ..Settings::default()
        }
    }

    #[test]
    fn test_empty_command_checked_first() {
        let s = settings(&[], &["*"], false);
        assert_eq!(authorize("", &s), Err(PolicyError::EmptyCommand));
    }

    #[test]
    fn test_metacharacters_rejected_before_patterns() {
        let s = settings(&["git *"], &["rm *"], false);
        assert_eq!(
            authorize("git status; rm -rf /", &s),
            Err(PolicyError::MetacharactersRejected)
        );
    }

    #[test]
    fn test_metacharacters_allowed_falls_through_to_patterns() {
        let s = settings(&["git *"], &[], true);
        assert_eq!(authorize("git status; rm -rf /", &s), Ok(()));

        let s = settings(&["git *"], &["* /"], true);
        assert_eq!(
            authorize("git status; rm -rf /", &s),
            Err(PolicyError::BlockedPattern {
                pattern: "* /".to_string()
            })
        );
    }

    #[test]
    fn test_block_list_wins_over_allow_list() {
        let s = settings(&["git *"], &["git push *"], false);
        assert_eq!(
            authorize("git push origin main", &s),
            Err(PolicyError::BlockedPattern {
                pattern: "git push *".to_string()
            })
        );
        assert_eq!(authorize("git status", &s), Ok(()));
    }

    #[test]
    fn test_first_blocked_pattern_reported() {
        let s = settings(&[], &["sudo *", "sudo rm *"], false);
        assert_eq!(
            authorize("sudo rm x", &s),
            Err(PolicyError::BlockedPattern {
                pattern: "sudo *".to_string()
            })
        );
    }

    #[test]
    fn test_empty_allow_list_allows_everything_not_blocked() {
        let s = settings(&[], &["sudo *"], false);
        assert_eq!(authorize("python3 script.py", &s), Ok(()));
    }

    #[test]
    fn test_not_allowed_lists_all_patterns() {
        let s = settings(&["git *", "pwd"], &[], false);
        let err = authorize("python3 script.py", &s).unwrap_err();
        assert_eq!(
            err,
            PolicyError::NotAllowed {
                allowed: vec!["git *".to_string(), "pwd".to_string()]
            }
        );
        let message = err.to_string();
        assert!(message.contains("'git *'"));
        assert!(message.contains("'pwd'"));
    }

    #[test]
    fn test_default_policy() {
        let s = Settings::default();
        assert_eq!(authorize("git status", &s), Ok(()));
        assert_eq!(authorize("ls", &s), Ok(()));
        assert!(matches!(
            authorize("sudo ls", &s),
            Err(PolicyError::BlockedPattern { .. })
        ));
        assert!(matches!(
            authorize("dd if=/dev/zero of=disk.img", &s),
            Err(PolicyError::BlockedPattern { .. })
        ));
        assert!(matches!(
            authorize("python3 -V", &s),
            Err(PolicyError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_denial_kinds() {
        assert_eq!(PolicyError::EmptyCommand.kind(), "empty_command");
        assert_eq!(
            PolicyError::MetacharactersRejected.kind(),
            "metacharacters_rejected"
        );
    }
}
