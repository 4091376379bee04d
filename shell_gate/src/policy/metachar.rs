//! Shell metacharacter detection.
//!
//! A surface scan for operators that chain, redirect or substitute commands. Quoting is
//! not understood: a `>` inside a quoted argument is still flagged, and injection vectors
//! outside this list are not.

/// Operators rejected unless `allow_shell_metacharacters` is enabled.
pub const SHELL_OPERATORS: &[&str] = &["&&", "||", "|", ";", "&", ">", "<", "`", "$("];

/// Returns true if `command` contains a newline or any of [`SHELL_OPERATORS`].
pub fn contains_metacharacters(command: &str) -> bool {
    command.contains('\n') || SHELL_OPERATORS.iter().any(|op| command.contains(op))
}
