//! Glob-style command patterns.
//!
//! Patterns are plain strings with at most one meaningful `*`. Matching is done with
//! prefix/suffix comparisons on the raw command text, not with a glob engine, so existing
//! allow/block lists keep their exact behavior.

/// Returns true when `command` matches `pattern`.
///
/// - Exact equality always matches.
/// - `prefix*` matches commands starting with `prefix`. When `prefix` ends with a space
///   (`"ls *"`), the bare command without arguments (`"ls"`) matches too.
/// - `*suffix` matches commands ending with `suffix`.
/// - `head*tail` matches commands starting with `head` and ending with `tail`. The two
///   may overlap in short commands.
///
/// There is no escape syntax; a literal `*` cannot be expressed.
pub fn matches(command: &str, pattern: &str) -> bool {
    if command == pattern {
        return true;
    }

    if !pattern.contains('*') {
        return false;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        if command.starts_with(prefix) {
            return true;
        }
        if let Some(bare) = prefix.strip_suffix(' ')
            && command == bare
        {
            return true;
        }
    }

    if let Some(suffix) = pattern.strip_prefix('*')
        && command.ends_with(suffix)
    {
        return true;
    }

    match pattern.split_once('*') {
        Some((head, tail)) => command.starts_with(head) && command.ends_with(tail),
        None => false,
    }
}
