use std::path::Path;
use std::process::Stdio;

use super::types::ShellKind;

/// Build the child process for `command` under `shell`.
///
/// The command string is passed as a single argument and never tokenized. stdin is
/// closed, stdout and stderr are piped separately. On Unix the child leads a new
/// process group so the whole tree can be killed at once.
pub(crate) fn build_shell_command(
    shell: ShellKind,
    command: &str,
    working_dir: &Path,
) -> tokio::process::Command {
    let (program, flags) = shell.invocation();

    let mut cmd = tokio::process::Command::new(program);
    cmd.args(flags)
        .arg(command)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    cmd
}
