/// Non-clean execution outcomes. These are never returned to the caller as errors;
/// they are rendered into [`super::ExecutionResult::error`].
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("command timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("command cancelled")]
    Cancelled,

    #[error("exit status {code}")]
    NonZeroExit { code: i32 },

    #[error("terminated by signal {signal}")]
    Signalled { signal: i32 },

    #[error("{0}")]
    LaunchFailed(#[from] std::io::Error),
}

impl ExecutionError {
    /// Exit code reported for this outcome: the real code for a non-zero exit, -1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionError::NonZeroExit { code } => *code,
            _ => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_codes() {
        let timeout = ExecutionError::Timeout { seconds: 1 };
        assert_eq!(timeout.to_string(), "command timed out after 1 seconds");
        assert_eq!(timeout.exit_code(), -1);

        let exit = ExecutionError::NonZeroExit { code: 3 };
        assert_eq!(exit.to_string(), "exit status 3");
        assert_eq!(exit.exit_code(), 3);

        let launch = ExecutionError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "no such file",
        ));
        assert_eq!(launch.to_string(), "no such file");
        assert_eq!(launch.exit_code(), -1);
    }
}
