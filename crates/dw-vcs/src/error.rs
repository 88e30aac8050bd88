//! VCS error types.

use std::io;

/// Error returned by [`VcsCommandRunner`](crate::VcsCommandRunner) operations.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// The command ran and exited unsuccessfully.
    #[error("`{command}` failed ({}): {stderr}", exit_label(.status.as_ref()))]
    ProcessFailed {
        /// Command line that was executed.
        command: String,
        /// Exit code, if the process was not killed by a signal.
        status: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
    /// The command could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        /// Command line that was attempted.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl VcsError {
    /// Whether the subprocess ran and reported failure.
    #[must_use]
    pub fn is_process_failure(&self) -> bool {
        matches!(self, Self::ProcessFailed { .. })
    }

    /// The command line associated with the failure.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::ProcessFailed { command, .. } | Self::Spawn { command, .. } => command,
        }
    }
}

fn exit_label(status: Option<&i32>) -> String {
    status.map_or_else(
        || "terminated by signal".to_owned(),
        |code| format!("exit code {code}"),
    )
}
