use thiserror::Error;

/// Failure while running an automation script, before any output is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionFailure {
    #[error("automation command timed out")]
    Timeout,
    #[error("failed to run automation command: {0}")]
    ProcessError(String),
    #[error("automation command exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("{app} is not running. Please start {app} first.")]
    NotRunning { app: String },

    #[error("automation command timed out after {seconds}s, please retry")]
    Timeout { seconds: u64 },

    #[error("{0}")]
    Execution(String),

    #[error("unrecognized response from automation command: {0:?}")]
    UnrecognizedResponse(String),

    /// The application trapped an error and reported it via `ERROR:<message>`.
    #[error("{0}")]
    Automation(String),

    #[error("invalid search criteria: {0}")]
    InvalidCriteria(String),
}

impl BridgeError {
    /// Map an executor failure onto the caller-visible taxonomy.
    pub fn from_execution(failure: ExecutionFailure, timeout_seconds: u64) -> Self {
        match failure {
            ExecutionFailure::Timeout => BridgeError::Timeout {
                seconds: timeout_seconds,
            },
            other => BridgeError::Execution(other.to_string()),
        }
    }
}
