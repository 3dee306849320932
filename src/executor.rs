use crate::error::ExecutionFailure;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Captured result of one finished automation process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RawCommandResult {
    /// Non-zero exit is fatal; otherwise stdout is trimmed at both ends and
    /// its inner lines are left alone.
    pub fn into_output(self) -> Result<String, ExecutionFailure> {
        if self.exit_code != 0 {
            return Err(ExecutionFailure::NonZeroExit {
                code: self.exit_code,
                stderr: self.stderr.trim().to_string(),
            });
        }
        if !self.stderr.trim().is_empty() {
            log::debug!("Automation stderr: {}", self.stderr.trim());
        }
        Ok(self.stdout.trim().to_string())
    }
}

/// Something that can run an automation script and hand back its output.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, script: &str) -> Result<String, ExecutionFailure>;
}

/// Runs scripts through `osascript -e`.
#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    program: String,
}

impl OsascriptRunner {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new("osascript")
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run(&self, script: &str) -> Result<String, ExecutionFailure> {
        // The child is killed if the caller's timeout drops this future.
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExecutionFailure::ProcessError(format!("{}: {e}", self.program)))?;

        RawCommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
        .into_output()
    }
}

/// Run a script with a hard upper bound on how long we wait for it.
pub async fn execute<R: ScriptRunner + ?Sized>(
    runner: &R,
    script: &str,
    timeout: Duration,
) -> Result<String, ExecutionFailure> {
    log::debug!("Running automation script:\n{script}");
    match tokio::time::timeout(timeout, runner.run(script)).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(failure)) => {
            log::warn!("Automation command failed: {failure}");
            Err(failure)
        }
        Err(_) => {
            log::warn!("Automation command timed out after {timeout:?}");
            Err(ExecutionFailure::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sleepy;

    #[async_trait]
    impl ScriptRunner for Sleepy {
        async fn run(&self, _script: &str) -> Result<String, ExecutionFailure> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("SUCCESS".to_string())
        }
    }

    #[test]
    fn test_zero_exit_trims_but_keeps_lines() {
        let result = RawCommandResult {
            exit_code: 0,
            stdout: "\n  Inbox|3\nSent|1  \n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(result.into_output().unwrap(), "Inbox|3\nSent|1");
    }

    #[test]
    fn test_non_zero_exit_is_fatal_even_with_stdout() {
        let result = RawCommandResult {
            exit_code: 1,
            stdout: "SUCCESS".to_string(),
            stderr: "execution error: Not authorized (-1743)\n".to_string(),
        };
        assert_eq!(
            result.into_output(),
            Err(ExecutionFailure::NonZeroExit {
                code: 1,
                stderr: "execution error: Not authorized (-1743)".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_execute_times_out() {
        let started = std::time::Instant::now();
        let result = execute(&Sleepy, "delay 60", Duration::from_millis(50)).await;
        assert_eq!(result, Err(ExecutionFailure::Timeout));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_missing_program_is_a_process_error() {
        let runner = OsascriptRunner::new("/nonexistent/osascript-for-tests");
        match execute(&runner, "return 1", Duration::from_secs(5)).await {
            Err(ExecutionFailure::ProcessError(message)) => {
                assert!(message.contains("/nonexistent/osascript-for-tests"))
            }
            other => panic!("Expected process error, got {other:?}"),
        }
    }
}
