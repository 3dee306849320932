use crate::executor::{execute, ScriptRunner};
use crate::script::ScriptBuilder;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Whether the target application is running. Never fails: anything
    /// other than a clear "true" counts as not running.
    async fn is_running(&self) -> bool;
}

/// Asks System Events whether the application's process is in the process
/// list, using the same runner that carries the search scripts.
pub struct ProcessListProbe<R> {
    runner: Arc<R>,
    script: String,
    timeout: Duration,
}

impl<R: ScriptRunner> ProcessListProbe<R> {
    pub fn new(runner: Arc<R>, builder: &ScriptBuilder, timeout: Duration) -> Self {
        Self {
            runner,
            script: builder.liveness(),
            timeout,
        }
    }
}

#[async_trait]
impl<R: ScriptRunner> LivenessProbe for ProcessListProbe<R> {
    async fn is_running(&self) -> bool {
        match execute(self.runner.as_ref(), &self.script, self.timeout).await {
            Ok(output) => output == "true",
            Err(failure) => {
                log::warn!("Liveness check failed, assuming not running: {failure}");
                false
            }
        }
    }
}
