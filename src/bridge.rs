//! Search orchestration: liveness gate, script planning, execution and
//! outcome mapping for every public bridge operation.
//!
//! Operations run strictly one command at a time. Folder-scoped searches
//! issue one script per candidate folder and stop at the first folder that
//! yields a match; nothing is aggregated across folders.

use crate::config::Config;
use crate::error::BridgeError;
use crate::executor::{execute, OsascriptRunner, ScriptRunner};
use crate::model::{FolderSummary, MatchMode, ScriptAction, SearchCriteria, SearchOutcome};
use crate::parser::{parse_folders, parse_outcome};
use crate::probe::{LivenessProbe, ProcessListProbe};
use crate::script::ScriptBuilder;
use std::sync::Arc;
use std::time::Duration;

pub struct MailBridge<P, R> {
    probe: P,
    runner: Arc<R>,
    builder: ScriptBuilder,
    timeout: Duration,
}

pub type OutlookBridge = MailBridge<ProcessListProbe<OsascriptRunner>, OsascriptRunner>;

impl OutlookBridge {
    pub fn from_config(config: &Config) -> Self {
        let runner = Arc::new(OsascriptRunner::new(&config.osascript_path));
        let builder = ScriptBuilder::new(&config.app_name, config.tie_break);
        let probe = ProcessListProbe::new(runner.clone(), &builder, config.timeout());
        MailBridge::new(probe, runner, builder, config.timeout())
    }
}

impl<P: LivenessProbe, R: ScriptRunner> MailBridge<P, R> {
    pub fn new(probe: P, runner: Arc<R>, builder: ScriptBuilder, timeout: Duration) -> Self {
        Self {
            probe,
            runner,
            builder,
            timeout,
        }
    }

    pub async fn is_running(&self) -> bool {
        self.probe.is_running().await
    }

    /// Open the best subject match from the first folder, in order, that
    /// has one.
    pub async fn open_by_subject(
        &self,
        subject: &str,
        match_mode: MatchMode,
        folders: &[String],
    ) -> SearchOutcome {
        let criteria = SearchCriteria::by_subject(subject, match_mode, folders);
        self.locate(&criteria, ScriptAction::Open).await
    }

    /// Open the first message anywhere whose source contains the identifier.
    pub async fn open_by_message_id(&self, message_id: &str) -> SearchOutcome {
        let criteria = SearchCriteria::by_message_id(message_id);
        self.locate(&criteria, ScriptAction::Open).await
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> SearchOutcome {
        self.locate(criteria, ScriptAction::Open).await
    }

    /// Same matching as [`MailBridge::search`] without opening the message.
    pub async fn find(&self, criteria: &SearchCriteria) -> SearchOutcome {
        self.locate(criteria, ScriptAction::Peek).await
    }

    /// Open a message by the numeric id the application itself assigns,
    /// as reported in the `ID` field of a previous match.
    pub async fn open_message(&self, internal_id: u64) -> SearchOutcome {
        if let Err(e) = self.ensure_running().await {
            return SearchOutcome::Error(e);
        }
        self.run_step(&self.builder.open_message(internal_id)).await
    }

    pub async fn list_folders(&self) -> Result<Vec<FolderSummary>, BridgeError> {
        self.ensure_running().await?;
        let output = execute(self.runner.as_ref(), &self.builder.list_folders(), self.timeout)
            .await
            .map_err(|e| BridgeError::from_execution(e, self.timeout.as_secs()))?;
        parse_folders(&output)
    }

    async fn ensure_running(&self) -> Result<(), BridgeError> {
        if self.probe.is_running().await {
            Ok(())
        } else {
            Err(BridgeError::NotRunning {
                app: self.builder.app_name().to_string(),
            })
        }
    }

    async fn locate(&self, criteria: &SearchCriteria, action: ScriptAction) -> SearchOutcome {
        if let Err(e) = self.ensure_running().await {
            return SearchOutcome::Error(e);
        }
        if let Err(e) = criteria.validate() {
            return SearchOutcome::Error(e);
        }

        let scripts = self.builder.build(criteria, action);
        let folders = criteria.folders();
        for (step, script) in scripts.iter().enumerate() {
            let scope = if criteria.has_subject() {
                folders.get(step).copied().unwrap_or("?")
            } else {
                "all messages"
            };
            log::debug!("Searching {scope}");

            match self.run_step(script).await {
                SearchOutcome::NotFound => {
                    log::debug!("No match in {scope}");
                }
                outcome => return outcome,
            }
        }

        SearchOutcome::NotFound
    }

    async fn run_step(&self, script: &str) -> SearchOutcome {
        match execute(self.runner.as_ref(), script, self.timeout).await {
            Ok(output) => parse_outcome(&output),
            Err(e) => SearchOutcome::Error(BridgeError::from_execution(e, self.timeout.as_secs())),
        }
    }
}
