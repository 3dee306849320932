//! Bridge scenario tests
//!
//! Drive the orchestrator end to end with in-memory probes and runners, so no
//! real application or `osascript` is needed.

use crate::bridge::MailBridge;
use crate::error::{BridgeError, ExecutionFailure};
use crate::executor::ScriptRunner;
use crate::model::{FolderSummary, MatchMode, SearchCriteria, SearchOutcome, TieBreak};
use crate::probe::LivenessProbe;
use crate::script::ScriptBuilder;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct StaticProbe(bool);

#[async_trait]
impl LivenessProbe for StaticProbe {
    async fn is_running(&self) -> bool {
        self.0
    }
}

type Responder = Box<dyn Fn(&str) -> Result<String, ExecutionFailure> + Send + Sync>;

/// Records every script it receives and answers through `respond`.
struct RecordingRunner {
    scripts: Mutex<Vec<String>>,
    respond: Responder,
}

impl RecordingRunner {
    fn new(respond: impl Fn(&str) -> Result<String, ExecutionFailure> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn calls(&self) -> usize {
        self.scripts.lock().unwrap().len()
    }

    fn script(&self, index: usize) -> String {
        self.scripts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl ScriptRunner for RecordingRunner {
    async fn run(&self, script: &str) -> Result<String, ExecutionFailure> {
        self.scripts.lock().unwrap().push(script.to_string());
        (self.respond)(script)
    }
}

struct HangingRunner;

#[async_trait]
impl ScriptRunner for HangingRunner {
    async fn run(&self, _script: &str) -> Result<String, ExecutionFailure> {
        tokio::time::sleep(Duration::from_secs(300)).await;
        Ok("SUCCESS".to_string())
    }
}

fn bridge<R: ScriptRunner>(running: bool, runner: Arc<R>) -> MailBridge<StaticProbe, R> {
    MailBridge::new(
        StaticProbe(running),
        runner,
        ScriptBuilder::new("Microsoft Outlook", TieBreak::MostRecent),
        Duration::from_secs(15),
    )
}

fn folders(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn searches_folder(script: &str, folder: &str) -> bool {
    script.contains(&format!("if name of aFolder is \"{folder}\""))
}

#[tokio::test]
async fn test_not_running_short_circuits_without_executing() {
    let runner = RecordingRunner::new(|_| Ok("SUCCESS".to_string()));
    let bridge = bridge(false, runner.clone());

    let outcome = bridge
        .open_by_subject("Quarterly report", MatchMode::Contains, &folders(&["Inbox"]))
        .await;
    assert_eq!(
        outcome,
        SearchOutcome::Error(BridgeError::NotRunning {
            app: "Microsoft Outlook".to_string()
        })
    );

    assert!(matches!(
        bridge.open_by_message_id("<a@b>").await,
        SearchOutcome::Error(BridgeError::NotRunning { .. })
    ));
    assert!(matches!(
        bridge.open_message(7).await,
        SearchOutcome::Error(BridgeError::NotRunning { .. })
    ));
    assert!(matches!(
        bridge.list_folders().await,
        Err(BridgeError::NotRunning { .. })
    ));

    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_hanging_command_times_out() {
    let bridge = MailBridge::new(
        StaticProbe(true),
        Arc::new(HangingRunner),
        ScriptBuilder::new("Microsoft Outlook", TieBreak::MostRecent),
        Duration::from_millis(50),
    );

    let outcome = bridge
        .open_by_subject("Quarterly report", MatchMode::Exact, &folders(&["Inbox", "Sent"]))
        .await;
    assert!(matches!(
        outcome,
        SearchOutcome::Error(BridgeError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_first_matching_folder_wins() {
    let runner = RecordingRunner::new(|script| {
        let folder = if searches_folder(script, "A") { "A" } else { "B" };
        Ok(format!(
            "SUCCESS|SUBJECT:Status update|SENDER:{folder}@example.com|DATE:Monday|ID:1|FOLDER:{folder}"
        ))
    });
    let bridge = bridge(true, runner.clone());

    let outcome = bridge
        .open_by_subject("Status", MatchMode::Contains, &folders(&["A", "B"]))
        .await;

    let record = outcome.record().expect("expected a match");
    assert_eq!(record.folder.as_deref(), Some("A"));
    assert_eq!(record.sender.as_deref(), Some("A@example.com"));
    assert_eq!(runner.calls(), 1);
    assert!(searches_folder(&runner.script(0), "A"));
}

#[tokio::test]
async fn test_not_found_moves_on_to_next_folder() {
    let runner = RecordingRunner::new(|script| {
        if searches_folder(script, "Sent Items") {
            Ok("SUCCESS|SUBJECT:Offer letter|FOLDER:Sent Items".to_string())
        } else {
            Ok("NOTFOUND".to_string())
        }
    });
    let bridge = bridge(true, runner.clone());

    let outcome = bridge
        .open_by_subject(
            "Offer letter",
            MatchMode::Exact,
            &folders(&["Inbox", "Sent Items", "Sent"]),
        )
        .await;

    assert_eq!(
        outcome.record().and_then(|r| r.folder.as_deref()),
        Some("Sent Items")
    );
    assert_eq!(runner.calls(), 2);
}

#[tokio::test]
async fn test_no_folder_matches() {
    let runner = RecordingRunner::new(|_| Ok("NOTFOUND".to_string()));
    let bridge = bridge(true, runner.clone());

    let outcome = bridge
        .open_by_subject("Nothing", MatchMode::Contains, &folders(&["Inbox", "Sent Items", "Sent"]))
        .await;

    assert_eq!(outcome, SearchOutcome::NotFound);
    assert_eq!(runner.calls(), 3);
}

#[tokio::test]
async fn test_error_stops_folder_scan() {
    let runner = RecordingRunner::new(|_| Ok("ERROR:Outlook got an error: Can't continue.".to_string()));
    let bridge = bridge(true, runner.clone());

    let outcome = bridge
        .open_by_subject("Anything", MatchMode::Contains, &folders(&["Inbox", "Sent"]))
        .await;

    assert_eq!(
        outcome,
        SearchOutcome::Error(BridgeError::Automation(
            "Outlook got an error: Can't continue.".to_string()
        ))
    );
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_open_by_message_id_scans_all_messages_once() {
    let runner = RecordingRunner::new(|_| Ok("SUCCESS".to_string()));
    let bridge = bridge(true, runner.clone());

    let outcome = bridge.open_by_message_id("<CAF123@mail.example.com>").await;

    assert_eq!(outcome, SearchOutcome::Found(Default::default()));
    assert_eq!(runner.calls(), 1);
    let script = runner.script(0);
    assert!(script.contains("repeat with aMessage in (every message)"));
    assert!(script.contains(r#"contains "CAF123@mail.example.com""#));
    assert!(script.contains("open foundMessage"));
}

#[tokio::test]
async fn test_search_with_identifier_correlates_inside_folder() {
    let runner = RecordingRunner::new(|_| {
        Ok("SUCCESS|SUBJECT:Invoice 7|SENDER:billing@example.com|DATE:Friday|ID:991|FOLDER:Inbox".to_string())
    });
    let bridge = bridge(true, runner.clone());
    let criteria = SearchCriteria::in_folder("Invoice", "Inbox")
        .with_match_mode(MatchMode::Contains)
        .with_message_id(Some("<inv-7@example.com>"));

    let outcome = bridge.search(&criteria).await;

    assert_eq!(
        outcome.record().and_then(|r| r.message_id.as_deref()),
        Some("991")
    );
    let script = runner.script(0);
    assert!(script.contains(r#"whose subject contains "Invoice""#));
    assert!(script.contains(r#"(source of aMessage) contains "inv-7@example.com""#));
}

#[tokio::test]
async fn test_find_does_not_open() {
    let runner = RecordingRunner::new(|_| Ok("SUCCESS|SUBJECT:Hi|ID:5".to_string()));
    let bridge = bridge(true, runner.clone());

    let outcome = bridge.find(&SearchCriteria::in_folder("Hi", "Inbox")).await;

    assert!(outcome.is_found());
    assert!(!runner.script(0).contains("open foundMessage"));
}

#[tokio::test]
async fn test_invalid_criteria_never_reach_the_runner() {
    let runner = RecordingRunner::new(|_| Ok("SUCCESS".to_string()));
    let bridge = bridge(true, runner.clone());

    let outcome = bridge.search(&SearchCriteria::default()).await;

    assert!(matches!(
        outcome,
        SearchOutcome::Error(BridgeError::InvalidCriteria(_))
    ));
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_execution_failures_become_errors() {
    let runner = RecordingRunner::new(|_| {
        Err(ExecutionFailure::NonZeroExit {
            code: 1,
            stderr: "Not authorized to send Apple events to Microsoft Outlook. (-1743)".to_string(),
        })
    });
    let bridge = bridge(true, runner.clone());

    match bridge.open_message(42).await {
        SearchOutcome::Error(BridgeError::Execution(message)) => {
            assert!(message.contains("-1743"))
        }
        other => panic!("Expected execution error, got {other:?}"),
    }
    assert!(runner.script(0).contains("message id 42"));
}

#[tokio::test]
async fn test_unrecognized_output_is_not_success() {
    let runner = RecordingRunner::new(|_| Ok(String::new()));
    let bridge = bridge(true, runner);

    let outcome = bridge
        .open_by_subject("Hi", MatchMode::Exact, &folders(&["Inbox"]))
        .await;
    assert!(matches!(
        outcome,
        SearchOutcome::Error(BridgeError::UnrecognizedResponse(_))
    ));
}

#[tokio::test]
async fn test_list_folders() {
    let runner = RecordingRunner::new(|_| Ok("Inbox|42\nSent|7\nBad|notanum".to_string()));
    let bridge = bridge(true, runner.clone());

    let listing = bridge.list_folders().await.unwrap();

    assert_eq!(
        listing,
        vec![
            FolderSummary {
                name: "Inbox".to_string(),
                message_count: 42
            },
            FolderSummary {
                name: "Sent".to_string(),
                message_count: 7
            },
        ]
    );
    assert_eq!(runner.calls(), 1);
}
