use crate::error::BridgeError;
use crate::model::{FolderSummary, MessageRecord, SearchOutcome};

const SUCCESS: &str = "SUCCESS";
const SUCCESS_WITH_DATA: &str = "SUCCESS|";
const NOT_FOUND: &str = "NOTFOUND";
const ERROR_PREFIX: &str = "ERROR:";

/// Interpret the trimmed output of a search script.
pub fn parse_outcome(text: &str) -> SearchOutcome {
    if text == SUCCESS {
        SearchOutcome::Found(MessageRecord::default())
    } else if let Some(payload) = text.strip_prefix(SUCCESS_WITH_DATA) {
        SearchOutcome::Found(parse_record(payload))
    } else if text == NOT_FOUND {
        SearchOutcome::NotFound
    } else if let Some(message) = text.strip_prefix(ERROR_PREFIX) {
        SearchOutcome::Error(BridgeError::Automation(message.to_string()))
    } else {
        log::debug!("Unrecognized script output: {text:?}");
        SearchOutcome::Error(BridgeError::UnrecognizedResponse(text.to_string()))
    }
}

/// Decode `KEY:value|KEY:value` segments. Keys are case-insensitive; values
/// keep everything after the first colon. Unknown keys and segments without
/// a colon are ignored.
pub fn parse_record(payload: &str) -> MessageRecord {
    let mut record = MessageRecord::default();

    for segment in payload.split('|') {
        let Some((key, value)) = segment.split_once(':') else {
            continue;
        };
        let value = Some(value.to_string());
        match key.trim().to_lowercase().as_str() {
            "subject" => record.subject = value,
            "sender" => record.sender = value,
            "date" => record.date = value,
            "id" => record.message_id = value,
            "folder" => record.folder = value,
            other => log::debug!("Ignoring unknown result key: {other}"),
        }
    }

    record
}

/// Decode a `<name>|<count>` listing. Names may contain `|`, so each line is
/// split on the last one; lines whose count is not a number are skipped.
pub fn parse_folders(text: &str) -> Result<Vec<FolderSummary>, BridgeError> {
    if let Some(message) = text.strip_prefix(ERROR_PREFIX) {
        return Err(BridgeError::Automation(message.to_string()));
    }

    let mut folders = Vec::new();
    for line in text.lines() {
        let Some((name, count)) = line.rsplit_once('|') else {
            continue;
        };
        match count.trim().parse::<u64>() {
            Ok(message_count) => folders.push(FolderSummary {
                name: name.to_string(),
                message_count,
            }),
            Err(_) => log::debug!("Skipping folder line with bad count: {line:?}"),
        }
    }

    Ok(folders)
}
