use crate::error::BridgeError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Exact,
    Contains,
}

/// Which message wins when several match the subject inside one folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Latest `time received` wins.
    #[default]
    MostRecent,
    /// First message in the application's enumeration order wins.
    FirstMatch,
}

/// What the generated script does with the message it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    Open,
    Peek,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchCriteria {
    pub subject_text: String,
    pub match_mode: MatchMode,
    pub folder_name: String,
    pub message_identifier: Option<String>,
    pub candidate_folders: Vec<String>,
}

impl SearchCriteria {
    pub fn by_subject(subject: &str, match_mode: MatchMode, folders: &[String]) -> Self {
        Self {
            subject_text: subject.to_string(),
            match_mode,
            folder_name: folders.first().cloned().unwrap_or_default(),
            message_identifier: None,
            candidate_folders: folders.to_vec(),
        }
    }

    pub fn by_message_id(message_id: &str) -> Self {
        Self {
            message_identifier: Some(message_id.to_string()),
            ..Default::default()
        }
    }

    pub fn in_folder(subject: &str, folder: &str) -> Self {
        Self {
            subject_text: subject.to_string(),
            folder_name: folder.to_string(),
            ..Default::default()
        }
    }

    pub fn with_match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    pub fn with_message_id(mut self, message_id: Option<&str>) -> Self {
        self.message_identifier = message_id.map(|id| id.to_string());
        self
    }

    /// The identifier, if one was given and is not blank.
    pub fn identifier(&self) -> Option<&str> {
        self.message_identifier
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn has_subject(&self) -> bool {
        !self.subject_text.is_empty()
    }

    /// Folders to scan, in order. `candidate_folders` takes precedence over
    /// the single `folder_name`.
    pub fn folders(&self) -> Vec<&str> {
        if self.candidate_folders.is_empty() {
            if self.folder_name.is_empty() {
                Vec::new()
            } else {
                vec![self.folder_name.as_str()]
            }
        } else {
            self.candidate_folders.iter().map(String::as_str).collect()
        }
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if !self.has_subject() && self.identifier().is_none() {
            return Err(BridgeError::InvalidCriteria(
                "either a subject or a message identifier is required".to_string(),
            ));
        }
        if self.has_subject() && self.folders().is_empty() {
            return Err(BridgeError::InvalidCriteria(
                "subject search needs at least one folder".to_string(),
            ));
        }
        Ok(())
    }
}

/// Metadata of a matched message. The date is kept as the application's
/// own text and never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}

impl MessageRecord {
    pub fn is_empty(&self) -> bool {
        *self == MessageRecord::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub name: String,
    pub message_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(MessageRecord),
    NotFound,
    Error(BridgeError),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn record(&self) -> Option<&MessageRecord> {
        match self {
            SearchOutcome::Found(record) => Some(record),
            _ => None,
        }
    }
}
