//! AppleScript generation for the Outlook automation bridge.
//!
//! Every script produced here ends by returning exactly one line-protocol
//! token (`SUCCESS`, `SUCCESS|...`, `NOTFOUND`, `ERROR:...`), or a folder
//! listing for [`ScriptBuilder::list_folders`]. All user-supplied text goes
//! through [`escape_applescript`] before it is interpolated.

use crate::model::{MatchMode, ScriptAction, SearchCriteria, TieBreak};

/// Escape a value for use inside an AppleScript string literal.
/// Backslashes are doubled before quotes are escaped so that the quote's
/// own escape character is never doubled.
pub fn escape_applescript(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Message-ID headers are usually given as `<local@domain>`; the angle
/// brackets are dropped so the bare id matches however the header is folded.
pub fn normalize_message_id(message_id: &str) -> String {
    message_id.trim().replace(['<', '>'], "")
}

#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    app_name: String,
    tie_break: TieBreak,
}

impl ScriptBuilder {
    pub fn new(app_name: &str, tie_break: TieBreak) -> Self {
        Self {
            app_name: app_name.to_string(),
            tie_break,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Read-only System Events query; prints `true` or `false`.
    pub fn liveness(&self) -> String {
        format!(
            r#"tell application "System Events"
    return (name of processes) contains "{app}"
end tell"#,
            app = escape_applescript(&self.app_name)
        )
    }

    /// One script per scan step, in scan order: a single whole-store scan
    /// for identifier-only criteria, otherwise one script per folder.
    pub fn build(&self, criteria: &SearchCriteria, action: ScriptAction) -> Vec<String> {
        if !criteria.has_subject() {
            return match criteria.identifier() {
                Some(identifier) => vec![self.identifier_scan(identifier, action)],
                None => Vec::new(),
            };
        }

        criteria
            .folders()
            .into_iter()
            .map(|folder| self.folder_search(criteria, folder, action))
            .collect()
    }

    /// Search one folder (every folder with that exact name, across accounts)
    /// for messages matching the subject, correlating by message identifier
    /// when one is given.
    pub fn folder_search(
        &self,
        criteria: &SearchCriteria,
        folder: &str,
        action: ScriptAction,
    ) -> String {
        let subject = escape_applescript(&criteria.subject_text);
        let folder = escape_applescript(folder);
        let condition = match criteria.match_mode {
            MatchMode::Exact => format!(r#"subject is "{subject}""#),
            MatchMode::Contains => format!(r#"subject contains "{subject}""#),
        };

        let correlation = match criteria.identifier() {
            Some(identifier) => format!(
                r#"
                    repeat with aMessage in matchingMessages
                        try
                            if (source of aMessage) contains "{id}" then
                                set foundMessage to contents of aMessage
                                exit repeat
                            end if
                        end try
                    end repeat"#,
                id = escape_applescript(&normalize_message_id(identifier))
            ),
            None => String::new(),
        };

        let selection = match self.tie_break {
            TieBreak::MostRecent => {
                r#"
                    if foundMessage is missing value then
                        set mostRecentDate to missing value
                        repeat with aMessage in matchingMessages
                            set msgDate to time received of aMessage
                            if mostRecentDate is missing value or msgDate > mostRecentDate then
                                set mostRecentDate to msgDate
                                set foundMessage to contents of aMessage
                            end if
                        end repeat
                    end if"#
            }
            TieBreak::FirstMatch => {
                r#"
                    if foundMessage is missing value then
                        set foundMessage to item 1 of matchingMessages
                    end if"#
            }
        };

        format!(
            r#"tell application "{app}"
    try
        set foundMessage to missing value
        repeat with aFolder in (get every mail folder)
            if name of aFolder is "{folder}" then
                set matchingMessages to (messages of aFolder whose {condition})
                if (count of matchingMessages) > 0 then{correlation}{selection}
                end if
            end if
            if foundMessage is not missing value then exit repeat
        end repeat
        if foundMessage is missing value then return "NOTFOUND"
{report}
    on error errMsg
        return "ERROR:" & errMsg
    end try
end tell"#,
            app = escape_applescript(&self.app_name),
            report = report_found(action, Some(folder.as_str())),
        )
    }

    /// Scan every message in the store and take the first whose raw source
    /// contains the identifier.
    pub fn identifier_scan(&self, identifier: &str, action: ScriptAction) -> String {
        format!(
            r#"tell application "{app}"
    try
        set foundMessage to missing value
        repeat with aMessage in (every message)
            try
                if (source of aMessage) contains "{id}" then
                    set foundMessage to contents of aMessage
                    exit repeat
                end if
            end try
        end repeat
        if foundMessage is missing value then return "NOTFOUND"
{report}
    on error errMsg
        return "ERROR:" & errMsg
    end try
end tell"#,
            app = escape_applescript(&self.app_name),
            id = escape_applescript(&normalize_message_id(identifier)),
            report = report_found(action, None),
        )
    }

    /// Open a message by the application's own numeric id.
    pub fn open_message(&self, internal_id: u64) -> String {
        format!(
            r#"tell application "{app}"
    try
        set foundMessage to message id {internal_id}
{report}
    on error errMsg
        return "ERROR:" & errMsg
    end try
end tell"#,
            app = escape_applescript(&self.app_name),
            report = report_found(ScriptAction::Open, None),
        )
    }

    /// Every mail folder as `<name>|<count>`, one per line.
    pub fn list_folders(&self) -> String {
        format!(
            r#"tell application "{app}"
    set folderInfo to {{}}
    try
        repeat with aFolder in (get every mail folder)
            set end of folderInfo to (name of aFolder) & "|" & (count messages of aFolder)
        end repeat
        set AppleScript's text item delimiters to linefeed
        set resultText to folderInfo as text
        set AppleScript's text item delimiters to ""
        return resultText
    on error errMsg
        set AppleScript's text item delimiters to ""
        return "ERROR:" & errMsg
    end try
end tell"#,
            app = escape_applescript(&self.app_name)
        )
    }
}

/// Tail shared by every search script once `foundMessage` is set. `folder`
/// must already be escaped.
fn report_found(action: ScriptAction, folder: Option<&str>) -> String {
    let open = match action {
        ScriptAction::Open => "        open foundMessage\n        activate\n",
        ScriptAction::Peek => "",
    };
    let folder_field = match folder {
        Some(folder) => format!(r#" & "|FOLDER:{folder}""#),
        None => String::new(),
    };

    // Metadata is best effort: a message without a sender still counts as found.
    format!(
        r#"{open}        try
            return "SUCCESS|SUBJECT:" & (subject of foundMessage) & "|SENDER:" & (address of (sender of foundMessage)) & "|DATE:" & ((time received of foundMessage) as string) & "|ID:" & ((id of foundMessage) as string){folder_field}
        on error
            return "SUCCESS"
        end try"#
    )
}
