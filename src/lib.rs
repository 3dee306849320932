pub mod bridge;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod parser;
pub mod probe;
pub mod script;

#[cfg(test)]
mod bridge_test;

pub use bridge::{MailBridge, OutlookBridge};
pub use config::Config;
pub use error::{BridgeError, ExecutionFailure};
pub use model::{
    FolderSummary, MatchMode, MessageRecord, ScriptAction, SearchCriteria, SearchOutcome, TieBreak,
};
