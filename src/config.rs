use crate::model::TieBreak;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name as known to AppleScript and the process list.
    pub app_name: String,
    pub osascript_path: String,
    /// Upper bound for each automation command.
    pub timeout_seconds: u64,
    /// Folders scanned by `open` when none are given on the command line.
    pub default_folders: Vec<String>,
    pub tie_break: TieBreak,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            app_name: "Microsoft Outlook".to_string(),
            osascript_path: "osascript".to_string(),
            timeout_seconds: 15,
            default_folders: vec![
                "Inbox".to_string(),
                "Sent Items".to_string(),
                "Sent".to_string(),
            ],
            tie_break: TieBreak::MostRecent,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.app_name.trim().is_empty() {
            anyhow::bail!("app_name must not be empty");
        }
        if self.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
