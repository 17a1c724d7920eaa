//! Storage and event log configuration (`[storage]`, `[events]` sections)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Journal file; defaults to the user data directory
    pub journal: Option<PathBuf>,
    /// Keep records in memory only
    pub in_memory: bool,
}

impl FileStorageConfig {
    /// Where the journal lives, `None` when storage is in-memory
    pub fn journal_path(&self) -> Option<PathBuf> {
        if self.in_memory {
            return None;
        }
        self.journal.clone().or_else(Self::default_journal_path)
    }

    /// `$XDG_DATA_HOME/boomerang/decisions.jsonl`
    pub fn default_journal_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("boomerang").join("decisions.jsonl"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEventsConfig {
    /// JSONL event log; disabled when unset
    pub log: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_disables_journal() {
        let config = FileStorageConfig {
            journal: Some(PathBuf::from("/tmp/j.jsonl")),
            in_memory: true,
        };
        assert_eq!(config.journal_path(), None);
    }

    #[test]
    fn test_explicit_journal_wins() {
        let config = FileStorageConfig {
            journal: Some(PathBuf::from("/tmp/j.jsonl")),
            in_memory: false,
        };
        assert_eq!(config.journal_path(), Some(PathBuf::from("/tmp/j.jsonl")));
    }
}
