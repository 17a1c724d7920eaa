//! JSONL file writer for Boomerang events.
//!
//! Each [`BoomerangEvent`] is written as a single JSON line: the event
//! payload with `type` and `timestamp` fields added, appended via a buffered
//! writer.

use boomerang_application::BoomerangEventSink;
use boomerang_domain::BoomerangEvent;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Event sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlEventLog {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventLog {
    /// Open the log for appending.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create event log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open event log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: &BoomerangEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match event.payload() {
            Value::Object(mut map) => {
                map.insert("type".to_string(), Value::String(event.name().to_string()));
                map.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(map)
            }
            other => serde_json::json!({
                "type": event.name(),
                "timestamp": timestamp,
                "data": other,
            }),
        }
    }
}

impl BoomerangEventSink for JsonlEventLog {
    fn emit(&self, event: &BoomerangEvent) {
        let Ok(line) = serde_json::to_string(&Self::record(event)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventLog {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boomerang_domain::Severity;
    use uuid::Uuid;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_event_log_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.events.jsonl");
        let log = JsonlEventLog::new(&path).unwrap();
        let subject_id = Uuid::new_v4();

        log.emit(&BoomerangEvent::BoomerangStart { subject_id });
        log.emit(&BoomerangEvent::AxiomChallenge {
            challenge_text: "Where is the evidence?".to_string(),
            severity: Severity::High,
            targeted_agents: vec!["vela".to_string()],
            evidence_needed: "ROI figures".to_string(),
        });
        drop(log);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        for line in &lines {
            assert!(line.get("timestamp").is_some());
        }

        assert_eq!(lines[0]["type"], "boomerang_start");
        assert_eq!(lines[0]["subject_id"], subject_id.to_string());
        assert_eq!(lines[1]["type"], "axiom_challenge");
        assert_eq!(lines[1]["severity"], "high");
        assert_eq!(lines[1]["targeted_agents"][0], "vela");
    }

    #[test]
    fn test_event_log_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");

        for _ in 0..2 {
            let log = JsonlEventLog::new(&path).unwrap();
            log.emit(&BoomerangEvent::Error {
                error: "All specialist agents failed".to_string(),
            });
        }

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["error"], "All specialist agents failed");
    }
}
