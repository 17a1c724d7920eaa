//! Journaled decision store
//!
//! Keeps every record in memory behind an async mutex and, when opened with
//! a path, appends each write to a JSONL journal first. Opening an existing
//! journal replays it, so audits and re-challenges work across runs.

use async_trait::async_trait;
use boomerang_application::{DecisionRepository, RepositoryError};
use boomerang_domain::{ChallengeRecord, SessionRecord, UsageRecord, VerdictRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One journal line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum JournalEntry {
    Session(SessionRecord),
    Challenge(ChallengeRecord),
    Verdict {
        challenge_id: Uuid,
        verdict: VerdictRecord,
    },
    Usage(UsageRecord),
}

#[derive(Default)]
struct State {
    sessions: Vec<SessionRecord>,
    challenges: Vec<ChallengeRecord>,
    usage: Vec<UsageRecord>,
    journal: Option<BufWriter<File>>,
}

impl State {
    fn check_verdict(&self, challenge_id: Uuid) -> Result<usize, RepositoryError> {
        let index = self
            .challenges
            .iter()
            .position(|c| c.id == challenge_id)
            .ok_or(RepositoryError::ChallengeNotFound(challenge_id))?;
        if self.challenges[index].verdict.is_some() {
            return Err(RepositoryError::VerdictExists(challenge_id));
        }
        Ok(index)
    }

    /// Apply an entry that is already durable (or replayed)
    fn apply(&mut self, entry: JournalEntry) -> Result<(), RepositoryError> {
        match entry {
            JournalEntry::Session(record) => self.sessions.push(record),
            JournalEntry::Challenge(record) => self.challenges.push(record),
            JournalEntry::Verdict {
                challenge_id,
                verdict,
            } => {
                let index = self.check_verdict(challenge_id)?;
                self.challenges[index].verdict = Some(verdict);
            }
            JournalEntry::Usage(record) => self.usage.push(record),
        }
        Ok(())
    }

    /// Blocking write, made while the store lock is held. Each entry is a
    /// single flushed line, and journal order always matches apply order.
    fn append(&mut self, entry: &JournalEntry) -> Result<(), RepositoryError> {
        let Some(journal) = self.journal.as_mut() else {
            return Ok(());
        };
        let line =
            serde_json::to_string(entry).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        writeln!(journal, "{}", line)
            .and_then(|_| journal.flush())
            .map_err(|e| RepositoryError::Storage(e.to_string()))
    }

    /// Journal first, then apply
    fn write(&mut self, entry: JournalEntry) -> Result<(), RepositoryError> {
        self.append(&entry)?;
        self.apply(entry)
    }
}

/// [`DecisionRepository`] adapter
pub struct DecisionStore {
    state: Mutex<State>,
    path: Option<PathBuf>,
}

impl DecisionStore {
    /// A store that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(State::default()),
            path: None,
        }
    }

    /// Open (or create) a journal at `path` and replay it.
    ///
    /// Lines that fail to parse are skipped with a warning; a crash can
    /// leave a partial last line behind.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                RepositoryError::Storage(format!("{}: {}", parent.display(), e))
            })?;
        }

        let mut state = State::default();
        if path.exists() {
            let file = File::open(path)
                .map_err(|e| RepositoryError::Storage(format!("{}: {}", path.display(), e)))?;
            let mut replayed = 0usize;
            for (number, line) in BufReader::new(file).lines().enumerate() {
                let line = line.map_err(|e| RepositoryError::Storage(e.to_string()))?;
                if line.trim().is_empty() {
                    continue;
                }
                let entry = match serde_json::from_str::<JournalEntry>(&line) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping journal line {} of {}: {}", number + 1, path.display(), e);
                        continue;
                    }
                };
                if let Err(e) = state.apply(entry) {
                    warn!("Skipping journal line {} of {}: {}", number + 1, path.display(), e);
                    continue;
                }
                replayed += 1;
            }
            info!("Replayed {} journal entries from {}", replayed, path.display());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| RepositoryError::Storage(format!("{}: {}", path.display(), e)))?;
        state.journal = Some(BufWriter::new(file));

        Ok(Self {
            state: Mutex::new(state),
            path: Some(path.to_path_buf()),
        })
    }

    /// Journal location, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    pub async fn usage_records(&self) -> Vec<UsageRecord> {
        self.state.lock().await.usage.clone()
    }
}

#[async_trait]
impl DecisionRepository for DecisionStore {
    async fn insert_session(&self, record: SessionRecord) -> Result<Uuid, RepositoryError> {
        let id = record.id;
        debug!("insert_session {} agent={} kind={}", id, record.agent, record.kind);
        self.state.lock().await.write(JournalEntry::Session(record))?;
        Ok(id)
    }

    async fn insert_challenge(&self, record: ChallengeRecord) -> Result<Uuid, RepositoryError> {
        let id = record.id;
        self.state
            .lock()
            .await
            .write(JournalEntry::Challenge(record))?;
        Ok(id)
    }

    async fn insert_verdict(
        &self,
        challenge_id: Uuid,
        verdict: VerdictRecord,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        // Reject before journaling so replay never sees a duplicate
        state.check_verdict(challenge_id)?;
        state.write(JournalEntry::Verdict {
            challenge_id,
            verdict,
        })
    }

    async fn insert_usage(&self, record: UsageRecord) -> Result<(), RepositoryError> {
        self.state.lock().await.write(JournalEntry::Usage(record))
    }

    async fn latest_sessions_per_agent(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<SessionRecord>, RepositoryError> {
        let state = self.state.lock().await;
        let mut order: Vec<&str> = Vec::new();
        let mut latest: HashMap<&str, &SessionRecord> = HashMap::new();

        for record in &state.sessions {
            if record.subject_id != subject_id || !record.kind.is_opinion() {
                continue;
            }
            if !latest.contains_key(record.agent.as_str()) {
                order.push(&record.agent);
            }
            let newer = latest
                .get(record.agent.as_str())
                .is_none_or(|existing| existing.created_at <= record.created_at);
            if newer {
                latest.insert(&record.agent, record);
            }
        }

        Ok(order
            .into_iter()
            .filter_map(|agent| latest.get(agent).map(|r| (*r).clone()))
            .collect())
    }

    async fn challenges_ordered(
        &self,
        subject_id: Uuid,
    ) -> Result<Vec<ChallengeRecord>, RepositoryError> {
        let state = self.state.lock().await;
        let mut challenges: Vec<ChallengeRecord> = state
            .challenges
            .iter()
            .filter(|c| c.subject_id == subject_id)
            .cloned()
            .collect();
        challenges.sort_by_key(|c| c.created_at);
        Ok(challenges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boomerang_domain::{CallKind, Challenge, Resolution, Severity, Verdict};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn session(subject: Uuid, agent: &str, kind: CallKind, content: &str) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            subject_id: subject,
            agent: agent.to_string(),
            kind,
            model: "claude-haiku-4-5-20251001".to_string(),
            prompt_version: "v1".to_string(),
            input_tokens: 100,
            output_tokens: 50,
            cost_cents: 0.0088,
            request_payload: json!({"type": kind.as_str(), "prompt": "p"}),
            response_payload: json!({"content": content}),
            duration_ms: 12,
            created_at: Utc::now(),
        }
    }

    fn challenge(subject: Uuid) -> ChallengeRecord {
        ChallengeRecord::new(
            subject,
            Uuid::new_v4(),
            &Challenge {
                challenge_text: "Prove the ROI".to_string(),
                severity: Severity::High,
                targeted_agents: vec!["vela".to_string()],
                evidence_needed: "Cost model".to_string(),
            },
        )
    }

    fn verdict() -> VerdictRecord {
        VerdictRecord::new(
            Verdict {
                resolution: Resolution::AcceptedRisk,
                resolution_text: "Risk noted".to_string(),
            },
            Uuid::new_v4(),
        )
    }

    #[tokio::test]
    async fn test_latest_session_ignores_rebuttals_and_older_opinions() {
        let store = DecisionStore::in_memory();
        let subject = Uuid::new_v4();

        let mut old = session(subject, "vela", CallKind::Specialist, "old");
        old.created_at = Utc::now() - Duration::seconds(60);
        store.insert_session(old).await.unwrap();
        store
            .insert_session(session(subject, "vela", CallKind::Chat, "new"))
            .await
            .unwrap();
        store
            .insert_session(session(subject, "vela", CallKind::ChallengeResponse, "rebuttal"))
            .await
            .unwrap();
        store
            .insert_session(session(Uuid::new_v4(), "vela", CallKind::Specialist, "other"))
            .await
            .unwrap();

        let latest = store.latest_sessions_per_agent(subject).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].content(), "new");
    }

    #[tokio::test]
    async fn test_verdict_rules() {
        let store = DecisionStore::in_memory();
        let subject = Uuid::new_v4();
        let id = store.insert_challenge(challenge(subject)).await.unwrap();

        store.insert_verdict(id, verdict()).await.unwrap();
        assert_eq!(
            store.insert_verdict(id, verdict()).await.unwrap_err(),
            RepositoryError::VerdictExists(id)
        );

        let missing = Uuid::new_v4();
        assert_eq!(
            store.insert_verdict(missing, verdict()).await.unwrap_err(),
            RepositoryError::ChallengeNotFound(missing)
        );

        let challenges = store.challenges_ordered(subject).await.unwrap();
        assert!(challenges[0].is_resolved());
    }

    #[tokio::test]
    async fn test_challenges_sorted_by_creation() {
        let store = DecisionStore::in_memory();
        let subject = Uuid::new_v4();

        let mut late = challenge(subject);
        late.challenge_text = "late".to_string();
        late.created_at = Utc::now() + Duration::seconds(5);
        store.insert_challenge(late).await.unwrap();
        let mut early = challenge(subject);
        early.challenge_text = "early".to_string();
        store.insert_challenge(early).await.unwrap();

        let texts: Vec<String> = store
            .challenges_ordered(subject)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.challenge_text)
            .collect();
        assert_eq!(texts, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_journal_replays_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("decisions.jsonl");
        let subject = Uuid::new_v4();

        {
            let store = DecisionStore::open(&path).unwrap();
            store
                .insert_session(session(subject, "lyra", CallKind::Specialist, "goal analysis"))
                .await
                .unwrap();
            let id = store.insert_challenge(challenge(subject)).await.unwrap();
            store.insert_verdict(id, verdict()).await.unwrap();
        }

        let reopened = DecisionStore::open(&path).unwrap();
        assert_eq!(reopened.path(), Some(path.as_path()));
        let latest = reopened.latest_sessions_per_agent(subject).await.unwrap();
        assert_eq!(latest[0].content(), "goal analysis");

        let challenges = reopened.challenges_ordered(subject).await.unwrap();
        assert_eq!(challenges.len(), 1);
        assert_eq!(
            challenges[0].verdict.as_ref().unwrap().resolution,
            Resolution::AcceptedRisk
        );
    }

    #[tokio::test]
    async fn test_journal_skips_corrupt_tail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let subject = Uuid::new_v4();

        {
            let store = DecisionStore::open(&path).unwrap();
            store
                .insert_session(session(subject, "dex", CallKind::Specialist, "reqs"))
                .await
                .unwrap();
        }
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        write!(file, "{{\"record\":\"session\",\"id\":").unwrap();
        drop(file);

        let reopened = DecisionStore::open(&path).unwrap();
        assert_eq!(reopened.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_usage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let record = UsageRecord {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            service: "boomerang".to_string(),
            model: "claude-haiku-4-5-20251001".to_string(),
            input_tokens: 1200,
            output_tokens: 300,
            cost_cents: 0.27,
            endpoint: "boomerang/specialist/koda".to_string(),
            created_at: Utc::now(),
        };

        {
            let store = DecisionStore::open(&path).unwrap();
            store.insert_usage(record.clone()).await.unwrap();
            assert_eq!(store.usage_records().await.len(), 1);
        }

        let reopened = DecisionStore::open(&path).unwrap();
        let usage = reopened.usage_records().await;
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].id, record.id);
        assert_eq!(usage[0].endpoint, "boomerang/specialist/koda");
        assert_eq!(reopened.session_count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let store = Arc::new(DecisionStore::open(&path).unwrap());
        let subject = Uuid::new_v4();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert_session(session(subject, &format!("agent{i}"), CallKind::Specialist, "x"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.session_count().await, 16);
        drop(store);

        let reopened = DecisionStore::open(&path).unwrap();
        assert_eq!(reopened.session_count().await, 16);
    }
}
