//! Quest Repository
//!
//! Owns the live quest collection and its write-back to `quests.json`.
//! Listen events mutate quests under the write lock; persisting happens on a
//! spawned task, and bursts of events coalesce into a single write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::definition::Quest;
use super::engine;
use super::events::QuestEventResult;
use super::registry::TemplateRegistry;
use super::rewards::quests_that_grant_recording;
use crate::catalog::Recording;
use crate::data::{read_all, to_pretty_json, write_string};
use crate::error::DataError;

pub const QUESTS_FILE: &str = "quests.json";

pub struct QuestRepository {
    quests: RwLock<Vec<Quest>>,
    path: PathBuf,
    /// Set while a write-back is scheduled or in flight
    write_pending: AtomicBool,
}

impl QuestRepository {
    /// Load the quest collection. A missing file starts empty; an unreadable
    /// or malformed one is an error so write-back can never overwrite it.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let quests = read_quests(path)?;
        Ok(Self {
            quests: RwLock::new(quests),
            path: path.to_path_buf(),
            write_pending: AtomicBool::new(false),
        })
    }

    /// Re-read the file, replacing in-memory progress
    pub async fn reload(&self) -> Result<usize, DataError> {
        let fresh = read_quests(&self.path)?;
        let count = fresh.len();
        *self.quests.write().await = fresh;
        Ok(count)
    }

    pub async fn snapshot(&self) -> Vec<Quest> {
        self.quests.read().await.clone()
    }

    pub async fn get(&self, quest_id: &str) -> Option<Quest> {
        self.quests.read().await.iter().find(|q| q.id == quest_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.quests.read().await.len()
    }

    /// Quests that grant `recording_id` as a reward
    pub async fn granting(&self, recording_id: &str) -> Vec<Quest> {
        let quests = self.quests.read().await;
        quests_that_grant_recording(&quests, recording_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Run one listen event over every quest. The write lock is held for the
    /// whole pass so concurrent events never interleave per quest.
    pub async fn apply_listen_event<Tz: TimeZone>(
        &self,
        recording: &Recording,
        templates: &TemplateRegistry,
        listened_at: &DateTime<Tz>,
    ) -> Vec<QuestEventResult> {
        let mut quests = self.quests.write().await;
        let results = engine::apply_to_all(&mut quests, recording, templates, listened_at);

        let changed = results.iter().filter(|r| r.changed()).count();
        debug!("Listen {} updated {} of {} quests", recording.id, changed, results.len());
        results
    }

    /// Clear all progress and write the file immediately
    pub async fn reset_progress(&self) -> Result<usize, DataError> {
        let content = {
            let mut quests = self.quests.write().await;
            for quest in quests.iter_mut() {
                quest.state.reset();
            }
            to_pretty_json(&*quests, "quests")?
        };

        write_string(&self.path, &content).await?;
        let count = self.count().await;
        info!("Reset progress on {} quests", count);
        Ok(count)
    }

    /// Write the current collection now
    pub async fn save_now(&self) -> Result<(), DataError> {
        let content = {
            let quests = self.quests.read().await;
            to_pretty_json(&*quests, "quests")?
        };
        write_string(&self.path, &content).await
    }

    /// Schedule a write-back. Calls made while one is pending are absorbed;
    /// the collection is serialized when the write runs, so it includes
    /// every change made up to that point.
    pub fn schedule_save(self: &Arc<Self>) {
        if self.write_pending.swap(true, Ordering::AcqRel) {
            return;
        }

        let repo = Arc::clone(self);
        tokio::spawn(async move {
            // Let the current burst of events land first
            tokio::task::yield_now().await;

            if let Err(e) = repo.save_now().await {
                error!("Failed to write quests to {:?}: {}", repo.path, e);
            }
            repo.write_pending.store(false, Ordering::Release);
        });
    }

    pub fn is_write_pending(&self) -> bool {
        self.write_pending.load(Ordering::Acquire)
    }
}

fn read_quests(path: &Path) -> Result<Vec<Quest>, DataError> {
    match read_all::<Quest>(path) {
        Ok(quests) => {
            info!("Loaded {} quests from {:?}", quests.len(), path);
            Ok(quests)
        }
        Err(e) if e.is_not_found() => {
            warn!("Quest file {:?} not found, starting with no quests", path);
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::events::ListenOutcome;
    use crate::quest::state::QuestStatus;
    use chrono::Utc;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_quests(dir: &TempDir, value: Value) -> PathBuf {
        let path = dir.path().join(QUESTS_FILE);
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path
    }

    fn sample() -> Value {
        json!([
            {
                "id": "quest_1",
                "templateId": "tmpl_artist",
                "params": {"artistId": "art_1", "requiredCount": 2},
                "rewards": {"recordingIds": ["rec_Z"]},
                "state": {"status": "active", "matchedRecordingIds": [], "matchedRecordingIdsSet": {}}
            },
            {
                "id": "quest_2",
                "templateId": "tmpl_any",
                "params": {},
                "state": {"status": "completed", "matchedRecordingIds": ["rec_Q"]}
            }
        ])
    }

    fn rec(id: &str) -> Recording {
        Recording {
            id: id.into(),
            artist_ids: vec!["art_1".into()],
            ..Default::default()
        }
    }

    fn read_back(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    async fn wait_for_write(repo: &QuestRepository) {
        for _ in 0..100 {
            if !repo.is_write_pending() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("write-back never finished");
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let repo = QuestRepository::load(&dir.path().join(QUESTS_FILE)).unwrap();
        assert!(repo.quests.try_read().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(QUESTS_FILE);
        std::fs::write(&path, "[{\"id\": ").unwrap();
        assert!(matches!(QuestRepository::load(&path), Err(DataError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_listen_and_write_back() {
        let dir = TempDir::new().unwrap();
        let path = write_quests(&dir, sample());
        let repo = Arc::new(QuestRepository::load(&path).unwrap());
        let templates = TemplateRegistry::default();

        let results = repo.apply_listen_event(&rec("rec_A"), &templates, &Utc::now()).await;
        assert_eq!(results[0].outcome, ListenOutcome::Progressed { matched: 1, required: 2 });
        assert_eq!(results[1].outcome, ListenOutcome::Inactive);

        repo.schedule_save();
        wait_for_write(&repo).await;

        let stored = read_back(&path);
        assert_eq!(stored[0]["state"], json!({"status": "active", "matchedRecordingIds": ["rec_A"]}));
        assert_eq!(stored[0]["rewards"], json!({"recordingIds": ["rec_Z"]}));
        assert_eq!(stored[1]["state"]["status"], json!("completed"));
    }

    #[tokio::test]
    async fn test_burst_of_saves_coalesces_to_latest_state() {
        let dir = TempDir::new().unwrap();
        let path = write_quests(&dir, sample());
        let repo = Arc::new(QuestRepository::load(&path).unwrap());
        let templates = TemplateRegistry::default();

        for id in ["rec_A", "rec_B"] {
            repo.apply_listen_event(&rec(id), &templates, &Utc::now()).await;
            repo.schedule_save();
        }
        assert!(repo.is_write_pending());
        wait_for_write(&repo).await;

        let stored = read_back(&path);
        assert_eq!(
            stored[0]["state"],
            json!({"status": "completed", "matchedRecordingIds": ["rec_A", "rec_B"]})
        );
    }

    #[tokio::test]
    async fn test_reset_progress_writes_immediately() {
        let dir = TempDir::new().unwrap();
        let path = write_quests(&dir, sample());
        let repo = QuestRepository::load(&path).unwrap();

        assert_eq!(repo.reset_progress().await.unwrap(), 2);

        let stored = read_back(&path);
        for quest in stored.as_array().unwrap() {
            assert_eq!(quest["state"], json!({"status": "active", "matchedRecordingIds": []}));
        }
        assert_eq!(repo.get("quest_2").await.unwrap().state.status, QuestStatus::Active);
    }

    #[tokio::test]
    async fn test_reload_discards_unsaved_progress() {
        let dir = TempDir::new().unwrap();
        let path = write_quests(&dir, sample());
        let repo = QuestRepository::load(&path).unwrap();

        repo.apply_listen_event(&rec("rec_A"), &TemplateRegistry::default(), &Utc::now()).await;
        assert_eq!(repo.get("quest_1").await.unwrap().state.matched_count(), 1);

        assert_eq!(repo.reload().await.unwrap(), 2);
        assert_eq!(repo.get("quest_1").await.unwrap().state.matched_count(), 0);
    }

    #[tokio::test]
    async fn test_granting() {
        let dir = TempDir::new().unwrap();
        let path = write_quests(&dir, sample());
        let repo = QuestRepository::load(&path).unwrap();

        let granting = repo.granting("rec_Z").await;
        assert_eq!(granting.len(), 1);
        assert_eq!(granting[0].id, "quest_1");
        assert!(repo.granting("rec_A").await.is_empty());
        assert_eq!(repo.count().await, 2);
        assert!(repo.get("missing").await.is_none());
    }

    #[test]
    fn test_null_fields_do_not_fail_the_load() {
        let dir = TempDir::new().unwrap();
        let path = write_quests(
            &dir,
            json!([
                {"id": "q_params", "templateId": "t", "params": null, "state": {"status": "active", "matchedRecordingIds": []}},
                {"id": "q_state", "templateId": "t", "params": {}, "state": {"status": "active", "matchedRecordingIds": null}},
                {"id": "q_rewards", "templateId": "t", "params": {}, "rewards": {"recordingIds": null}}
            ]),
        );

        let repo = QuestRepository::load(&path).unwrap();
        let quests = repo.quests.try_read().unwrap();
        assert_eq!(quests.len(), 3);
        assert!(quests[0].params.is_empty());
        assert_eq!(quests[1].state.matched_count(), 0);
        assert!(!quests[2].grants_recording("rec_Z"));
    }
}
