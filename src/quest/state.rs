//! Quest State Tracking
//!
//! Progress of a single quest: its status and the recordings that counted
//! toward it. The membership index is derived from the ordered id list on
//! every construction, including deserialization, and is never written out.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key older writers left inside stored state; it was only ever a cache
const LEGACY_INDEX_KEY: &str = "matchedRecordingIdsSet";

/// Status of a quest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestStatus {
    /// Quest is accepting listen events
    #[default]
    Active,
    /// Quest reached its required count
    Completed,
    /// Any other stored value; passed through untouched
    Other(String),
}

impl QuestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            QuestStatus::Active => "active",
            QuestStatus::Completed => "completed",
            QuestStatus::Other(s) => s,
        }
    }
}

impl From<String> for QuestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "active" => QuestStatus::Active,
            "completed" => QuestStatus::Completed,
            _ => QuestStatus::Other(s),
        }
    }
}

impl From<QuestStatus> for String {
    fn from(status: QuestStatus) -> Self {
        match status {
            QuestStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// State as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredQuestState {
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    status: QuestStatus,
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    matched_recording_ids: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredQuestState", into = "StoredQuestState")]
pub struct QuestState {
    pub status: QuestStatus,
    /// Recording ids in discovery order
    matched_recording_ids: Vec<String>,
    /// Membership index over `matched_recording_ids`
    matched_index: HashSet<String>,
    /// Unrecognised stored fields, written back as found
    extra: Map<String, Value>,
}

impl QuestState {
    pub fn new(status: QuestStatus, matched_recording_ids: Vec<String>) -> Self {
        let matched_index = matched_recording_ids.iter().cloned().collect();
        Self {
            status,
            matched_recording_ids,
            matched_index,
            extra: Map::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == QuestStatus::Active
    }

    pub fn matched_recording_ids(&self) -> &[String] {
        &self.matched_recording_ids
    }

    pub fn matched_count(&self) -> usize {
        self.matched_recording_ids.len()
    }

    pub fn has_matched(&self, recording_id: &str) -> bool {
        self.matched_index.contains(recording_id)
    }

    /// Append a recording; returns false if it was already counted
    pub fn record_match(&mut self, recording_id: &str) -> bool {
        if !self.matched_index.insert(recording_id.to_string()) {
            return false;
        }
        self.matched_recording_ids.push(recording_id.to_string());
        true
    }

    /// Back to a fresh active state with no progress
    pub fn reset(&mut self) {
        *self = Self::new(QuestStatus::Active, Vec::new());
    }
}

impl From<StoredQuestState> for QuestState {
    fn from(mut stored: StoredQuestState) -> Self {
        stored.extra.remove(LEGACY_INDEX_KEY);
        let mut state = QuestState::new(stored.status, stored.matched_recording_ids);
        state.extra = stored.extra;
        state
    }
}

impl From<QuestState> for StoredQuestState {
    fn from(state: QuestState) -> Self {
        Self {
            status: state.status,
            matched_recording_ids: state.matched_recording_ids,
            extra: state.extra,
        }
    }
}
