//! Quest Event Types
//!
//! Listen events and the per-quest results of applying them.

use chrono::{DateTime, Local};
use serde::Serialize;

/// A recording was played
#[derive(Debug, Clone, PartialEq)]
pub struct ListenEvent {
    pub recording_id: String,
    pub listened_at: DateTime<Local>,
}

impl ListenEvent {
    pub fn new(recording_id: &str, listened_at: DateTime<Local>) -> Self {
        Self {
            recording_id: recording_id.to_string(),
            listened_at,
        }
    }

    pub fn now(recording_id: &str) -> Self {
        Self::new(recording_id, Local::now())
    }
}

/// What a listen event did to one quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ListenOutcome {
    /// Quest is not active; nothing evaluated
    Inactive,
    /// Recording already counted for this quest
    AlreadyCounted,
    /// Recording doesn't satisfy the quest's parameters
    NotMatched,
    /// Recording counted, quest still active
    Progressed { matched: usize, required: usize },
    /// Recording counted and the quest is now completed
    Completed { matched: usize, required: usize },
}

impl ListenOutcome {
    /// Whether the quest was mutated
    pub fn changed(&self) -> bool {
        matches!(self, ListenOutcome::Progressed { .. } | ListenOutcome::Completed { .. })
    }
}

/// Result of processing a listen event for one quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestEventResult {
    pub quest_id: String,
    #[serde(flatten)]
    pub outcome: ListenOutcome,
}

impl QuestEventResult {
    pub fn new(quest_id: &str, outcome: ListenOutcome) -> Self {
        Self {
            quest_id: quest_id.to_string(),
            outcome,
        }
    }

    pub fn changed(&self) -> bool {
        self.outcome.changed()
    }
}
