//! Quest Progress Engine
//!
//! Applies listen events to quests. Only `active` quests move, and only to
//! `completed`; any other status is left as found.

use chrono::{DateTime, TimeZone};
use tracing::{debug, info};

use super::definition::Quest;
use super::events::{ListenOutcome, QuestEventResult};
use super::matcher::recording_matches_quest;
use super::registry::TemplateRegistry;
use super::state::QuestStatus;
use crate::catalog::Recording;

/// Apply one listen to one quest.
///
/// A recording is counted at most once per quest, so repeating the same
/// event leaves the quest unchanged.
pub fn apply_listen_event<Tz: TimeZone>(
    quest: &mut Quest,
    recording: &Recording,
    templates: &TemplateRegistry,
    listened_at: &DateTime<Tz>,
) -> ListenOutcome {
    if !quest.state.is_active() {
        return ListenOutcome::Inactive;
    }

    if quest.state.has_matched(&recording.id) {
        return ListenOutcome::AlreadyCounted;
    }

    if !recording_matches_quest(recording, quest, templates, listened_at) {
        return ListenOutcome::NotMatched;
    }

    quest.state.record_match(&recording.id);

    let matched = quest.state.matched_count();
    let required = quest.required_count();

    if matched >= required {
        quest.state.status = QuestStatus::Completed;
        info!("Quest {} completed ({}/{})", quest.id, matched, required);
        ListenOutcome::Completed { matched, required }
    } else {
        debug!("Quest {} progressed ({}/{})", quest.id, matched, required);
        ListenOutcome::Progressed { matched, required }
    }
}

/// Apply one listen to every quest independently, in collection order
pub fn apply_to_all<Tz: TimeZone>(
    quests: &mut [Quest],
    recording: &Recording,
    templates: &TemplateRegistry,
    listened_at: &DateTime<Tz>,
) -> Vec<QuestEventResult> {
    quests
        .iter_mut()
        .map(|quest| {
            let outcome = apply_listen_event(quest, recording, templates, listened_at);
            QuestEventResult::new(&quest.id, outcome)
        })
        .collect()
}
