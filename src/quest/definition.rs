//! Quest Definition Structures
//!
//! Quest instances as stored in `quests.json`. Fields this server doesn't
//! interpret are carried along so write-back never drops them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::state::QuestState;

/// Rewards granted on completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestRewards {
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    pub recording_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuestRewards {
    pub fn grants_recording(&self, recording_id: &str) -> bool {
        self.recording_ids.iter().any(|id| id == recording_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    pub template_id: String,
    /// paramName -> value, interpreted per the template schema
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewards: Option<QuestRewards>,
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    pub state: QuestState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quest {
    pub fn new(id: &str, template_id: &str, params: Map<String, Value>) -> Self {
        Self {
            id: id.to_string(),
            template_id: template_id.to_string(),
            params,
            ..Default::default()
        }
    }

    /// Number of matched recordings needed to complete: `requiredCount`
    /// rounded up, at least 1; defaults to 1 when absent or not a number.
    pub fn required_count(&self) -> usize {
        self.params
            .get("requiredCount")
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
            .map(|n| n.ceil().max(1.0) as usize)
            .unwrap_or(1)
    }

    pub fn grants_recording(&self, recording_id: &str) -> bool {
        self.rewards
            .as_ref()
            .is_some_and(|rewards| rewards.grants_recording(recording_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quest(value: Value) -> Quest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_required_count() {
        let count = |v: Value| quest(json!({"id": "q", "params": {"requiredCount": v}})).required_count();

        assert_eq!(count(json!(3)), 3);
        assert_eq!(count(json!(2.5)), 3);
        assert_eq!(count(json!(0)), 1);
        assert_eq!(count(json!(-4)), 1);
        assert_eq!(count(json!("5")), 1);
        assert_eq!(quest(json!({"id": "q"})).required_count(), 1);
    }

    #[test]
    fn test_round_trip_keeps_unknown_fields() {
        let stored = json!({
            "id": "quest_1",
            "templateId": "tmpl_1",
            "title": "Night Owl",
            "params": {"artistId": "art_1", "requiredCount": 2},
            "rewards": {"recordingIds": ["rec_Z"], "badge": "owl"},
            "state": {"status": "active", "matchedRecordingIds": ["rec_A"]}
        });

        let q = quest(stored.clone());
        assert_eq!(q.params["artistId"], json!("art_1"));
        assert!(q.grants_recording("rec_Z"));
        assert!(!q.grants_recording("rec_A"));
        assert!(q.state.has_matched("rec_A"));

        assert_eq!(serde_json::to_value(&q).unwrap(), stored);
    }

    #[test]
    fn test_minimal_quest() {
        let q = quest(json!({"id": "q"}));
        assert!(q.template_id.is_empty());
        assert!(q.params.is_empty());
        assert!(q.rewards.is_none());
        assert!(q.state.is_active());
        assert!(!q.grants_recording("rec_1"));
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let q = quest(json!({
            "id": "q",
            "templateId": null,
            "params": null,
            "rewards": {"recordingIds": null},
            "state": null
        }));

        assert!(q.template_id.is_empty());
        assert!(q.params.is_empty());
        assert_eq!(q.required_count(), 1);
        assert!(!q.grants_recording("rec_Z"));
        assert!(q.state.is_active());
        assert_eq!(q.state.matched_count(), 0);
    }
}
