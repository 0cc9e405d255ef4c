//! Reward lookup: which quests grant a given recording on completion.

use super::definition::Quest;

/// Quests whose rewards list `recording_id`, in collection order
pub fn quests_that_grant_recording<'a>(quests: &'a [Quest], recording_id: &str) -> Vec<&'a Quest> {
    quests.iter().filter(|quest| quest.grants_recording(recording_id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn quests() -> Vec<Quest> {
        serde_json::from_value(json!([
            {"id": "q1", "rewards": {"recordingIds": ["rec_Z", "rec_Y"]}},
            {"id": "q2"},
            {"id": "q3", "rewards": {}},
            {"id": "q4", "rewards": {"recordingIds": ["rec_Z"]}}
        ]))
        .unwrap()
    }

    #[test]
    fn test_lookup_in_order() {
        let quests = quests();
        let ids: Vec<&str> = quests_that_grant_recording(&quests, "rec_Z")
            .into_iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, ["q1", "q4"]);
    }

    #[test]
    fn test_no_grants() {
        let quests = quests();
        assert!(quests_that_grant_recording(&quests, "rec_unknown").is_empty());
        assert!(quests_that_grant_recording(&[], "rec_Z").is_empty());
    }
}
