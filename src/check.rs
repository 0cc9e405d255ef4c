//! Data integrity check
//!
//! Cross-references the data files and reports anything a listen event
//! would silently trip over.

use thiserror::Error;

use crate::library::Library;
use crate::quest::{Quest, validate_quest_params};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataProblem {
    #[error("Recording {recording_id} is tagged with unknown genre {genre_id}")]
    UnknownGenre { recording_id: String, genre_id: String },

    #[error("Genre {genre_id} has unknown parent {parent_id}")]
    UnknownParent { genre_id: String, parent_id: String },

    #[error("Genre {genre_id} is its own ancestor")]
    CyclicGenre { genre_id: String },

    #[error("Quest {quest_id} references missing template {template_id}")]
    MissingTemplate { quest_id: String, template_id: String },

    #[error("Quest {quest_id} missing parameter \"{param}\"")]
    MissingParam { quest_id: String, param: String },

    #[error("Quest {quest_id} has invalid params: {message}")]
    InvalidParam { quest_id: String, message: String },
}

/// Every problem found, genres first, then recordings, then quests
pub fn check_data(library: &Library, quests: &[Quest]) -> Vec<DataProblem> {
    let mut problems = Vec::new();
    let hierarchy = library.catalog.hierarchy();

    for genre in library.catalog.genres() {
        for parent_id in genre.parent_ids() {
            if !hierarchy.contains(parent_id) {
                problems.push(DataProblem::UnknownParent {
                    genre_id: genre.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
        if hierarchy.is_cyclic(&genre.id) {
            problems.push(DataProblem::CyclicGenre {
                genre_id: genre.id.clone(),
            });
        }
    }

    let mut recordings: Vec<_> = library.catalog.recordings().collect();
    recordings.sort_by(|a, b| a.id.cmp(&b.id));

    for recording in recordings {
        for genre_id in &recording.genre_ids {
            if !hierarchy.contains(genre_id) {
                problems.push(DataProblem::UnknownGenre {
                    recording_id: recording.id.clone(),
                    genre_id: genre_id.clone(),
                });
            }
        }
    }

    for quest in quests {
        let Some(template) = library.templates.get(&quest.template_id) else {
            problems.push(DataProblem::MissingTemplate {
                quest_id: quest.id.clone(),
                template_id: quest.template_id.clone(),
            });
            continue;
        };

        for param in template.required_params() {
            if !quest.params.contains_key(&param) {
                problems.push(DataProblem::MissingParam {
                    quest_id: quest.id.clone(),
                    param,
                });
            }
        }

        let validation = validate_quest_params(Some(&quest.params), template);
        problems.extend(validation.errors.into_iter().map(|message| DataProblem::InvalidParam {
            quest_id: quest.id.clone(),
            message,
        }));
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genre::Genre;
    use crate::catalog::{Catalog, Recording};
    use crate::quest::{QuestTemplate, TemplateRegistry};
    use crate::quest::template::RawQuestTemplate;
    use serde_json::json;

    fn library() -> Library {
        let genres: Vec<Genre> = serde_json::from_value(json!([
            {"id": "gen_rock", "name": "Rock"},
            {"id": "gen_punk", "name": "Punk", "parentId": "gen_rock"},
            {"id": "gen_a", "parentId": "gen_b"},
            {"id": "gen_b", "parentId": ["gen_a", "gen_lost"]}
        ]))
        .unwrap();

        let recordings = vec![
            Recording {
                id: "rec_1".into(),
                genre_ids: vec!["gen_punk".into()],
                ..Default::default()
            },
            Recording {
                id: "rec_2".into(),
                genre_ids: vec!["gen_jazz".into()],
                ..Default::default()
            },
        ];

        let raw: Vec<RawQuestTemplate> = serde_json::from_value(json!([
            {"id": "tmpl_year", "type": "listen_by_year", "params": {"startYear": "number", "endYear": "number"}}
        ]))
        .unwrap();

        Library::new(
            Catalog::new(genres, recordings),
            TemplateRegistry::from_templates(raw.iter().map(QuestTemplate::from_raw).collect()),
        )
    }

    fn quests() -> Vec<Quest> {
        serde_json::from_value(json!([
            {"id": "q_ok", "templateId": "tmpl_year", "params": {"startYear": 1990, "endYear": 1999}},
            {"id": "q_partial", "templateId": "tmpl_year", "params": {"startYear": "1990"}},
            {"id": "q_orphan", "templateId": "tmpl_gone", "params": {}}
        ]))
        .unwrap()
    }

    #[test]
    fn test_reports_every_problem() {
        let problems = check_data(&library(), &quests());

        assert_eq!(
            problems,
            vec![
                DataProblem::CyclicGenre { genre_id: "gen_a".into() },
                DataProblem::UnknownParent {
                    genre_id: "gen_b".into(),
                    parent_id: "gen_lost".into()
                },
                DataProblem::CyclicGenre { genre_id: "gen_b".into() },
                DataProblem::UnknownGenre {
                    recording_id: "rec_2".into(),
                    genre_id: "gen_jazz".into()
                },
                DataProblem::MissingParam {
                    quest_id: "q_partial".into(),
                    param: "endYear".into()
                },
                DataProblem::InvalidParam {
                    quest_id: "q_partial".into(),
                    message: "Parameter 'startYear' must be a number, got string".into()
                },
                DataProblem::MissingTemplate {
                    quest_id: "q_orphan".into(),
                    template_id: "tmpl_gone".into()
                },
            ]
        );
    }

    #[test]
    fn test_clean_data() {
        let quests: Vec<Quest> = quests().into_iter().take(1).collect();
        let library = Library::new(Catalog::default(), library().templates);
        assert!(check_data(&library, &quests).is_empty());
    }

    #[test]
    fn test_messages() {
        let problem = DataProblem::MissingParam {
            quest_id: "q1".into(),
            param: "artistId".into(),
        };
        assert_eq!(problem.to_string(), "Quest q1 missing parameter \"artistId\"");
    }
}
