//! Quest System Module
//!
//! Quest templates and their parameter validation, matching listened
//! recordings against quest parameters, and the progress engine that
//! advances quests from `active` to `completed`.

pub mod definition;
pub mod engine;
pub mod events;
pub mod matcher;
pub mod registry;
pub mod repository;
pub mod rewards;
pub mod state;
pub mod template;
pub mod validator;

pub use definition::Quest;
pub use events::ListenEvent;
pub use registry::{TEMPLATES_FILE, TemplateRegistry};
pub use repository::{QUESTS_FILE, QuestRepository};
pub use template::{MatchCriterion, QuestTemplate};
pub use validator::{ValidationResult, can_create_quest, validate_quest_params};
