//! Quest Template Registry
//!
//! Indexes quest templates by id and type. Lookup only; a reload builds a
//! new registry.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use tracing::{info, warn};

use super::template::{MatchCriterion, QuestTemplate, RawQuestTemplate};
use crate::data;

pub const TEMPLATES_FILE: &str = "questTemplates.json";

/// Registry for all quest templates
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    /// Templates in file order
    templates: Vec<QuestTemplate>,
    /// template id -> index into `templates`
    by_id: HashMap<String, usize>,
}

impl TemplateRegistry {
    pub fn from_templates(templates: Vec<QuestTemplate>) -> Self {
        let mut by_id = HashMap::with_capacity(templates.len());
        for (index, template) in templates.iter().enumerate() {
            if by_id.contains_key(&template.id) {
                warn!("Duplicate template ID '{}', keeping the first definition", template.id);
                continue;
            }
            by_id.insert(template.id.clone(), index);
        }
        Self { templates, by_id }
    }

    /// Load `questTemplates.json` from the data directory
    pub fn load_from_directory(data_dir: &Path) -> Self {
        let raw: Vec<RawQuestTemplate> =
            data::read_entries_or_empty(&data_dir.join(TEMPLATES_FILE), "quest templates");

        let registry = Self::from_templates(raw.iter().map(QuestTemplate::from_raw).collect());
        info!("Loaded {} quest templates", registry.count());
        registry
    }

    /// Get a template by ID
    pub fn get(&self, template_id: &str) -> Option<&QuestTemplate> {
        self.by_id.get(template_id).map(|&index| &self.templates[index])
    }

    /// Type of the template with this ID
    pub fn quest_type(&self, template_id: &str) -> Option<&str> {
        self.get(template_id).map(|t| t.template_type.as_str())
    }

    pub fn all(&self) -> &[QuestTemplate] {
        &self.templates
    }

    pub fn by_type(&self, template_type: &str) -> Vec<&QuestTemplate> {
        self.templates
            .iter()
            .filter(|t| t.template_type == template_type)
            .collect()
    }

    /// Templates grouped by type; templates without a type are left out
    pub fn group_by_type(&self) -> BTreeMap<&str, Vec<&QuestTemplate>> {
        let mut grouped: BTreeMap<&str, Vec<&QuestTemplate>> = BTreeMap::new();
        for template in &self.templates {
            if template.template_type.is_empty() {
                continue;
            }
            grouped
                .entry(template.template_type.as_str())
                .or_default()
                .push(template);
        }
        grouped
    }

    /// Templates whose match criteria include any of `criteria`
    pub fn templates_requiring(&self, criteria: &[MatchCriterion]) -> Vec<&QuestTemplate> {
        self.templates
            .iter()
            .filter(|t| t.match_criteria().iter().any(|c| criteria.contains(c)))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.templates.len()
    }
}
