//! Quest Template Structures
//!
//! Templates define a quest type and the parameters its instances carry.
//! They are read from `questTemplates.json` and never change afterwards.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Raw template as it appears in the data file
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestTemplate {
    pub id: String,
    #[serde(rename = "type", default)]
    pub template_type: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// paramName -> type name, in file order
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

// ============================================================================
// Resolved Template Structures
// ============================================================================

/// Parameter types a template schema can declare
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Number,
    String,
    ArtistId,
    GenreId,
    AlbumId,
    /// `HH:MM` or `HH:MM:SS`
    Time,
    /// Kept verbatim so newer data files still load
    Unknown(String),
}

impl ParamType {
    pub fn parse(s: &str) -> Self {
        match s {
            "number" => ParamType::Number,
            "string" => ParamType::String,
            "art_id" => ParamType::ArtistId,
            "gen_id" => ParamType::GenreId,
            "alb_id" => ParamType::AlbumId,
            "time" => ParamType::Time,
            other => ParamType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::ArtistId => "art_id",
            ParamType::GenreId => "gen_id",
            ParamType::AlbumId => "alb_id",
            ParamType::Time => "time",
            ParamType::Unknown(s) => s,
        }
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered paramName -> type schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema(Vec<(String, ParamType)>);

impl ParamSchema {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let entries = map
            .iter()
            .map(|(name, ty)| {
                let ty = match ty {
                    Value::String(s) => ParamType::parse(s),
                    other => ParamType::Unknown(other.to_string()),
                };
                (name.clone(), ty)
            })
            .collect();
        Self(entries)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamType)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&ParamType> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, ty)| ty)
    }

}

impl Serialize for ParamSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, ty) in &self.0 {
            map.serialize_entry(name, ty)?;
        }
        map.end()
    }
}

/// Constraint families a template type may apply when matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchCriterion {
    Artist,
    Year,
    Genre,
    Album,
    Time,
}

impl MatchCriterion {
    /// Parse the serialized (lowercase) name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "artist" => Some(Self::Artist),
            "year" => Some(Self::Year),
            "genre" => Some(Self::Genre),
            "album" => Some(Self::Album),
            "time" => Some(Self::Time),
            _ => None,
        }
    }

    /// Fixed criteria table keyed by template type; unknown types get none
    pub fn for_template_type(template_type: &str) -> &'static [MatchCriterion] {
        use MatchCriterion::*;

        match template_type {
            "listen_count" | "listen_minutes" => &[Artist],
            "listen_by_year" => &[Artist, Year],
            "listen_by_genre" => &[Genre, Artist],
            "listen_between_time" => &[Artist, Time],
            "listen_to_album" => &[Album, Artist],
            "travel_amount" | "connect_account" | "location_checkin" | "streak_app" => &[],
            _ => &[],
        }
    }
}

/// A fully resolved quest template
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestTemplate {
    pub id: String,
    #[serde(rename = "type")]
    pub template_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` when the definition carries no schema at all
    pub params: Option<ParamSchema>,
}

impl QuestTemplate {
    pub fn from_raw(raw: &RawQuestTemplate) -> Self {
        Self {
            id: raw.id.clone(),
            template_type: raw.template_type.clone(),
            name: raw.name.clone(),
            description: raw.description.clone(),
            params: raw.params.as_ref().map(ParamSchema::from_map),
        }
    }

    /// Parameter names a quest of this template is expected to supply
    pub fn required_params(&self) -> Vec<String> {
        self.params.as_ref().map(ParamSchema::names).unwrap_or_default()
    }

    pub fn match_criteria(&self) -> &'static [MatchCriterion] {
        MatchCriterion::for_template_type(&self.template_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> QuestTemplate {
        let raw: RawQuestTemplate = serde_json::from_str(json).unwrap();
        QuestTemplate::from_raw(&raw)
    }

    #[test]
    fn test_schema_keeps_file_order() {
        let template = parse(
            r#"{"id": "tmpl_1", "type": "listen_by_year",
                "params": {"startYear": "number", "endYear": "number", "artistId": "art_id"}}"#,
        );

        assert_eq!(template.required_params(), vec!["startYear", "endYear", "artistId"]);
        let schema = template.params.as_ref().unwrap();
        assert_eq!(schema.get("artistId"), Some(&ParamType::ArtistId));
        assert_eq!(schema.names().len(), 3);
    }

    #[test]
    fn test_unknown_types_are_kept() {
        let template = parse(r#"{"id": "t", "type": "x", "params": {"a": "color", "b": 5}}"#);
        let schema = template.params.unwrap();

        assert_eq!(schema.get("a"), Some(&ParamType::Unknown("color".into())));
        assert_eq!(schema.get("b"), Some(&ParamType::Unknown("5".into())));
    }

    #[test]
    fn test_missing_schema() {
        let template = parse(r#"{"id": "t", "type": "streak_app"}"#);
        assert!(template.params.is_none());
        assert!(template.required_params().is_empty());
    }

    #[test]
    fn test_match_criteria_table() {
        assert_eq!(
            MatchCriterion::for_template_type("listen_by_genre"),
            &[MatchCriterion::Genre, MatchCriterion::Artist]
        );
        assert_eq!(
            MatchCriterion::for_template_type("listen_between_time"),
            &[MatchCriterion::Artist, MatchCriterion::Time]
        );
        assert!(MatchCriterion::for_template_type("connect_account").is_empty());
        assert!(MatchCriterion::for_template_type("made_up").is_empty());
    }

    #[test]
    fn test_serializes_schema_as_object() {
        let template = parse(r#"{"id": "t", "type": "listen_count", "params": {"artistId": "art_id", "requiredCount": "number"}}"#);
        let json = serde_json::to_value(&template).unwrap();

        assert_eq!(json["type"], "listen_count");
        assert_eq!(json["params"]["artistId"], "art_id");
        assert_eq!(json["params"]["requiredCount"], "number");
    }
}
