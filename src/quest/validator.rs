//! Quest Parameter Validation
//!
//! Checks a quest's parameter values against its template schema. Missing
//! values are fine here; callers use `required_params` to decide whether a
//! quest is complete enough to create.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::template::{ParamType, QuestTemplate};

static TIME_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?$").expect("time pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Name of a JSON value's kind, as reported in error messages
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Null | Value::Array(_) | Value::Object(_) => "object",
    }
}

fn check_param(name: &str, ty: &ParamType, value: &Value) -> Option<String> {
    let expect_string = |what: &str| {
        (!value.is_string()).then(|| {
            format!("Parameter '{}' must be {}, got {}", name, what, kind_of(value))
        })
    };

    match ty {
        ParamType::Number => (!value.is_number()).then(|| {
            format!("Parameter '{}' must be a number, got {}", name, kind_of(value))
        }),
        ParamType::String => expect_string("a string"),
        ParamType::ArtistId => expect_string("an artist ID"),
        ParamType::GenreId => expect_string("a genre ID"),
        ParamType::AlbumId => expect_string("an album ID"),
        ParamType::Time => {
            let well_formed = value.as_str().is_some_and(|s| TIME_FORMAT.is_match(s));
            (!well_formed).then(|| {
                format!(
                    "Parameter '{}' must be a valid time format (HH:MM or HH:MM:SS)",
                    name
                )
            })
        }
        ParamType::Unknown(type_name) => {
            warn!("Unknown parameter type for {}: {}", name, type_name);
            None
        }
    }
}

/// Validate quest parameters against the template schema. Never fails;
/// problems are reported in the result, in schema order.
pub fn validate_quest_params(params: Option<&Map<String, Value>>, template: &QuestTemplate) -> ValidationResult {
    let Some(schema) = template.params.as_ref() else {
        return ValidationResult::from_errors(vec![
            "Template definition missing params schema".to_string(),
        ]);
    };

    let errors = schema
        .iter()
        .filter_map(|(name, ty)| {
            let value = params?.get(name)?;
            check_param(name, ty, value)
        })
        .collect();

    ValidationResult::from_errors(errors)
}

/// Whether a quest with these params can be created from the template
pub fn can_create_quest(params: Option<&Map<String, Value>>, template: &QuestTemplate) -> bool {
    validate_quest_params(params, template).valid
}
