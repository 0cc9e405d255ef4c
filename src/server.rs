//! HTTP interface
//!
//! Thin adapter over the library and the quest repository. Errors are
//! returned as `{"error": "<message>"}`.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::library::Library;
use crate::quest::template::ParamSchema;
use crate::quest::{
    ListenEvent, MatchCriterion, Quest, QuestRepository, QuestTemplate, ValidationResult, can_create_quest,
    validate_quest_params,
};

// ============================================================================
// App State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    /// Read-only data, swapped whole on reload. Lock before `quests`.
    pub library: Arc<RwLock<Library>>,
    pub quests: Arc<QuestRepository>,
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(library: Library, quests: QuestRepository, data_dir: PathBuf) -> Self {
        Self {
            library: Arc::new(RwLock::new(library)),
            quests: Arc::new(quests),
            data_dir,
        }
    }
}

pub fn router(state: AppState, log_requests: bool) -> Router {
    let app = Router::new()
        .route("/test", get(liveness))
        // Listening
        .route("/listen/:recording_id", post(listen))
        // Quests
        .route("/quests", get(list_quests))
        .route("/quests/:id", get(get_quest))
        .route("/recordings/:id/granting-quests", get(granting_quests))
        // Templates
        .route("/quest-templates", get(list_templates))
        .route("/quest-templates/:id", get(get_template))
        .route("/quest-templates/type/:type", get(templates_by_type))
        .route("/validate-quest-params", post(validate_params))
        // Developer utilities
        .route("/developer/cache/clear", post(clear_cache))
        .route("/developer/quests/reset", post(reset_quests))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST, axum::http::Method::OPTIONS])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .with_state(state);

    if log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

// ============================================================================
// HTTP Handlers - Listening
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListenQuery {
    /// RFC 3339 listen time; defaults to now
    at: Option<String>,
}

/// POST /listen/:recording_id - Apply a listen event to every quest
async fn listen(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
    Query(query): Query<ListenQuery>,
) -> Response {
    let event = match query.at.as_deref() {
        Some(at) => match DateTime::parse_from_rfc3339(at) {
            Ok(instant) => ListenEvent::new(&recording_id, instant.with_timezone(&Local)),
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid timestamp '{}': {}", at, e));
            }
        },
        None => ListenEvent::now(&recording_id),
    };

    let updates = {
        let library = state.library.read().await;
        let Some(recording) = library.catalog.get_recording(&event.recording_id) else {
            return error_response(StatusCode::NOT_FOUND, "Recording not found");
        };
        state
            .quests
            .apply_listen_event(recording, &library.templates, &event.listened_at)
            .await
    };

    state.quests.schedule_save();

    let quests = state.quests.snapshot().await;
    Json(json!({ "success": true, "quests": quests, "updates": updates })).into_response()
}

// ============================================================================
// HTTP Handlers - Quests
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestValidation {
    is_valid: Option<bool>,
    errors: Vec<String>,
}

#[derive(Serialize)]
struct QuestDetail<'a> {
    #[serde(flatten)]
    quest: &'a Quest,
    template: Option<&'a QuestTemplate>,
    validation: QuestValidation,
}

/// GET /quests
async fn list_quests(State(state): State<AppState>) -> Response {
    let quests = state.quests.snapshot().await;
    (
        [(axum::http::header::CACHE_CONTROL, "no-store")],
        Json(quests),
    )
        .into_response()
}

/// GET /quests/:id - Quest with its template and parameter validation
async fn get_quest(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let library = state.library.read().await;
    let Some(quest) = state.quests.get(&id).await else {
        return error_response(StatusCode::NOT_FOUND, "Quest not found");
    };

    let template = library.templates.get(&quest.template_id);
    let validation = match template {
        Some(template) => {
            let result = validate_quest_params(Some(&quest.params), template);
            QuestValidation {
                is_valid: Some(result.valid),
                errors: result.errors,
            }
        }
        None => QuestValidation {
            is_valid: None,
            errors: Vec::new(),
        },
    };

    Json(QuestDetail {
        quest: &quest,
        template,
        validation,
    })
    .into_response()
}

/// GET /recordings/:id/granting-quests
async fn granting_quests(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    Json(state.quests.granting(&id).await).into_response()
}

// ============================================================================
// HTTP Handlers - Templates
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateDetail<'a> {
    #[serde(flatten)]
    template: &'a QuestTemplate,
    criteria: &'static [MatchCriterion],
    required_params: Vec<String>,
    param_schema: Option<&'a ParamSchema>,
}

impl<'a> TemplateDetail<'a> {
    fn new(template: &'a QuestTemplate) -> Self {
        Self {
            template,
            criteria: template.match_criteria(),
            required_params: template.required_params(),
            param_schema: template.params.as_ref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TemplatesQuery {
    /// Only `type` is supported
    group_by: Option<String>,
    /// Comma-separated match criteria, e.g. `genre,album`
    criteria: Option<String>,
}

/// GET /quest-templates - All templates, grouped by type or filtered by
/// match criteria
async fn list_templates(State(state): State<AppState>, Query(query): Query<TemplatesQuery>) -> Response {
    let library = state.library.read().await;

    match (query.group_by.as_deref(), query.criteria.as_deref()) {
        (None, None) => Json(library.templates.all()).into_response(),
        (Some("type"), None) => Json(library.templates.group_by_type()).into_response(),
        (Some(other), None) => error_response(StatusCode::BAD_REQUEST, format!("Unsupported groupBy '{}'", other)),
        (None, Some(list)) => {
            let mut criteria = Vec::new();
            for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                match MatchCriterion::from_name(name) {
                    Some(criterion) => criteria.push(criterion),
                    None => {
                        return error_response(StatusCode::BAD_REQUEST, format!("Unknown criterion '{}'", name));
                    }
                }
            }
            Json(library.templates.templates_requiring(&criteria)).into_response()
        }
        (Some(_), Some(_)) => error_response(StatusCode::BAD_REQUEST, "groupBy and criteria cannot be combined"),
    }
}

/// GET /quest-templates/:id
async fn get_template(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let library = state.library.read().await;
    match library.templates.get(&id) {
        Some(template) => Json(TemplateDetail::new(template)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Template not found"),
    }
}

/// GET /quest-templates/type/:type
async fn templates_by_type(State(state): State<AppState>, Path(template_type): Path<String>) -> Response {
    let library = state.library.read().await;
    Json(library.templates.by_type(&template_type)).into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateParamsRequest {
    #[serde(default)]
    template_id: Option<String>,
    #[serde(default)]
    params: Option<Map<String, Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateParamsResponse<'a> {
    template_id: &'a str,
    template: &'a QuestTemplate,
    validation: ValidationResult,
    can_create: bool,
    criteria: &'static [MatchCriterion],
    required_params: Vec<String>,
}

/// POST /validate-quest-params - Check params against a template
async fn validate_params(State(state): State<AppState>, Json(req): Json<ValidateParamsRequest>) -> Response {
    let Some(template_id) = req.template_id.filter(|id| !id.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "templateId is required");
    };

    let library = state.library.read().await;
    let Some(template) = library.templates.get(&template_id) else {
        return error_response(StatusCode::NOT_FOUND, "Template not found");
    };

    Json(ValidateParamsResponse {
        template_id: &template_id,
        template,
        validation: validate_quest_params(req.params.as_ref(), template),
        can_create: can_create_quest(req.params.as_ref(), template),
        criteria: template.match_criteria(),
        required_params: template.required_params(),
    })
    .into_response()
}

// ============================================================================
// HTTP Handlers - Developer
// ============================================================================

/// POST /developer/cache/clear - Reload everything from disk
async fn clear_cache(State(state): State<AppState>) -> Response {
    let data_dir = state.data_dir.clone();
    let fresh = match tokio::task::spawn_blocking(move || Library::load(&data_dir)).await {
        Ok(library) => library,
        Err(e) => {
            error!("Cache clear failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let mut library = state.library.write().await;
    *library = fresh;

    let quest_count = match state.quests.reload().await {
        Ok(count) => count,
        Err(e) => {
            error!("Cache clear failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    info!("Reloaded data from {:?}", state.data_dir);

    Json(json!({
        "success": true,
        "counts": {
            "songs": library.catalog.recordings_count(),
            "genres": library.catalog.genres_count(),
            "questTemplates": library.templates.count(),
            "quests": quest_count,
        }
    }))
    .into_response()
}

/// POST /developer/quests/reset - Clear all quest progress
async fn reset_quests(State(state): State<AppState>) -> Response {
    match state.quests.reset_progress().await {
        Ok(count) => Json(json!({
            "success": true,
            "message": "Quest progress reset",
            "questCount": count,
        }))
        .into_response(),
        Err(e) => {
            error!("Quest reset failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /test
async fn liveness() -> &'static str {
    "Server is alive"
}
