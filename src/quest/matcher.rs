//! Quest Matching
//!
//! Decides whether a listened recording satisfies a quest's parameters.
//! Every present parameter is a constraint and all of them must hold; an
//! absent parameter constrains nothing.

use chrono::{DateTime, TimeZone, Timelike};
use serde_json::{Map, Value};
use tracing::trace;

use super::definition::Quest;
use super::registry::TemplateRegistry;
use crate::catalog::Recording;

/// A quest parameter read for matching
#[derive(Debug, Clone, Copy, PartialEq)]
enum Constraint<T> {
    Absent,
    Present(T),
    /// Present with a value no recording can satisfy
    Malformed,
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn id_constraint<'a>(params: &'a Map<String, Value>, name: &str) -> Constraint<&'a str> {
    match params.get(name) {
        None => Constraint::Absent,
        Some(value) if is_falsy(value) => Constraint::Absent,
        Some(Value::String(s)) => Constraint::Present(s),
        Some(_) => Constraint::Malformed,
    }
}

fn year_constraint(params: &Map<String, Value>, name: &str) -> Constraint<f64> {
    match params.get(name) {
        None | Some(Value::Null) => Constraint::Absent,
        Some(Value::Number(n)) => n.as_f64().map_or(Constraint::Malformed, Constraint::Present),
        Some(_) => Constraint::Malformed,
    }
}

/// Listen time as `HH:MM` in the instant's own time zone
pub fn time_of_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    format!("{:02}:{:02}", instant.hour(), instant.minute())
}

fn matches_artist(recording: &Recording, params: &Map<String, Value>) -> bool {
    match id_constraint(params, "artistId") {
        Constraint::Absent => true,
        Constraint::Present(artist_id) => recording.has_artist(artist_id),
        Constraint::Malformed => false,
    }
}

fn matches_years(recording: &Recording, params: &Map<String, Value>) -> bool {
    let year = recording.year;

    // A recording without a year passes every bound
    let within = |bound: Constraint<f64>, ok: fn(f64, f64) -> bool| match bound {
        Constraint::Absent => true,
        Constraint::Present(limit) => year.is_none_or(|y| ok(y, limit)),
        Constraint::Malformed => false,
    };

    within(year_constraint(params, "startYear"), |y, start| y >= start)
        && within(year_constraint(params, "endYear"), |y, end| y <= end)
}

fn matches_genre(recording: &Recording, params: &Map<String, Value>) -> bool {
    match id_constraint(params, "genreId") {
        Constraint::Absent => true,
        Constraint::Present(genre_id) => recording.has_genre(genre_id),
        Constraint::Malformed => false,
    }
}

fn matches_album(recording: &Recording, params: &Map<String, Value>) -> bool {
    match id_constraint(params, "albumId") {
        Constraint::Absent => true,
        Constraint::Present(album_id) => recording.album_id.as_deref() == Some(album_id),
        Constraint::Malformed => false,
    }
}

/// `startTime <= HH:MM <= endTime` compared as strings. A window with
/// `startTime > endTime` (spanning midnight) never matches.
fn matches_time_window<Tz: TimeZone>(params: &Map<String, Value>, listened_at: &DateTime<Tz>) -> bool {
    let (start, end) = match (id_constraint(params, "startTime"), id_constraint(params, "endTime")) {
        (Constraint::Present(start), Constraint::Present(end)) => (start, end),
        (Constraint::Absent, _) | (_, Constraint::Absent) => return true,
        _ => return false,
    };

    let now = time_of_day(listened_at);
    start <= now.as_str() && now.as_str() <= end
}

/// Does `recording`, listened at `listened_at`, satisfy the quest's parameters?
pub fn recording_matches_quest<Tz: TimeZone>(
    recording: &Recording,
    quest: &Quest,
    templates: &TemplateRegistry,
    listened_at: &DateTime<Tz>,
) -> bool {
    let params = &quest.params;

    trace!(
        "Matching {} against quest {} (type {:?})",
        recording.id,
        quest.id,
        templates.quest_type(&quest.template_id)
    );

    matches_artist(recording, params)
        && matches_years(recording, params)
        && matches_genre(recording, params)
        && matches_album(recording, params)
        && matches_time_window(params, listened_at)
}
