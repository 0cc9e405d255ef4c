//! Recording Structures
//!
//! Song entries in `songs.json` come with both snake_case and camelCase
//! spellings, so they are read into a permissive raw form first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw recording as it appears in the data file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecording {
    #[serde(default)]
    pub song_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub artist_ids: Option<Vec<String>>,
    #[serde(default, rename = "artistIds")]
    pub artist_ids_camel: Option<Vec<String>>,
    #[serde(default)]
    pub album_id: Option<String>,
    #[serde(default, rename = "albumId")]
    pub album_id_camel: Option<String>,
    #[serde(default)]
    pub album_ids: Option<Vec<String>>,
    #[serde(default, rename = "albumIds")]
    pub album_ids_camel: Option<Vec<String>>,
    #[serde(default)]
    pub genre_ids: Option<Vec<String>>,
    #[serde(default, rename = "genreIds")]
    pub genre_ids_camel: Option<Vec<String>>,
}

/// A catalog recording with its tags resolved
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub title: String,
    pub year: Option<f64>,
    pub artist_ids: Vec<String>,
    pub album_id: Option<String>,
    pub album_ids: Vec<String>,
    /// Closed under genre ancestry once the catalog is loaded
    pub genre_ids: Vec<String>,
}

impl Recording {
    /// Resolve a raw entry. Entries without any id are dropped.
    pub fn from_raw(raw: RawRecording) -> Option<Self> {
        let id = raw.song_id.or(raw.id).filter(|id| !id.is_empty())?;

        Some(Self {
            id,
            title: raw.title.unwrap_or_default(),
            year: raw.year.as_ref().and_then(parse_year),
            artist_ids: raw.artist_ids.or(raw.artist_ids_camel).unwrap_or_default(),
            album_id: raw.album_id.or(raw.album_id_camel),
            album_ids: raw.album_ids.or(raw.album_ids_camel).unwrap_or_default(),
            genre_ids: raw.genre_ids.or(raw.genre_ids_camel).unwrap_or_default(),
        })
    }

    pub fn has_artist(&self, artist_id: &str) -> bool {
        self.artist_ids.iter().any(|id| id == artist_id)
    }

    pub fn has_genre(&self, genre_id: &str) -> bool {
        self.genre_ids.iter().any(|id| id == genre_id)
    }
}

/// Numbers are taken as-is, numeric strings are parsed; anything else is no year
fn parse_year(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|y| y.is_finite()),
        _ => None,
    }
}
