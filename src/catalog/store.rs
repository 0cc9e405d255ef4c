//! Catalog Store
//!
//! Holds the genre list and the genre-expanded recordings.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use super::genre::{Genre, GenreHierarchy};
use super::recording::{RawRecording, Recording};
use crate::data;

pub const GENRES_FILE: &str = "genres.json";
pub const SONGS_FILE: &str = "songs.json";

#[derive(Debug, Default)]
pub struct Catalog {
    genres: Vec<Genre>,
    recordings: HashMap<String, Recording>,
}

impl Catalog {
    /// Build a catalog, expanding every recording's genres exactly once
    pub fn new(genres: Vec<Genre>, recordings: Vec<Recording>) -> Self {
        let hierarchy = GenreHierarchy::new(&genres);
        let mut by_id = HashMap::with_capacity(recordings.len());

        for recording in recordings {
            let expanded = hierarchy.expand(&recording);
            if by_id.contains_key(&expanded.id) {
                warn!("Duplicate recording ID '{}', overwriting", expanded.id);
            }
            by_id.insert(expanded.id.clone(), expanded);
        }

        Self {
            genres,
            recordings: by_id,
        }
    }

    /// Load `genres.json` and `songs.json` from the data directory
    pub fn load_from_directory(data_dir: &Path) -> Self {
        let genres: Vec<Genre> = data::read_entries_or_empty(&data_dir.join(GENRES_FILE), "genres");
        let raw: Vec<RawRecording> = data::read_entries_or_empty(&data_dir.join(SONGS_FILE), "songs");

        let total = raw.len();
        let recordings: Vec<Recording> = raw.into_iter().filter_map(Recording::from_raw).collect();
        if recordings.len() < total {
            warn!("Skipped {} songs without an id", total - recordings.len());
        }

        let catalog = Self::new(genres, recordings);
        info!(
            "Catalog has {} genres and {} recordings",
            catalog.genres_count(),
            catalog.recordings_count()
        );
        catalog
    }

    pub fn get_recording(&self, id: &str) -> Option<&Recording> {
        self.recordings.get(id)
    }

    pub fn recordings(&self) -> impl Iterator<Item = &Recording> {
        self.recordings.values()
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn hierarchy(&self) -> GenreHierarchy<'_> {
        GenreHierarchy::new(&self.genres)
    }

    pub fn genres_count(&self) -> usize {
        self.genres.len()
    }

    pub fn recordings_count(&self) -> usize {
        self.recordings.len()
    }
}
