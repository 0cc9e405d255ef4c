//! Genre Hierarchy
//!
//! Genres form a DAG through `parentId`, which may name one parent or
//! several. Recordings are enriched with every ancestor of their tags once,
//! when the catalog loads, so matching never walks the hierarchy.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::recording::Recording;

/// One parent id or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParentRef {
    One(String),
    Many(Vec<String>),
}

impl ParentRef {
    pub fn ids(&self) -> &[String] {
        match self {
            ParentRef::One(id) => std::slice::from_ref(id),
            ParentRef::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: String,
    #[serde(default, deserialize_with = "crate::data::null_as_default")]
    pub name: String,
    #[serde(default, alias = "parent_id")]
    pub parent_id: Option<ParentRef>,
}

impl Genre {
    pub fn parent_ids(&self) -> &[String] {
        self.parent_id.as_ref().map(ParentRef::ids).unwrap_or_default()
    }
}

/// Parent lookup over a genre list
pub struct GenreHierarchy<'a> {
    parents: HashMap<&'a str, &'a [String]>,
}

impl<'a> GenreHierarchy<'a> {
    pub fn new(genres: &'a [Genre]) -> Self {
        let mut parents = HashMap::with_capacity(genres.len());
        for genre in genres {
            // First definition of a duplicated id wins
            parents.entry(genre.id.as_str()).or_insert(genre.parent_ids());
        }
        Self { parents }
    }

    pub fn contains(&self, genre_id: &str) -> bool {
        self.parents.contains_key(genre_id)
    }

    /// All genres reachable through parent links, excluding `genre_id` itself.
    ///
    /// Each genre is expanded at most once, so cycles terminate and shared
    /// grandparents in a diamond are only walked a single time.
    pub fn ancestors(&self, genre_id: &str) -> HashSet<String> {
        let mut ancestors = HashSet::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![genre_id];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }

            let Some(parents) = self.parents.get(current) else {
                continue;
            };

            for parent in parents.iter() {
                if parent != genre_id {
                    ancestors.insert(parent.clone());
                }
                if !visited.contains(parent.as_str()) {
                    stack.push(parent.as_str());
                }
            }
        }

        ancestors
    }

    /// True when following parent links from `genre_id` leads back to it
    pub fn is_cyclic(&self, genre_id: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = self
            .parents
            .get(genre_id)
            .map(|parents| parents.iter().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(current) = stack.pop() {
            if current == genre_id {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(parents) = self.parents.get(current) {
                stack.extend(parents.iter().map(String::as_str));
            }
        }

        false
    }

    /// Copy of `recording` whose genre tags include every ancestor.
    ///
    /// Original tags keep their order; added ancestors follow, sorted.
    pub fn expand(&self, recording: &Recording) -> Recording {
        let mut seen: HashSet<String> = HashSet::new();
        let mut genre_ids: Vec<String> = Vec::with_capacity(recording.genre_ids.len());

        for id in &recording.genre_ids {
            if seen.insert(id.clone()) {
                genre_ids.push(id.clone());
            }
        }

        let mut added: Vec<String> = recording
            .genre_ids
            .iter()
            .flat_map(|id| self.ancestors(id))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        added.sort();
        genre_ids.extend(added);

        Recording {
            genre_ids,
            ..recording.clone()
        }
    }
}
