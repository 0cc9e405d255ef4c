//! Music catalog: genres and the recordings tagged with them.

pub mod genre;
pub mod recording;
pub mod store;

pub use recording::Recording;
pub use store::{Catalog, GENRES_FILE, SONGS_FILE};
