pub mod json_file;

pub use json_file::{null_as_default, read_all, read_entries_or_empty, to_pretty_json, write_string};
