//! Path search.
//!
//! Finds army-sufficient routes between two tiles for objectives and
//! expansion plans.

pub mod path;

pub use path::{army_delta, find_path, search_path, PathSearch};
