//! MongoDB-backed storage layer

pub mod mongo;

pub use mongo::{ListOptions, Repository, Visibility, search_filter};
