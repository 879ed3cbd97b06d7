//! Repository layer: database operations grouped by concern.

mod local_storage;

pub use local_storage::*;
