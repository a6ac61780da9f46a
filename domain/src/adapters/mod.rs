//! Adapters that live inside the domain crate for convenience.
//!
//! The in-memory store backs local development and unit tests. The SQLite
//! store lives in its own crate under `adapters/`.

pub mod memory_storage;
