//! # Storage Layer
//!
//! Durable slot for the application snapshot. The domain layer only sees the
//! `SnapshotStorage` trait; the JSON file backend is used by the server and
//! the in-memory backend by tests.

pub mod json;
pub mod memory;
pub mod traits;

pub use json::{JsonConnection, JsonSnapshotRepository};
pub use memory::MemoryStorage;
pub use traits::SnapshotStorage;
