//! # JSON File Storage
//!
//! Stores each snapshot as `<key>.json` inside the data directory.
//!
//! ```text
//! data/
//! ├── config.yaml                              (optional, see AppConfig)
//! └── futuristic-mini-projects-storage.json    ← snapshot slot
//! ```
//!
//! Writes go to a temp file first and are renamed into place, so a crash
//! never leaves a half-written snapshot behind.

pub mod connection;
pub mod snapshot_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use snapshot_repository::JsonSnapshotRepository;
