//! # Storage Traits
//!
//! Abstraction over the place where the serialized snapshot lives, so the
//! domain layer works the same against files or memory.

use anyhow::Result;

/// Key/value slot holding one serialized snapshot per key
///
/// All operations are synchronous; callers hold the store lock while saving.
pub trait SnapshotStorage: Send + Sync {
    /// Read the text stored under `key`, or `None` if nothing was saved yet
    fn load_snapshot(&self, key: &str) -> Result<Option<String>>;

    /// Replace the text stored under `key`
    fn save_snapshot(&self, key: &str, contents: &str) -> Result<()>;
}
