//! # JSON Snapshot Repository
//!
//! File-backed `SnapshotStorage`. One file per key, replaced atomically.

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use tracing::{debug, info};

use super::connection::JsonConnection;
use crate::storage::traits::SnapshotStorage;

#[derive(Clone)]
pub struct JsonSnapshotRepository {
    connection: JsonConnection,
}

impl JsonSnapshotRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &JsonConnection {
        &self.connection
    }
}

impl SnapshotStorage for JsonSnapshotRepository {
    fn load_snapshot(&self, key: &str) -> Result<Option<String>> {
        let path = self.connection.snapshot_path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Loaded snapshot from {:?}", path);
                Ok(Some(contents))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No snapshot at {:?}, starting fresh", path);
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read snapshot {}", path.display())),
        }
    }

    fn save_snapshot(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.connection.snapshot_path(key);
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            fs::create_dir_all(base_dir)
                .with_context(|| format!("Failed to create data directory {}", base_dir.display()))?;
        }

        // Atomic write: temp file, then rename over the target
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Saved snapshot to {:?} ({} bytes)", path, contents.len());
        Ok(())
    }
}
