//! Snapshot codec: the persisted subset of state <-> durable text.
//!
//! The store itself never touches storage; the lifecycle wrapper encodes the
//! state after each mutation and decodes it once at startup.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

use shared::{PersistedSnapshot, PersistedState};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    state: &'a PersistedState,
    version: u32,
}

/// Serialize the persisted subset of state, tagged with the schema version.
///
/// Fails when the text would not decode again (JSON has no infinity, so a
/// non-finite number is written as `null`).
pub fn encode(state: &PersistedState, version: u32) -> Result<String> {
    let raw = serde_json::to_string(&SnapshotRef { state, version }).context("Failed to serialize snapshot")?;
    serde_json::from_str::<PersistedSnapshot>(&raw)
        .context("Snapshot would not read back; state holds a non-finite number")?;
    Ok(raw)
}

/// Parse a stored snapshot. Returns `None` when the text is unreadable or
/// was written under a different schema version.
pub fn decode(raw: &str, expected_version: u32) -> Option<PersistedState> {
    match serde_json::from_str::<PersistedSnapshot>(raw) {
        Ok(snapshot) if snapshot.version == expected_version => Some(snapshot.state),
        Ok(snapshot) => {
            warn!(
                "Ignoring snapshot with schema version {} (expected {})",
                snapshot.version, expected_version
            );
            None
        }
        Err(e) => {
            warn!("Ignoring unreadable snapshot: {}", e);
            None
        }
    }
}
