use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// JsonConnection owns the data directory and maps storage keys to files
#[derive(Clone, Debug)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Open a connection, creating the base directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// File holding the snapshot for `key`
    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.base_directory
            .join(format!("{}.json", Self::safe_file_stem(key)))
    }

    /// Keep keys from escaping the data directory
    pub fn safe_file_stem(key: &str) -> String {
        let stem: String = key
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if stem.is_empty() {
            "snapshot".to_string()
        } else {
            stem
        }
    }
}
