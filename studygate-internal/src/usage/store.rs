use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config_parser::StorageConfig;
use crate::error::{Error, ErrorDetails};
use crate::usage::UsageSnapshot;

/// Full-document usage store.
///
/// There are no partial-key writes: callers load the whole snapshot, mutate
/// it, and persist it back. The `JsonFile` variant replaces the document
/// atomically (temp file + rename) so a crashed write never leaves a
/// half-written store behind.
#[derive(Clone, Debug)]
pub enum UsageStore {
    JsonFile { path: PathBuf },
    Memory { data: Arc<RwLock<UsageSnapshot>> },
}

impl UsageStore {
    pub fn new(config: &StorageConfig) -> Self {
        match config {
            StorageConfig::JsonFile { path } => UsageStore::JsonFile { path: path.clone() },
            StorageConfig::Memory => Self::new_memory(),
        }
    }

    pub fn new_memory() -> Self {
        UsageStore::Memory {
            data: Arc::new(RwLock::new(UsageSnapshot::default())),
        }
    }

    /// Loads the full snapshot. A store that doesn't exist yet yields an
    /// empty snapshot; a store that exists but can't be read or parsed is an
    /// error (never silently reset counters).
    pub async fn load(&self) -> Result<UsageSnapshot, Error> {
        match self {
            UsageStore::JsonFile { path } => {
                let contents = match tokio::fs::read(path).await {
                    Ok(contents) => contents,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        return Ok(UsageSnapshot::default());
                    }
                    Err(e) => {
                        return Err(Error::new(ErrorDetails::Storage {
                            message: format!("Failed to read {}: {e}", path.display()),
                        }));
                    }
                };
                serde_json::from_slice(&contents).map_err(|e| {
                    Error::new(ErrorDetails::Storage {
                        message: format!("Failed to parse {}: {e}", path.display()),
                    })
                })
            }
            UsageStore::Memory { data } => Ok(data.read().await.clone()),
        }
    }

    /// Durably replaces the store contents with `snapshot`.
    pub async fn persist(&self, snapshot: &UsageSnapshot) -> Result<(), Error> {
        match self {
            UsageStore::JsonFile { path } => {
                let contents = serde_json::to_vec_pretty(snapshot).map_err(|e| {
                    Error::new(ErrorDetails::Storage {
                        message: format!("Failed to serialize usage snapshot: {e}"),
                    })
                })?;
                let tmp_path = path.with_extension("json.tmp");
                tokio::fs::write(&tmp_path, &contents).await.map_err(|e| {
                    Error::new(ErrorDetails::Storage {
                        message: format!("Failed to write {}: {e}", tmp_path.display()),
                    })
                })?;
                tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
                    Error::new(ErrorDetails::Storage {
                        message: format!(
                            "Failed to rename {} to {}: {e}",
                            tmp_path.display(),
                            path.display()
                        ),
                    })
                })
            }
            UsageStore::Memory { data } => {
                *data.write().await = snapshot.clone();
                Ok(())
            }
        }
    }
}
