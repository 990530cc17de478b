//! CBOR state file.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{LedgerSnapshot, StateStore, StoreError, StoreResult};
use crate::serialization::{from_cbor, to_cbor};

/// Snapshot stored as a single CBOR file.
///
/// Saves write a sibling `.tmp` file and rename it over the target, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> StoreResult<Option<LedgerSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(&self.path, e)),
        };
        let snapshot: LedgerSnapshot = from_cbor(&bytes)?;
        debug!(
            path = %self.path.display(),
            proposals = snapshot.proposals.len(),
            "state loaded"
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &LedgerSnapshot) -> StoreResult<()> {
        let bytes = to_cbor(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(parent, e))?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| self.io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(&self.path, e))?;

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            "state saved"
        );
        Ok(())
    }
}
