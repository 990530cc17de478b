//! Persistence of engine state across process restarts.
//!
//! The engine never calls a store itself. Callers take a
//! [`LedgerSnapshot`] with `Multisig::snapshot`, save it, and hand a loaded
//! one back to `Multisig::restore`.

pub mod file;
pub mod lock;
pub mod memory;
pub mod snapshot;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::serialization::SerializationError;

pub use file::FileStateStore;
pub use lock::StateLock;
pub use memory::MemoryStateStore;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("state file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the state file.
    #[error("state file '{}' is in use by another cosign process", .0.display())]
    Locked(PathBuf),

    /// Encoded state could not be produced or understood.
    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// Load/save pair for engine snapshots.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Last saved snapshot, or `None` if nothing was ever saved.
    async fn load(&self) -> StoreResult<Option<LedgerSnapshot>>;

    /// Persist `snapshot`, replacing the previous one.
    async fn save(&self, snapshot: &LedgerSnapshot) -> StoreResult<()>;
}
