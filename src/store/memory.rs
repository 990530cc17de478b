//! In-memory store for tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::{LedgerSnapshot, StateStore, StoreResult};
use crate::locks;

/// Store that keeps the last saved snapshot in memory.
///
/// Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryStateStore {
    slot: Arc<Mutex<Option<LedgerSnapshot>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load a snapshot (for test setup).
    pub fn put(&self, snapshot: LedgerSnapshot) {
        *locks::lock(&self.slot) = Some(snapshot);
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> StoreResult<Option<LedgerSnapshot>> {
        Ok(locks::lock(&self.slot).clone())
    }

    async fn save(&self, snapshot: &LedgerSnapshot) -> StoreResult<()> {
        *locks::lock(&self.slot) = Some(snapshot.clone());
        Ok(())
    }
}
