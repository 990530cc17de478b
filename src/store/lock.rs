//! Exclusive ownership of a state file across processes.
//!
//! Every CLI invocation loads the whole state, mutates it and writes it
//! back. Two of them interleaving would silently drop one side's changes,
//! so a session holds an OS file lock on a sibling `.lock` file for its
//! whole load/mutate/save cycle. The lock goes away with the process even
//! after a crash.

use fs2::FileExt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use super::{StoreError, StoreResult};

/// Held exclusive lock on a state file. Released on drop.
#[derive(Debug)]
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Lock `state_path` without blocking.
    ///
    /// Fails with [`StoreError::Locked`] when another process (or another
    /// handle in this one) already holds it.
    pub fn acquire(state_path: &Path) -> StoreResult<Self> {
        let path = lock_path(state_path);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(&path).map_err(io_err)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired state lock");
                Ok(Self { file, path })
            }
            Err(e) if is_contended(&e) => {
                error!(path = %state_path.display(), "state file is locked by another process");
                Err(StoreError::Locked(state_path.to_path_buf()))
            }
            Err(e) => Err(io_err(e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        match FileExt::unlock(&self.file) {
            Ok(()) => debug!(path = %self.path.display(), "released state lock"),
            Err(e) => error!(path = %self.path.display(), error = %e, "failed to release state lock"),
        }
    }
}

/// `state.cbor` locks through `state.lock` beside it.
fn lock_path(state_path: &Path) -> PathBuf {
    state_path.with_extension("lock")
}

// EWOULDBLOCK is 11 on Linux and 35 on macOS; some platforms report it raw.
fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock || matches!(e.raw_os_error(), Some(11) | Some(35))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.cbor");

        let held = StateLock::acquire(&state).unwrap();
        assert_eq!(held.path(), dir.path().join("state.lock"));
        match StateLock::acquire(&state) {
            Err(StoreError::Locked(path)) => assert_eq!(path, state),
            other => panic!("expected Locked, got {other:?}"),
        }

        drop(held);
        assert!(StateLock::acquire(&state).is_ok());
    }

    #[test]
    fn test_acquire_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("nested").join("state.cbor");

        let lock = StateLock::acquire(&state).unwrap();
        assert!(lock.path().exists());
        // The state file itself is left alone
        assert!(!state.exists());
    }

    #[test]
    fn test_distinct_state_files_lock_independently() {
        let dir = TempDir::new().unwrap();
        let _a = StateLock::acquire(&dir.path().join("a.cbor")).unwrap();
        assert!(StateLock::acquire(&dir.path().join("b.cbor")).is_ok());
    }
}
