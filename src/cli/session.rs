//! One CLI invocation's view of the engine: load the state file, run a
//! command, save if anything changed.

use cosign::{Capabilities, FileStateStore, Multisig, StateLock, StateStore};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use super::config::{default_config_path, default_state_path, CosignConfig};

/// Resolved file locations for this invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub config: PathBuf,
    pub state: PathBuf,
}

impl Paths {
    /// Resolve paths from the global flags.
    ///
    /// Without `--config` the config file sits next to the state file.
    pub fn resolve(config: Option<&str>, state: Option<&str>) -> Self {
        let state = state.map(PathBuf::from).unwrap_or_else(default_state_path);
        let config = config
            .map(PathBuf::from)
            .unwrap_or_else(|| default_config_path(&state));
        Self { config, state }
    }
}

/// Load the operator config; `--state` overrides the configured state path.
pub fn load_config(
    paths: &Paths,
    state_override: bool,
) -> Result<CosignConfig, Box<dyn std::error::Error>> {
    let mut config = CosignConfig::load_or_create(&paths.config, &paths.state)?;
    if state_override {
        config.store.state_path = paths.state.clone();
    }
    Ok(config)
}

/// Install the stderr log subscriber. `RUST_LOG` wins over the config level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Engine loaded from the state file. The file stays locked until the
/// session is dropped.
pub struct Session {
    store: FileStateStore,
    pub multisig: Multisig,
    _lock: StateLock,
}

impl Session {
    pub async fn open(state_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let lock = StateLock::acquire(state_path)?;
        let store = FileStateStore::new(state_path);
        let multisig = match store.load().await? {
            Some(snapshot) => Multisig::from_snapshot(snapshot, Capabilities::default())
                .map_err(|e| format!("State file '{}' rejected: {}", state_path.display(), e))?,
            None => {
                debug!(path = %state_path.display(), "no state file, starting empty");
                Multisig::new()
            }
        };
        Ok(Self {
            store,
            multisig,
            _lock: lock,
        })
    }

    /// Persist the current engine state.
    pub async fn commit(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.save(&self.multisig.snapshot()).await?;
        Ok(())
    }

    /// Fail early with a hint when `cosign init` has not run yet.
    pub fn require_configured(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.multisig.is_configured() {
            Ok(())
        } else {
            Err(format!(
                "No group configured in '{}'. Run `cosign init` first.",
                self.store.path().display()
            )
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn member(c: char) -> cosign::MemberId {
        cosign::MemberId::new(format!("G{}", c.to_string().repeat(55)))
    }

    #[test]
    fn test_paths_default_config_adjacent_to_state() {
        let paths = Paths::resolve(None, Some("/data/cosign/state.cbor"));
        assert_eq!(paths.state, PathBuf::from("/data/cosign/state.cbor"));
        assert_eq!(paths.config, PathBuf::from("/data/cosign/config.toml"));
    }

    #[test]
    fn test_paths_explicit_config() {
        let paths = Paths::resolve(Some("/etc/cosign.toml"), Some("/data/state.cbor"));
        assert_eq!(paths.config, PathBuf::from("/etc/cosign.toml"));
    }

    #[test]
    fn test_load_config_state_override() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        CosignConfig::new(PathBuf::from("/elsewhere/state.cbor"))
            .save(&config_path)
            .unwrap();

        let paths = Paths {
            config: config_path,
            state: dir.path().join("state.cbor"),
        };
        let kept = load_config(&paths, false).unwrap();
        assert_eq!(kept.store.state_path, PathBuf::from("/elsewhere/state.cbor"));

        let overridden = load_config(&paths, true).unwrap();
        assert_eq!(overridden.store.state_path, paths.state);
    }

    #[tokio::test]
    async fn test_session_commit_and_reopen() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.cbor");

        let session = Session::open(&state).await.unwrap();
        assert!(session.require_configured().is_err());
        session
            .multisig
            .configure(vec![member('A'), member('B')], 2)
            .unwrap();
        session.commit().await.unwrap();
        drop(session);

        let reopened = Session::open(&state).await.unwrap();
        assert!(reopened.require_configured().is_ok());
        assert_eq!(reopened.multisig.quorum_size().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_session_excludes_concurrent_open() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.cbor");

        let first = Session::open(&state).await.unwrap();
        let err = match Session::open(&state).await {
            Ok(_) => panic!("second session opened while the first was live"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("in use by another cosign process"));

        drop(first);
        assert!(Session::open(&state).await.is_ok());
    }

    #[tokio::test]
    async fn test_session_rejects_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let state = dir.path().join("state.cbor");
        std::fs::write(&state, b"garbage").unwrap();

        assert!(Session::open(&state).await.is_err());
    }
}
