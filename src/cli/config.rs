//! Cosign configuration file handling
//!
//! Provides default configuration generation and loading for the CLI.
//! Configuration files are TOML format and stored adjacent to the state file.
//!
//! ## Operator vs Group Configuration
//!
//! This file contains OPERATOR configuration only: where state lives and how
//! much to log.
//!
//! **Membership and threshold** are engine state, set once with
//! `cosign init` and stored in the state file. They are never read from
//! this file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// State file name inside the data directory
const STATE_FILE_NAME: &str = "state.cbor";

/// Cosign CLI configuration (OPERATOR settings only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosignConfig {
    /// State file configuration
    pub store: StoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the engine snapshot is kept
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the CBOR state file
    pub state_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error,
    /// or e.g. "cosign=debug"). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl CosignConfig {
    /// Create a new configuration with the given state path
    pub fn new(state_path: PathBuf) -> Self {
        Self {
            store: StoreConfig { state_path },
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: CosignConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(state_path: &Path) -> String {
        format!(
            r#"# Cosign Configuration (Operator Settings)
#
# This file only says where state is kept and how much to log.
#
# MEMBERS AND THRESHOLD are not configured here. They are set once with
# `cosign init` and live in the state file together with the proposals.

[store]
# Path to the CBOR state file
state_path = "{state_path}"

[logging]
# Log level: trace, debug, info, warn, error
# RUST_LOG takes precedence when set
level = "info"
"#,
            state_path = state_path.display()
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        state_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(state_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }

    /// Load `config_path`, writing a default one first if it does not exist
    pub fn load_or_create(
        config_path: &Path,
        state_path: &Path,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        if !config_path.exists() {
            Self::create_default(config_path, state_path)?;
        }
        Self::load(config_path)
    }
}

/// Get the default config file path based on the state path
///
/// The config file is stored next to the state file:
/// - State: ~/.local/share/cosign/state.cbor
/// - Config: ~/.local/share/cosign/config.toml
pub fn default_config_path(state_path: &Path) -> PathBuf {
    state_path
        .parent()
        .unwrap_or(state_path)
        .join("config.toml")
}

/// Get the default state path
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cosign")
        .join(STATE_FILE_NAME)
}
