//! CBOR encoding for the persisted ledger state.
//!
//! - CBOR via `ciborium` for the state file; JSON only for CLI output
//! - New snapshot fields must be `#[serde(default)]` so older files still load

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Serialization errors.
#[derive(Debug, Error)]
pub enum SerializationError {
    /// CBOR encoding failed.
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    /// CBOR decoding failed.
    #[error("CBOR decoding failed: {0}")]
    Decode(String),
}

/// Serialize to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(format!("{:?}", e)))?;
    Ok(bytes)
}

/// Deserialize from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(format!("{:?}", e)))
}
