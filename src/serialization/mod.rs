//! Encodings used by the engine.
//!
//! - Snapshots: CBOR (`ciborium`) inside a versioned envelope, so a restore
//!   can refuse a layout it does not understand. Fields added later carry
//!   `#[serde(default)]` and decode from older snapshots.
//! - Digests: hex SHA-256 over the CBOR encoding. CBOR of the same value is
//!   byte-for-byte stable, which makes receipt ids reproducible.
//! - Wire protocol: JSON (`serde_json`), the shape chain clients send.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Snapshot layout written by this build.
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("CBOR encoding failed: {0}")]
    Encode(String),

    #[error("CBOR decoding failed: {0}")]
    Decode(String),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    version: u16,
    state: &'a T,
}

#[derive(Deserialize)]
struct Snapshot<T> {
    version: u16,
    state: T,
}

/// Version header only; read first so a newer layout is reported as such
/// rather than as a decode failure.
#[derive(Deserialize)]
struct SnapshotHeader {
    version: u16,
}

pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SerializationError::Encode(e.to_string()))?;
    Ok(bytes)
}

pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    ciborium::from_reader(bytes).map_err(|e| SerializationError::Decode(e.to_string()))
}

/// Wrap `state` in a snapshot envelope.
pub fn encode_snapshot<T: Serialize>(state: &T) -> Result<Vec<u8>, SerializationError> {
    to_cbor(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        state,
    })
}

/// Restore state written by [`encode_snapshot`].
pub fn decode_snapshot<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    let header: SnapshotHeader = from_cbor(bytes)?;
    if header.version != SNAPSHOT_VERSION {
        return Err(SerializationError::UnsupportedVersion {
            found: header.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    let snapshot: Snapshot<T> = from_cbor(bytes)?;
    Ok(snapshot.state)
}

/// Hex SHA-256 of the CBOR encoding of `value`.
pub fn digest<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    Ok(hex::encode(Sha256::digest(to_cbor(value)?)))
}

pub fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    Ok(serde_json::to_vec(value)?)
}

pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    Ok(serde_json::from_slice(bytes)?)
}
