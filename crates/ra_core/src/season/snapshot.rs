//! Season snapshot persistence.
//!
//! Format: an 8-byte magic, a SHA-256 checksum, then the LZ4-compressed
//! (size-prepended) MessagePack encoding of the snapshot document.
//! MessagePack round-trips every `f64` bit-exactly, so totals survive the
//! read -> merge -> write cycle with zero precision loss. Writes are
//! atomic: temp file, fsync, rename.

use std::fs::{rename, File};
use std::io::{Read, Write};
use std::path::Path;

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::SeasonAccumulator;

pub const SNAPSHOT_VERSION: u32 = 1;
const MAGIC: &[u8; 8] = b"RASNAP01";
const CHECKSUM_LEN: usize = 32;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("decompression error")]
    Decompression,

    #[error("not a snapshot file (bad header)")]
    BadHeader,

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("snapshot not found: {path}")]
    FileNotFound { path: String },
}

/// On-disk document: version + creation stamp + the accumulator itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub version: u32,
    /// Unix milliseconds at write time
    pub created_ms: i64,
    pub season: SeasonAccumulator,
}

impl SeasonSnapshot {
    pub fn new(season: SeasonAccumulator) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            created_ms: chrono::Utc::now().timestamp_millis(),
            season,
        }
    }

    pub fn created_rfc3339(&self) -> String {
        use time::{format_description::well_known::Rfc3339, OffsetDateTime};
        OffsetDateTime::from_unix_timestamp_nanos(self.created_ms as i128 * 1_000_000)
            .ok()
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Serialize, compress and atomically write the accumulator.
pub fn save(path: &Path, season: &SeasonAccumulator) -> Result<(), SnapshotError> {
    let snapshot = SeasonSnapshot::new(season.clone());
    let payload = compress_prepend_size(&to_vec_named(&snapshot)?);

    let mut data = Vec::with_capacity(MAGIC.len() + CHECKSUM_LEN + payload.len());
    data.extend_from_slice(MAGIC);
    data.extend_from_slice(&Sha256::digest(&payload));
    data.extend_from_slice(&payload);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Atomic save: write to temp file, then rename
    let temp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }
    rename(&temp_path, path)?;

    log::debug!("saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

/// Read and verify a snapshot file.
pub fn load(path: &Path) -> Result<SeasonAccumulator, SnapshotError> {
    if !path.exists() {
        return Err(SnapshotError::FileNotFound { path: path.display().to_string() });
    }

    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    if data.len() < MAGIC.len() + CHECKSUM_LEN || &data[..MAGIC.len()] != MAGIC {
        return Err(SnapshotError::BadHeader);
    }
    let (checksum, payload) = data[MAGIC.len()..].split_at(CHECKSUM_LEN);
    if Sha256::digest(payload).as_slice() != checksum {
        return Err(SnapshotError::ChecksumMismatch);
    }

    let raw = decompress_size_prepended(payload).map_err(|_| SnapshotError::Decompression)?;
    let snapshot: SeasonSnapshot = from_slice(&raw)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::VersionMismatch {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }

    log::debug!("loaded {} bytes from {:?}", data.len(), path);
    Ok(snapshot.season)
}

/// Load a snapshot, or start a fresh season when none exists yet.
pub fn load_or_default(path: &Path) -> Result<SeasonAccumulator, SnapshotError> {
    match load(path) {
        Ok(season) => Ok(season),
        Err(SnapshotError::FileNotFound { .. }) => Ok(SeasonAccumulator::default()),
        Err(e) => Err(e),
    }
}
