//! Deterministic world checksums.
//!
//! Peers compare checksums after each tick to detect desyncs.

use sha2::{Digest, Sha256};

use game_core::WorldState;

use crate::repository::RepositoryError;

/// SHA-256 of the bincode encoding of the world, hex encoded.
pub fn world_checksum(world: &WorldState) -> Result<String, RepositoryError> {
    let bytes =
        bincode::serialize(world).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// First 8 bytes of the checksum, for compact logging.
pub fn short_checksum(checksum: &str) -> &str {
    checksum.get(..16).unwrap_or(checksum)
}
