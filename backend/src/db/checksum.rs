//! Dataset fingerprints used as cache keys.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `content`.
pub fn calculate_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Hex-encoded SHA-256 over the bit patterns of `timestamps`, in order.
pub fn timestamps_checksum(timestamps: &[f64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update((timestamps.len() as u64).to_le_bytes());
    for t in timestamps {
        hasher.update(t.to_bits().to_le_bytes());
    }
    hex::encode(hasher.finalize())
}
