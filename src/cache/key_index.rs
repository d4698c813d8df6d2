//! Key Index Module
//!
//! Maps a namespaced cache key to the compact key handed to the backend.

const HASH1_SEED: u32 = 5381;
const HASH2_SEED: u32 = 0;

// == Key Index ==
/// Computes the storage key for raw bytes.
///
/// Two independent 32-bit rolling hashes plus the byte length, formatted as
/// `"<hash1>:<hash2>:<length>"`. Collisions are possible; readers detect them
/// through the original key stored in the envelope.
pub fn key_index(input: impl AsRef<[u8]>) -> String {
    let bytes = input.as_ref();
    let mut hash1 = HASH1_SEED;
    let mut hash2 = HASH2_SEED;

    for &byte in bytes {
        hash1 = hash1.wrapping_mul(33).wrapping_add(u32::from(byte));
        hash2 = (hash2 << 4) ^ (hash2 >> 28) ^ u32::from(byte);
    }

    format!("{}:{}:{}", hash1, hash2, bytes.len())
}

/// Storage key of `key` inside `namespace`.
pub fn namespaced_index(namespace: &str, key: &str) -> String {
    key_index(format!("{}#{}", namespace, key))
}
