/// Compute the BLAKE3 hash of a byte slice, returning the hex-encoded digest.
#[must_use]
pub fn blake3_bytes(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// First `len` hex characters of the BLAKE3 digest of `data`.
///
/// Used where a stable, filesystem-safe stand-in for arbitrary text is needed.
#[must_use]
pub fn short_digest(data: &[u8], len: usize) -> String {
    let mut hex = blake3_bytes(data);
    hex.truncate(len);
    hex
}
