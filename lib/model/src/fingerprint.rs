//! Content-addressed identities for query texts.
//!
//! The fingerprint of a text is the lower-case hexadecimal encoding of the SHA-256 digest of its
//! exact UTF-8 bytes. No normalization (whitespace, prefixes, ...) takes place. Two texts that
//! differ in a single byte have different fingerprints.

use sha2::{Digest, Sha256};

/// The length of a hex-encoded fingerprint.
pub const FINGERPRINT_LEN: usize = 64;

/// Computes the fingerprint of `text`.
///
/// An absent text has no fingerprint. This is not an error, the absence is simply propagated.
pub fn hash(text: Option<&str>) -> Option<String> {
    text.map(hash_str)
}

/// Computes the fingerprint of a text that is known to be present.
pub fn hash_str(text: &str) -> String {
    hex::encode(Sha256::new().chain_update(text.as_bytes()).finalize())
}
