//! Canonical hashing
//!
//! Every hash in the pipeline is SHA-256 over a hand-written canonical
//! string, rendered as lowercase hex. Serde output is never hashed.

use sha2::{Sha256, Digest};
use crate::types::EvidenceKind;

/// SHA-256 helper
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hash a canonical string to hex
pub fn hash_canonical(canonical: &str) -> String {
    to_hex(&sha256(canonical.as_bytes()))
}

/// Hash an opaque connector reference into an evidence hash.
/// The reference itself never leaves this function.
pub fn evidence_hash(kind: EvidenceKind, opaque_ref: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update([0u8]); // Separator
    hasher.update(opaque_ref.as_bytes());
    let result: [u8; 32] = hasher.finalize().into();
    to_hex(&result)
}

/// Lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
