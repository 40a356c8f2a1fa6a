//! Content fingerprinting.
//!
//! Two digests are computed per document: an exact SHA-256 hash used as the
//! document identity and storage dedup key, and a fuzzy similarity hash used
//! for near-duplicate detection. Both are computed once at discovery over
//! raw file bytes and again after recognition over the extracted text; the
//! two digests will generally differ and callers pick which one their stage
//! treats as authoritative.

use fuzzyhash::FuzzyHash;
use sha2::{Digest, Sha256};

/// Exact content hash as a lowercase hex digest.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Best-effort fuzzy similarity hash.
///
/// Returns an empty string when no digest can be computed (e.g. empty
/// content); this never fails the pipeline.
pub fn fuzzy_hash(content: &[u8]) -> String {
    if content.is_empty() {
        return String::new();
    }
    FuzzyHash::new(content).to_string()
}
