//! Docwatch Core - Document model and fingerprinting for the watch pipeline.

mod fingerprint;
mod types;

pub use fingerprint::{fuzzy_hash, sha256_hex};
pub use types::*;
