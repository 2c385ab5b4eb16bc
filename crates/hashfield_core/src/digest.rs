//! Text digest used by derived hash columns.
//!
//! # Responsibility
//! - Map arbitrary-length text to a fixed-length lookup key.
//! - Recognize well-formed digests on read paths.
//!
//! # Invariants
//! - Output is always `DIGEST_LEN` lowercase hex characters.
//! - The same input always yields the same output.

use once_cell::sync::Lazy;
use regex::Regex;
use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest.
pub const DIGEST_LEN: usize = 40;

static HEX_DIGEST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{40}$").expect("valid hex digest regex"));

/// Computes the SHA-1 digest of the UTF-8 bytes of `value` as lowercase hex.
pub fn hash_text(value: &str) -> String {
    let digest = Sha1::digest(value.as_bytes());
    format!("{digest:x}")
}

/// Returns whether `value` has the exact shape produced by [`hash_text`].
pub fn is_hex_digest(value: &str) -> bool {
    HEX_DIGEST_RE.is_match(value)
}
