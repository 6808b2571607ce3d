//! Text fingerprinting shared by both processes.
//!
//! The background process stores the hash and later asks the content process to
//! uncensor by it, so the value must be identical for the same input everywhere.

use crate::types::HashId;

/// Polynomial rolling hash over UTF-16 code units: `h = h * 31 + unit`,
/// wrapped to a signed 32-bit integer at every step.
pub fn hash_text(text: &str) -> HashId {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
