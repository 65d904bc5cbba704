//! Content hashing over serializable values
//!
//! Values are hashed through their canonical JSON form. Object keys in a
//! `serde_json::Value` are kept sorted, so the digest depends only on the
//! data and never on struct field declaration order.

use serde::Serialize;
use sha2::digest::Output;
use sha2::{Digest, Sha256};

/// Length of identifiers returned by [`id`]
pub const ID_LEN: usize = 16;

/// Stable hex identifier for a serializable value
///
/// # Errors
///
/// Returns an error if the value cannot be represented as JSON
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(format!("{:x}", digest(value)?))
}

/// Non-negative integer derived from a serializable value
///
/// Suitable as a provider sampling seed. Equal values always produce the
/// same seed.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as JSON
pub fn seed<T: Serialize + ?Sized>(value: &T) -> Result<i64, serde_json::Error> {
    let folded = digest(value)?
        .iter()
        .take(8)
        .fold(0_u64, |acc, byte| (acc << 8) | u64::from(*byte));

    // Dropping the top bit keeps the result inside the positive i64 range
    Ok(i64::try_from(folded >> 1).unwrap_or_default())
}

/// Short fixed-length identifier over a list of string parts
///
/// Each part is length-prefixed before hashing, so `["ab", "c"]` and
/// `["a", "bc"]` never collide.
pub fn id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }

    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(ID_LEN);
    hex
}

fn digest<T: Serialize + ?Sized>(value: &T) -> Result<Output<Sha256>, serde_json::Error> {
    let canonical = serde_json::to_value(value)?;
    let json = serde_json::to_vec(&canonical)?;
    Ok(Sha256::digest(&json))
}
