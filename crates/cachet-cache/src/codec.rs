//! Gzip-compressed JSON encoding for cached values

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheError;

/// Serialize a value to JSON and gzip it
///
/// # Errors
///
/// Returns an error if serialization or compression fails
pub fn compress<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CacheError> {
    let json = serde_json::to_vec(value).map_err(|e| CacheError::Serialization(format!("serialize: {e}")))?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|e| CacheError::Serialization(format!("compress: {e}")))?;
    encoder
        .finish()
        .map_err(|e| CacheError::Serialization(format!("compress: {e}")))
}

/// Gunzip a stored value and deserialize the JSON inside
///
/// # Errors
///
/// Returns an error if the bytes are not gzip or the JSON does not match `T`
pub fn decompress<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CacheError> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|e| CacheError::Serialization(format!("decompress: {e}")))?;

    serde_json::from_slice(&json).map_err(|e| CacheError::Serialization(format!("deserialize: {e}")))
}
