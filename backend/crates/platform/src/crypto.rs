//! Cryptographic Utilities

use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// The operating system random source could not be read
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct RandomSourceError(String);

/// Generate cryptographically secure random bytes
///
/// Fails instead of degrading to a weaker source when the OS RNG is unavailable.
pub fn try_random_bytes(len: usize) -> Result<Vec<u8>, RandomSourceError> {
    let mut bytes = vec![0u8; len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| RandomSourceError(e.to_string()))?;
    Ok(bytes)
}

/// Encode bytes as lowercase hex
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// Constant-time comparison to prevent timing attacks
///
/// Inputs of different length compare unequal without touching their content.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
