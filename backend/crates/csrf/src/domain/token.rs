//! CSRF Token Value Object

use std::fmt;

use platform::crypto::{constant_time_eq, to_hex, try_random_bytes};

use crate::error::{CsrfError, CsrfResult};

/// Per-response-cycle nonce, hex encoded
///
/// Not bound to any user identity. The `Debug` output is redacted so tokens
/// never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub const DEFAULT_LENGTH: usize = 32;

    /// Mint a token of `len` random bytes (`2 * len` hex characters)
    pub fn generate(len: usize) -> CsrfResult<Self> {
        if len == 0 {
            return Err(CsrfError::InvalidConfig(
                "token length must be at least 1 byte".into(),
            ));
        }
        let bytes = try_random_bytes(len)?;
        Ok(Self(to_hex(&bytes)))
    }

    /// Wrap an already-issued token value (e.g. from a cookie)
    pub fn from_issued(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Constant-time check of a client-submitted value against this token
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), submitted.as_bytes())
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"<redacted>").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CsrfToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
