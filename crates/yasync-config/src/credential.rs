//! The daemon API key.
//!
//! Held in memory for the lifetime of one invocation, zeroized on drop and
//! redacted in `Debug` output so it never ends up in logs by accident.

use std::fmt;

use zeroize::Zeroize;

/// An opaque API key with automatic zeroization.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    inner: String,
}

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// The raw key. Only the request header and `show` output need this.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("inner", &"[REDACTED]")
            .field("len", &self.inner.len())
            .finish()
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}
