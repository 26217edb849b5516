//! Type-safe wrappers using new-type pattern
//!
//! Secrets and keystore selectors are wrapped so they cannot be confused
//! with each other and never end up in debug output.

use std::fmt;

/// Keystore or key password.
///
/// `Debug` is redacted. The value is held in memory unprotected.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Password(password.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// UTF-16BE encoding of the password, the byte form Java keystores key their digests with.
    #[must_use]
    pub fn utf16_be_bytes(&self) -> Vec<u8> {
        self.0.encode_utf16().flat_map(u16::to_be_bytes).collect()
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Password::new(value)
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Password(value)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Keystore entry alias.
///
/// Java keystores treat aliases case-insensitively; comparisons here do too.
#[derive(Debug, Clone)]
pub struct KeyAlias(String);

impl KeyAlias {
    pub fn new(alias: impl Into<String>) -> Self {
        KeyAlias(alias.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.to_lowercase() == other.to_lowercase()
    }
}

impl fmt::Display for KeyAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyAlias {
    fn from(value: &str) -> Self {
        KeyAlias::new(value)
    }
}
