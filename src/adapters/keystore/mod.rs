//! Keystore adapters.
//!
//! Turns keystore bytes plus passwords into certificates and private keys
//! behind one `KeyStore` trait, so the key material loader does not care
//! which on-disk format it was handed.

pub mod jks;
pub mod pkcs12;

use std::fmt;
use std::str::FromStr;

use openssl::pkey::{PKey, Private};

use crate::domain::constants;
use crate::domain::crypto::{CertChain, X509Cert};
use crate::domain::types::Password;
use crate::infra::error::KeyStoreError;

pub use jks::{JavaKeyStore, JksWriter};
pub use pkcs12::Pkcs12KeyStore;

/// Read access to an opened keystore.
pub trait KeyStore {
    /// Aliases in enumeration order. The first one is the default alias.
    fn aliases(&self) -> Vec<String>;

    fn contains_alias(&self, alias: &str) -> bool;

    /// True when the entry holds a private key (as opposed to a trusted certificate).
    fn is_key_entry(&self, alias: &str) -> bool;

    /// Leaf certificate of a key entry, or the certificate of a trusted entry.
    fn certificate(&self, alias: &str) -> Option<X509Cert>;

    /// Chain stored with a key entry, leaf first.
    fn certificate_chain(&self, alias: &str) -> Option<CertChain>;

    /// Recover the private key of a key entry.
    fn private_key(
        &self,
        alias: &str,
        key_password: &Password,
    ) -> Result<PKey<Private>, KeyStoreError>;
}

/// Supported keystore encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStoreFormat {
    Jks,
    Pkcs12,
}

impl KeyStoreFormat {
    /// Guess the format from the leading bytes.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.get(..4) == Some(&constants::JKS_MAGIC.to_be_bytes()[..]) {
            Some(KeyStoreFormat::Jks)
        } else if bytes.first() == Some(&0x30) {
            Some(KeyStoreFormat::Pkcs12)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStoreFormat::Jks => "jks",
            KeyStoreFormat::Pkcs12 => "pkcs12",
        }
    }
}

impl fmt::Display for KeyStoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jks" => Ok(KeyStoreFormat::Jks),
            "pkcs12" | "p12" | "pfx" => Ok(KeyStoreFormat::Pkcs12),
            other => Err(format!("unknown keystore format: {other}")),
        }
    }
}

/// Open keystore bytes in the given format (or the detected one).
pub fn open(
    format: Option<KeyStoreFormat>,
    bytes: &[u8],
    store_password: &Password,
) -> Result<Box<dyn KeyStore>, KeyStoreError> {
    let format = match format {
        Some(format) => format,
        None => KeyStoreFormat::detect(bytes).ok_or_else(|| {
            KeyStoreError::Malformed("unrecognised keystore encoding".to_string())
        })?,
    };
    log::debug!("Opening {format} keystore ({} bytes)", bytes.len());

    match format {
        KeyStoreFormat::Jks => Ok(Box::new(JavaKeyStore::decode(bytes, store_password)?)),
        KeyStoreFormat::Pkcs12 => Ok(Box::new(Pkcs12KeyStore::decode(bytes, store_password)?)),
    }
}
