//! Signing identity extracted from a keystore.

use super::crypto::{CertChain, KeyAlgorithm, KeyPair, X509Cert};

/// Immutable bundle of leaf certificate, certificate chain and key pair.
///
/// Constructed once per signing identity by the key material loader; never
/// mutated afterwards. Cloning shares the underlying OpenSSL key handles.
///
/// The private key handle lives until the last clone is dropped and is not
/// securely erased.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    alias: String,
    certificate: X509Cert,
    certificate_chain: CertChain,
    key_pair: KeyPair,
}

impl KeyMaterial {
    pub(crate) fn new(
        alias: String,
        certificate: X509Cert,
        certificate_chain: CertChain,
        key_pair: KeyPair,
    ) -> Self {
        Self {
            alias,
            certificate,
            certificate_chain,
            key_pair,
        }
    }

    /// Alias the material was loaded from.
    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Leaf certificate identifying the signer.
    #[must_use]
    pub fn certificate(&self) -> &X509Cert {
        &self.certificate
    }

    /// Chain as stored in the keystore, leaf first.
    #[must_use]
    pub fn certificate_chain(&self) -> &CertChain {
        &self.certificate_chain
    }

    #[must_use]
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    #[must_use]
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        self.key_pair.algorithm()
    }
}
