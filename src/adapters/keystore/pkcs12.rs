//! PKCS#12 keystore backed by OpenSSL.
//!
//! A PKCS#12 file carries one key/certificate pair plus optional CA
//! certificates, all protected by a single password. The alias is the
//! certificate's friendly name, `"1"` when none is set.

use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509Ref;

use super::KeyStore;
use crate::domain::crypto::{CertChain, X509Cert};
use crate::domain::types::Password;
use crate::infra::error::KeyStoreError;

const DEFAULT_ALIAS: &str = "1";

pub struct Pkcs12KeyStore {
    alias: String,
    key: Option<PKey<Private>>,
    chain: Vec<X509Cert>,
    store_password: Password,
}

impl Pkcs12KeyStore {
    pub fn decode(bytes: &[u8], store_password: &Password) -> Result<Self, KeyStoreError> {
        let pkcs12 =
            Pkcs12::from_der(bytes).map_err(|e| KeyStoreError::Malformed(e.to_string()))?;
        let parsed = pkcs12.parse2(store_password.as_str()).map_err(|e| {
            log::debug!("PKCS#12 parse failed: {e}");
            KeyStoreError::IntegrityCheckFailed
        })?;

        let leaf = parsed
            .cert
            .ok_or_else(|| KeyStoreError::Malformed("PKCS#12 holds no certificate".to_string()))?;
        let alias = leaf
            .alias()
            .and_then(|name| std::str::from_utf8(name).ok())
            .map_or_else(|| DEFAULT_ALIAS.to_string(), str::to_string);

        let mut chain = vec![to_cert(&leaf)?];
        if let Some(ca) = parsed.ca {
            for cert in &ca {
                chain.push(to_cert(cert)?);
            }
        }

        Ok(Self {
            alias,
            key: parsed.pkey,
            chain,
            store_password: store_password.clone(),
        })
    }

    fn matches(&self, alias: &str) -> bool {
        self.alias.to_lowercase() == alias.to_lowercase()
    }
}

impl KeyStore for Pkcs12KeyStore {
    fn aliases(&self) -> Vec<String> {
        vec![self.alias.clone()]
    }

    fn contains_alias(&self, alias: &str) -> bool {
        self.matches(alias)
    }

    fn is_key_entry(&self, alias: &str) -> bool {
        self.matches(alias) && self.key.is_some()
    }

    fn certificate(&self, alias: &str) -> Option<X509Cert> {
        if self.matches(alias) {
            self.chain.first().cloned()
        } else {
            None
        }
    }

    fn certificate_chain(&self, alias: &str) -> Option<CertChain> {
        if self.is_key_entry(alias) {
            Some(CertChain::new(self.chain.clone()))
        } else {
            None
        }
    }

    fn private_key(
        &self,
        alias: &str,
        key_password: &Password,
    ) -> Result<PKey<Private>, KeyStoreError> {
        if !self.matches(alias) {
            return Err(KeyStoreError::AliasNotFound(alias.to_string()));
        }
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| KeyStoreError::NotAKeyEntry(alias.to_string()))?;
        let given = key_password.as_str().as_bytes();
        let expected = self.store_password.as_str().as_bytes();
        if given.len() != expected.len() || !openssl::memcmp::eq(given, expected) {
            return Err(KeyStoreError::UnrecoverableKey(alias.to_string()));
        }
        Ok(key.clone())
    }
}

fn to_cert(cert: &X509Ref) -> Result<X509Cert, KeyStoreError> {
    let der = cert
        .to_der()
        .map_err(|e| KeyStoreError::Certificate(e.to_string()))?;
    X509Cert::from_der(der).map_err(|e| KeyStoreError::Certificate(e.to_string()))
}
