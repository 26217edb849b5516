//! Key material loader.
//!
//! Opens a keystore from a byte stream and extracts the leaf certificate,
//! certificate chain and private key of one alias into an immutable
//! [`KeyMaterial`]. Every failure is a [`KeyStoreError`]; nothing partially
//! initialised escapes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::adapters::keystore::{self, KeyStore, KeyStoreFormat};
use crate::domain::crypto::{CertChain, KeyAlgorithm, KeyPair};
use crate::domain::material::KeyMaterial;
use crate::domain::types::{KeyAlias, Password};
use crate::infra::error::KeyStoreError;

/// Loads signing identities from keystores.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMaterialLoader {
    format: Option<KeyStoreFormat>,
}

impl KeyMaterialLoader {
    /// Loader that detects the keystore format from its leading bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_format(format: KeyStoreFormat) -> Self {
        Self {
            format: Some(format),
        }
    }

    /// Load key material from a keystore stream.
    ///
    /// With `alias` omitted the first alias the keystore enumerates is used
    /// (file order for JKS, so identical bytes always pick the same entry).
    /// The reader is consumed and dropped before this returns, on success
    /// and on failure alike.
    pub fn load<R: Read>(
        &self,
        mut reader: R,
        store_password: &Password,
        alias: Option<&str>,
        key_password: &Password,
    ) -> Result<KeyMaterial, KeyStoreError> {
        let mut bytes = Vec::new();
        let read = reader.read_to_end(&mut bytes);
        drop(reader);
        read?;

        self.load_bytes(&bytes, store_password, alias, key_password)
    }

    /// Load key material from a keystore file.
    pub fn load_file<P: AsRef<Path>>(
        &self,
        path: P,
        store_password: &Password,
        alias: Option<&str>,
        key_password: &Password,
    ) -> Result<KeyMaterial, KeyStoreError> {
        log::info!("Loading keystore from: {}", path.as_ref().display());
        let file = File::open(path.as_ref())?;
        self.load(file, store_password, alias, key_password)
    }

    /// Load key material from keystore bytes already in memory.
    pub fn load_bytes(
        &self,
        bytes: &[u8],
        store_password: &Password,
        alias: Option<&str>,
        key_password: &Password,
    ) -> Result<KeyMaterial, KeyStoreError> {
        let store = keystore::open(self.format, bytes, store_password)?;
        let alias = select_alias(store.as_ref(), alias)?;
        log::debug!("Selected keystore alias '{alias}'");

        if !store.is_key_entry(&alias) {
            return Err(KeyStoreError::NotAKeyEntry(alias));
        }

        let certificate = store.certificate(&alias).ok_or_else(|| {
            KeyStoreError::Certificate(format!("no certificate stored for alias '{alias}'"))
        })?;
        let certificate_chain = store
            .certificate_chain(&alias)
            .filter(|chain| !chain.is_empty())
            .unwrap_or_else(|| CertChain::new(vec![certificate.clone()]));

        let private_key = store.private_key(&alias, key_password)?;
        let algorithm = KeyAlgorithm::from_id(private_key.id()).ok_or_else(|| {
            KeyStoreError::UnsupportedKeyAlgorithm(format!(
                "key type {}",
                private_key.id().as_raw()
            ))
        })?;

        let public_key = certificate
            .public_key()
            .map_err(|e| KeyStoreError::Certificate(e.to_string()))?;
        if !public_key.public_eq(&*private_key) {
            return Err(KeyStoreError::KeyMismatch(alias));
        }

        log::info!(
            "Loaded {algorithm} key material for '{alias}' (subject: {}, chain length: {})",
            certificate.subject(),
            certificate_chain.len()
        );

        Ok(KeyMaterial::new(
            alias,
            certificate,
            certificate_chain,
            KeyPair::new(public_key, private_key, algorithm),
        ))
    }

    /// Aliases of a keystore in enumeration order.
    pub fn list_aliases(
        &self,
        bytes: &[u8],
        store_password: &Password,
    ) -> Result<Vec<String>, KeyStoreError> {
        Ok(keystore::open(self.format, bytes, store_password)?.aliases())
    }
}

fn select_alias(store: &dyn KeyStore, requested: Option<&str>) -> Result<String, KeyStoreError> {
    let aliases = store.aliases();
    match requested {
        Some(requested) => aliases
            .into_iter()
            .find(|alias| KeyAlias::from(requested).matches(alias))
            .ok_or_else(|| KeyStoreError::AliasNotFound(requested.to_string())),
        None => aliases.into_iter().next().ok_or(KeyStoreError::Empty),
    }
}
