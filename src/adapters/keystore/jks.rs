//! Java KeyStore (JKS) codec.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! magic u32 | version u32 | count u32 | entry* | SHA-1 integrity digest (20 bytes)
//! entry   = tag u32 | alias utf | timestamp u64 | body
//! body(1) = key length u32 | protected key | chain count u32 | certificate*
//! body(2) = certificate
//! certificate = [type utf, version 2 only] | length u32 | DER bytes
//! ```
//!
//! The integrity digest is SHA-1 over the UTF-16BE store password, the salt
//! "Mighty Aphrodite" and every preceding byte. Private keys are PKCS#8
//! wrapped by the Sun key protector: `salt(20) | key XOR keystream | check(20)`
//! where the keystream blocks are `SHA-1(password | previous block)` seeded
//! with the salt and the check is `SHA-1(password | plaintext key)`.

use std::time::{SystemTime, UNIX_EPOCH};

use der::asn1::{Null, OctetString};
use der::{Any, Decode, Encode, Sequence};
use openssl::pkey::{PKey, Private};
use rand::RngCore;
use sha1::{Digest, Sha1};
use spki::AlgorithmIdentifierOwned;

use super::KeyStore;
use crate::domain::constants::{
    JKS_CERT_TYPE_X509, JKS_INTEGRITY_SALT, JKS_KEY_PROTECTOR, JKS_MAGIC, JKS_TAG_PRIVATE_KEY,
    JKS_TAG_TRUSTED_CERT, JKS_VERSION_1, JKS_VERSION_2, SHA1_DIGEST_LEN,
};
use crate::domain::crypto::{CertChain, X509Cert};
use crate::domain::types::Password;
use crate::infra::error::KeyStoreError;

/// `EncryptedPrivateKeyInfo` as written by the Sun key protector.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct ProtectedKeyInfo {
    algorithm: AlgorithmIdentifierOwned,
    encrypted_data: OctetString,
}

#[derive(Clone)]
enum JksEntry {
    PrivateKey {
        alias: String,
        timestamp: u64,
        protected_key: Vec<u8>,
        chain: Vec<X509Cert>,
    },
    TrustedCert {
        alias: String,
        timestamp: u64,
        certificate: X509Cert,
    },
}

impl JksEntry {
    fn alias(&self) -> &str {
        match self {
            JksEntry::PrivateKey { alias, .. } | JksEntry::TrustedCert { alias, .. } => alias,
        }
    }
}

/// Decoded JKS keystore. Entries keep their file order.
#[derive(Clone)]
pub struct JavaKeyStore {
    version: u32,
    entries: Vec<JksEntry>,
}

impl JavaKeyStore {
    /// Decode and integrity-check a JKS keystore.
    pub fn decode(bytes: &[u8], store_password: &Password) -> Result<Self, KeyStoreError> {
        if bytes.len() < 12 + SHA1_DIGEST_LEN {
            return Err(malformed("keystore too short"));
        }

        let (body, stored_digest) = bytes.split_at(bytes.len() - SHA1_DIGEST_LEN);
        let mut cursor = Cursor::new(body);

        if cursor.read_u32()? != JKS_MAGIC {
            return Err(malformed("invalid keystore format"));
        }
        let version = cursor.read_u32()?;
        if version != JKS_VERSION_1 && version != JKS_VERSION_2 {
            return Err(malformed(format!("unsupported keystore version {version}")));
        }

        let computed = integrity_digest(store_password, body);
        if !openssl::memcmp::eq(&computed, stored_digest) {
            return Err(KeyStoreError::IntegrityCheckFailed);
        }

        let count = cursor.read_u32()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let tag = cursor.read_u32()?;
            let alias = cursor.read_utf()?;
            let timestamp = cursor.read_u64()?;

            match tag {
                JKS_TAG_PRIVATE_KEY => {
                    let key_len = cursor.read_u32()? as usize;
                    let protected_key = cursor.take(key_len)?.to_vec();
                    let chain_len = cursor.read_u32()?;
                    let mut chain = Vec::new();
                    for _ in 0..chain_len {
                        chain.push(read_certificate(&mut cursor, version)?);
                    }
                    entries.push(JksEntry::PrivateKey {
                        alias,
                        timestamp,
                        protected_key,
                        chain,
                    });
                }
                JKS_TAG_TRUSTED_CERT => {
                    let certificate = read_certificate(&mut cursor, version)?;
                    entries.push(JksEntry::TrustedCert {
                        alias,
                        timestamp,
                        certificate,
                    });
                }
                other => return Err(malformed(format!("unknown entry tag {other}"))),
            }
        }

        if !cursor.is_finished() {
            return Err(malformed("trailing data before integrity digest"));
        }

        log::debug!("Decoded JKS v{version} keystore with {} entries", entries.len());
        Ok(Self { version, entries })
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, alias: &str) -> Option<&JksEntry> {
        let wanted = alias.to_lowercase();
        self.entries
            .iter()
            .find(|entry| entry.alias().to_lowercase() == wanted)
    }
}

impl KeyStore for JavaKeyStore {
    fn aliases(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.alias().to_string())
            .collect()
    }

    fn contains_alias(&self, alias: &str) -> bool {
        self.entry(alias).is_some()
    }

    fn is_key_entry(&self, alias: &str) -> bool {
        matches!(self.entry(alias), Some(JksEntry::PrivateKey { .. }))
    }

    fn certificate(&self, alias: &str) -> Option<X509Cert> {
        match self.entry(alias)? {
            JksEntry::PrivateKey { chain, .. } => chain.first().cloned(),
            JksEntry::TrustedCert { certificate, .. } => Some(certificate.clone()),
        }
    }

    fn certificate_chain(&self, alias: &str) -> Option<CertChain> {
        match self.entry(alias)? {
            JksEntry::PrivateKey { chain, .. } => Some(CertChain::new(chain.clone())),
            JksEntry::TrustedCert { .. } => None,
        }
    }

    fn private_key(
        &self,
        alias: &str,
        key_password: &Password,
    ) -> Result<PKey<Private>, KeyStoreError> {
        let protected_key = match self.entry(alias) {
            Some(JksEntry::PrivateKey { protected_key, .. }) => protected_key,
            Some(JksEntry::TrustedCert { .. }) => {
                return Err(KeyStoreError::NotAKeyEntry(alias.to_string()))
            }
            None => return Err(KeyStoreError::AliasNotFound(alias.to_string())),
        };

        let info = ProtectedKeyInfo::from_der(protected_key)
            .map_err(|e| malformed(format!("protected key for '{alias}': {e}")))?;
        if info.algorithm.oid != JKS_KEY_PROTECTOR {
            return Err(KeyStoreError::UnsupportedKeyAlgorithm(format!(
                "key protection {}",
                info.algorithm.oid
            )));
        }

        let plain = recover_key(info.encrypted_data.as_bytes(), key_password)
            .ok_or_else(|| KeyStoreError::UnrecoverableKey(alias.to_string()))?;

        PKey::private_key_from_pkcs8(&plain)
            .map_err(|e| KeyStoreError::UnsupportedKeyAlgorithm(e.to_string()))
    }
}

/// Builds JKS keystores (version 2, as keytool writes them).
#[derive(Clone, Default)]
pub struct JksWriter {
    entries: Vec<JksEntry>,
}

impl JksWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a private key entry protected by `key_password`.
    ///
    /// `chain` must start with the certificate matching `key`.
    pub fn add_private_key(
        &mut self,
        alias: &str,
        key: &PKey<Private>,
        chain: &[X509Cert],
        key_password: &Password,
    ) -> Result<&mut Self, KeyStoreError> {
        if chain.is_empty() {
            return Err(KeyStoreError::Encoding(format!(
                "private key entry '{alias}' needs a certificate chain"
            )));
        }

        let pkcs8 = key
            .private_key_to_pkcs8()
            .map_err(|e| KeyStoreError::Encoding(e.to_string()))?;
        let protected_key = protect_key(&pkcs8, key_password)?;

        self.replace(JksEntry::PrivateKey {
            alias: alias.to_lowercase(),
            timestamp: now_millis(),
            protected_key,
            chain: chain.to_vec(),
        });
        Ok(self)
    }

    /// Add (or replace) a trusted certificate entry.
    pub fn add_trusted_certificate(&mut self, alias: &str, certificate: X509Cert) -> &mut Self {
        self.replace(JksEntry::TrustedCert {
            alias: alias.to_lowercase(),
            timestamp: now_millis(),
            certificate,
        });
        self
    }

    /// Serialize the keystore and seal it with `store_password`.
    pub fn encode(&self, store_password: &Password) -> Result<Vec<u8>, KeyStoreError> {
        let mut out = Vec::new();
        out.extend_from_slice(&JKS_MAGIC.to_be_bytes());
        out.extend_from_slice(&JKS_VERSION_2.to_be_bytes());
        out.extend_from_slice(&(self.entries.len() as u32).to_be_bytes());

        for entry in &self.entries {
            match entry {
                JksEntry::PrivateKey {
                    alias,
                    timestamp,
                    protected_key,
                    chain,
                } => {
                    out.extend_from_slice(&JKS_TAG_PRIVATE_KEY.to_be_bytes());
                    write_utf(&mut out, alias)?;
                    out.extend_from_slice(&timestamp.to_be_bytes());
                    out.extend_from_slice(&(protected_key.len() as u32).to_be_bytes());
                    out.extend_from_slice(protected_key);
                    out.extend_from_slice(&(chain.len() as u32).to_be_bytes());
                    for certificate in chain {
                        write_certificate(&mut out, certificate)?;
                    }
                }
                JksEntry::TrustedCert {
                    alias,
                    timestamp,
                    certificate,
                } => {
                    out.extend_from_slice(&JKS_TAG_TRUSTED_CERT.to_be_bytes());
                    write_utf(&mut out, alias)?;
                    out.extend_from_slice(&timestamp.to_be_bytes());
                    write_certificate(&mut out, certificate)?;
                }
            }
        }

        let digest = integrity_digest(store_password, &out);
        out.extend_from_slice(&digest);
        Ok(out)
    }

    fn replace(&mut self, entry: JksEntry) {
        self.entries
            .retain(|existing| existing.alias() != entry.alias());
        self.entries.push(entry);
    }
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], KeyStoreError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| malformed("unexpected end of keystore"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, KeyStoreError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, KeyStoreError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, KeyStoreError> {
        let bytes = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(buf))
    }

    /// Length-prefixed string as written by `DataOutput.writeUTF`.
    fn read_utf(&mut self) -> Result<String, KeyStoreError> {
        let len = self.read_u16()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| malformed("alias is not valid UTF-8"))
    }

    fn is_finished(&self) -> bool {
        self.pos == self.data.len()
    }
}

fn read_certificate(cursor: &mut Cursor<'_>, version: u32) -> Result<X509Cert, KeyStoreError> {
    if version == JKS_VERSION_2 {
        let cert_type = cursor.read_utf()?;
        if cert_type != JKS_CERT_TYPE_X509 {
            return Err(malformed(format!("unsupported certificate type {cert_type}")));
        }
    }
    let len = cursor.read_u32()? as usize;
    let der = cursor.take(len)?;
    X509Cert::from_der(der.to_vec()).map_err(|e| KeyStoreError::Certificate(e.to_string()))
}

fn write_utf(out: &mut Vec<u8>, value: &str) -> Result<(), KeyStoreError> {
    let bytes = value.as_bytes();
    let len = u16::try_from(bytes.len())
        .map_err(|_| KeyStoreError::Encoding(format!("string too long: {} bytes", bytes.len())))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

fn write_certificate(out: &mut Vec<u8>, certificate: &X509Cert) -> Result<(), KeyStoreError> {
    write_utf(out, JKS_CERT_TYPE_X509)?;
    out.extend_from_slice(&(certificate.as_der().len() as u32).to_be_bytes());
    out.extend_from_slice(certificate.as_der());
    Ok(())
}

fn integrity_digest(password: &Password, body: &[u8]) -> Vec<u8> {
    let mut hasher = Sha1::new();
    hasher.update(password.utf16_be_bytes());
    hasher.update(JKS_INTEGRITY_SALT);
    hasher.update(body);
    hasher.finalize().to_vec()
}

fn keystream_xor(password: &[u8], salt: &[u8], input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut block = salt.to_vec();
    for chunk in input.chunks(SHA1_DIGEST_LEN) {
        let mut hasher = Sha1::new();
        hasher.update(password);
        hasher.update(&block);
        block = hasher.finalize().to_vec();
        output.extend(chunk.iter().zip(block.iter()).map(|(a, b)| a ^ b));
    }
    output
}

fn check_digest(password: &[u8], plain: &[u8]) -> Vec<u8> {
    let mut hasher = Sha1::new();
    hasher.update(password);
    hasher.update(plain);
    hasher.finalize().to_vec()
}

/// Undo the Sun key protector; `None` when the check digest does not match.
fn recover_key(protected: &[u8], password: &Password) -> Option<Vec<u8>> {
    if protected.len() < 2 * SHA1_DIGEST_LEN {
        return None;
    }
    let password = password.utf16_be_bytes();
    let (salt, rest) = protected.split_at(SHA1_DIGEST_LEN);
    let (encrypted, check) = rest.split_at(rest.len() - SHA1_DIGEST_LEN);

    let plain = keystream_xor(&password, salt, encrypted);
    if openssl::memcmp::eq(&check_digest(&password, &plain), check) {
        Some(plain)
    } else {
        None
    }
}

fn protect_key(pkcs8: &[u8], password: &Password) -> Result<Vec<u8>, KeyStoreError> {
    let password = password.utf16_be_bytes();
    let mut salt = [0u8; SHA1_DIGEST_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut encrypted = Vec::with_capacity(pkcs8.len() + 2 * SHA1_DIGEST_LEN);
    encrypted.extend_from_slice(&salt);
    encrypted.extend(keystream_xor(&password, &salt, pkcs8));
    encrypted.extend(check_digest(&password, pkcs8));

    let encode_error = |e: der::Error| KeyStoreError::Encoding(e.to_string());
    let info = ProtectedKeyInfo {
        algorithm: AlgorithmIdentifierOwned {
            oid: JKS_KEY_PROTECTOR,
            parameters: Some(Any::encode_from(&Null).map_err(encode_error)?),
        },
        encrypted_data: OctetString::new(encrypted).map_err(encode_error)?,
    };
    info.to_der().map_err(encode_error)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

fn malformed(detail: impl Into<String>) -> KeyStoreError {
    KeyStoreError::Malformed(detail.into())
}
