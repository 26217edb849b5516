//! Explicit algorithm registry.
//!
//! Signer and verifier resolve every algorithm through an `AlgorithmRegistry`
//! handed to them at construction. The registry is built once by
//! [`AlgorithmRegistry::initialize`], which also performs the OpenSSL library
//! initialisation; nothing is registered as a hidden global side effect.

use der::asn1::ObjectIdentifier;

use crate::domain::constants;
use crate::domain::crypto::{DigestAlgorithm, KeyAlgorithm};
use crate::infra::error::SigningError;

/// One concrete signature algorithm: key family plus digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureScheme {
    pub key: KeyAlgorithm,
    pub digest: DigestAlgorithm,
    pub oid: ObjectIdentifier,
    /// RSA identifiers carry explicit NULL parameters; DSA and ECDSA omit them.
    pub null_parameters: bool,
}

impl SignatureScheme {
    const fn new(
        key: KeyAlgorithm,
        digest: DigestAlgorithm,
        oid: ObjectIdentifier,
        null_parameters: bool,
    ) -> Self {
        Self {
            key,
            digest,
            oid,
            null_parameters,
        }
    }

    /// Algorithm name in the "SHA1withRSA" form.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}with{}", self.digest.jca_name(), self.key.name())
    }
}

const STANDARD_SCHEMES: &[SignatureScheme] = &[
    SignatureScheme::new(KeyAlgorithm::Rsa, DigestAlgorithm::Sha1, constants::SHA1_WITH_RSA, true),
    SignatureScheme::new(KeyAlgorithm::Rsa, DigestAlgorithm::Sha256, constants::SHA256_WITH_RSA, true),
    SignatureScheme::new(KeyAlgorithm::Rsa, DigestAlgorithm::Sha384, constants::SHA384_WITH_RSA, true),
    SignatureScheme::new(KeyAlgorithm::Rsa, DigestAlgorithm::Sha512, constants::SHA512_WITH_RSA, true),
    SignatureScheme::new(KeyAlgorithm::Dsa, DigestAlgorithm::Sha1, constants::DSA_WITH_SHA1, false),
    SignatureScheme::new(KeyAlgorithm::Dsa, DigestAlgorithm::Sha256, constants::DSA_WITH_SHA256, false),
    SignatureScheme::new(KeyAlgorithm::Ec, DigestAlgorithm::Sha1, constants::ECDSA_WITH_SHA1, false),
    SignatureScheme::new(KeyAlgorithm::Ec, DigestAlgorithm::Sha256, constants::ECDSA_WITH_SHA256, false),
    SignatureScheme::new(KeyAlgorithm::Ec, DigestAlgorithm::Sha384, constants::ECDSA_WITH_SHA384, false),
    SignatureScheme::new(KeyAlgorithm::Ec, DigestAlgorithm::Sha512, constants::ECDSA_WITH_SHA512, false),
];

/// Key-only identifiers some producers put in `signatureAlgorithm`; the digest
/// then comes from the `SignerInfo` digest algorithm.
const KEY_ONLY_IDENTIFIERS: &[(ObjectIdentifier, KeyAlgorithm)] = &[
    (constants::RSA_ENCRYPTION, KeyAlgorithm::Rsa),
    (constants::ID_DSA, KeyAlgorithm::Dsa),
    (constants::ID_EC_PUBLIC_KEY, KeyAlgorithm::Ec),
];

/// Mapping between key families, digests and their object identifiers.
#[derive(Debug, Clone)]
pub struct AlgorithmRegistry {
    schemes: Vec<SignatureScheme>,
    digests: Vec<DigestAlgorithm>,
    signing_digest: DigestAlgorithm,
}

impl AlgorithmRegistry {
    /// Initialise the crypto backend and build the standard registry.
    ///
    /// Call once at start-up and share the result (it is cheap to clone).
    #[must_use]
    pub fn initialize() -> Self {
        openssl::init();
        let registry = Self {
            schemes: STANDARD_SCHEMES.to_vec(),
            digests: vec![
                DigestAlgorithm::Sha1,
                DigestAlgorithm::Sha256,
                DigestAlgorithm::Sha384,
                DigestAlgorithm::Sha512,
            ],
            signing_digest: DigestAlgorithm::Sha1,
        };
        log::debug!(
            "Algorithm registry initialised: {} signature schemes, signing digest {}",
            registry.schemes.len(),
            registry.signing_digest
        );
        registry
    }

    /// Use `digest` instead of SHA-1 for new signatures.
    #[must_use]
    pub fn with_signing_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.signing_digest = digest;
        self
    }

    #[must_use]
    pub fn signing_digest(&self) -> DigestAlgorithm {
        self.signing_digest
    }

    #[must_use]
    pub fn scheme(&self, key: KeyAlgorithm, digest: DigestAlgorithm) -> Option<SignatureScheme> {
        self.schemes
            .iter()
            .find(|scheme| scheme.key == key && scheme.digest == digest)
            .copied()
    }

    /// Scheme used to sign with a key of the given family.
    pub fn signing_scheme(&self, key: KeyAlgorithm) -> Result<SignatureScheme, SigningError> {
        self.scheme(key, self.signing_digest).ok_or_else(|| {
            SigningError::UnsupportedAlgorithm(format!("{}with{}", self.signing_digest.jca_name(), key))
        })
    }

    /// Digest algorithm for an identifier, if registered.
    #[must_use]
    pub fn digest(&self, oid: &ObjectIdentifier) -> Option<DigestAlgorithm> {
        DigestAlgorithm::from_oid(oid).filter(|digest| self.digests.contains(digest))
    }

    /// Resolve a `signatureAlgorithm` identifier in the context of the
    /// signer's digest algorithm.
    ///
    /// A combined identifier must agree with `digest`; a key-only identifier
    /// borrows it.
    #[must_use]
    pub fn resolve_signature(
        &self,
        oid: &ObjectIdentifier,
        digest: DigestAlgorithm,
    ) -> Option<SignatureScheme> {
        if let Some(scheme) = self.schemes.iter().find(|scheme| scheme.oid == *oid) {
            return (scheme.digest == digest).then_some(*scheme);
        }

        KEY_ONLY_IDENTIFIERS
            .iter()
            .find(|(key_oid, _)| key_oid == oid)
            .and_then(|(_, key)| self.scheme(*key, digest))
    }
}
