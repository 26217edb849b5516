//! Error types for keystore, signing and verification operations.
//!
//! One error kind per phase (`KeyStoreError`, `SigningError`,
//! `VerificationError`) plus an umbrella `AsicError` for callers that drive
//! whole workflows.

use thiserror::Error;

/// Result type for workflow level operations
pub type AsicResult<T> = Result<T, AsicError>;

/// Failure while opening a keystore or extracting key material from it.
#[derive(Error, Debug, miette::Diagnostic)]
pub enum KeyStoreError {
    #[error("Unable to load keystore: {0}")]
    Malformed(String),

    #[error("Keystore integrity check failed (wrong store password?)")]
    IntegrityCheckFailed,

    #[error("Keystore contains no entries")]
    Empty,

    #[error("Alias not found in keystore: {0}")]
    AliasNotFound(String),

    #[error("Keystore entry '{0}' does not hold a private key")]
    NotAKeyEntry(String),

    #[error("Unable to get the private key for alias '{0}' (wrong key password?)")]
    UnrecoverableKey(String),

    #[error("Unsupported key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("Certificate error: {0}")]
    Certificate(String),

    #[error("Private key for alias '{0}' does not match its certificate")]
    KeyMismatch(String),

    #[error("Unable to encode keystore: {0}")]
    Encoding(String),

    #[error("Keystore IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while producing a signature.
///
/// Signing is deterministic in its failure modes: retrying with the same key
/// material and content fails the same way.
#[derive(Error, Debug, miette::Diagnostic)]
pub enum SigningError {
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Cryptographic error: {0}")]
    Cryptographic(String),

    #[error("ASN.1 encoding error: {0}")]
    Encoding(String),
}

impl From<der::Error> for SigningError {
    fn from(error: der::Error) -> Self {
        SigningError::Encoding(error.to_string())
    }
}

impl From<openssl::error::ErrorStack> for SigningError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        SigningError::Cryptographic(error.to_string())
    }
}

/// Structured reason behind a [`VerificationError`].
///
/// Intended for audit logs. The error's `Display` does not expose it, so
/// rejections look identical to an untrusted caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    /// The blob is not a well-formed detached CMS `SignedData`.
    #[error("malformed signature: {0}")]
    Malformed(String),

    /// The blob carries no `SignerInfo`.
    #[error("no signer information present")]
    NoSigners,

    /// No embedded certificate matches the signer identifier.
    #[error("no embedded certificate matches the signer")]
    CertificateNotFound,

    /// Digest or signature algorithm not known to the registry.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// A mandatory signed attribute is missing or malformed.
    #[error("invalid signed attributes: {0}")]
    InvalidAttributes(String),

    /// The recomputed content digest differs from the signed one.
    #[error("content digest mismatch")]
    DigestMismatch,

    /// The signing-certificate attribute does not match the embedded certificate.
    #[error("signing certificate attribute mismatch")]
    CertificateMismatch,

    /// The signature value does not validate under the certificate's key.
    #[error("signature value invalid")]
    SignatureInvalid,
}

/// The signature did not validate against the supplied content.
#[derive(Error, Debug, miette::Diagnostic)]
#[error("Unable to verify signature")]
pub struct VerificationError {
    cause: VerificationFailure,
}

impl VerificationError {
    #[must_use]
    pub fn new(cause: VerificationFailure) -> Self {
        Self { cause }
    }

    /// Audit-level reason for the rejection.
    #[must_use]
    pub fn cause(&self) -> &VerificationFailure {
        &self.cause
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::new(VerificationFailure::Malformed(detail.into()))
    }
}

/// Umbrella error for workflows spanning several phases
#[derive(Error, Debug, miette::Diagnostic)]
pub enum AsicError {
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Container error: {0}")]
    Container(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
