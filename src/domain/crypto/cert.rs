use std::fmt;

use der::{Decode, Encode};
use openssl::pkey::{PKey, Public};
use openssl::x509::X509;
use x509_cert::ext::pkix::SubjectKeyIdentifier;
use x509_cert::Certificate;

use super::{DigestAlgorithm, DigestBytes};
use crate::domain::constants;

/// X.509 certificate kept both as its exact DER bytes and in parsed form.
#[derive(Clone)]
pub struct X509Cert {
    der: Box<[u8]>,
    parsed: Certificate,
}

/// Ordered certificate chain, leaf first, exactly as the keystore returned it.
///
/// No re-ordering, completion or validation is performed.
#[derive(Clone, Default)]
pub struct CertChain {
    certificates: Vec<X509Cert>,
}

impl X509Cert {
    pub fn from_der(der: Vec<u8>) -> Result<Self, der::Error> {
        let parsed = Certificate::from_der(&der)?;
        Ok(Self {
            der: der.into_boxed_slice(),
            parsed,
        })
    }

    pub fn from_certificate(parsed: Certificate) -> Result<Self, der::Error> {
        let der = parsed.to_der()?;
        Ok(Self {
            der: der.into_boxed_slice(),
            parsed,
        })
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    #[must_use]
    pub fn certificate(&self) -> &Certificate {
        &self.parsed
    }

    #[must_use]
    pub fn subject(&self) -> String {
        self.parsed.tbs_certificate.subject.to_string()
    }

    #[must_use]
    pub fn issuer(&self) -> String {
        self.parsed.tbs_certificate.issuer.to_string()
    }

    #[must_use]
    pub fn serial_hex(&self) -> String {
        hex::encode(self.parsed.tbs_certificate.serial_number.as_bytes())
    }

    /// SHA-1 over the DER encoding, as used by the ESS signing-certificate attribute.
    #[must_use]
    pub fn sha1_fingerprint(&self) -> DigestBytes {
        DigestAlgorithm::Sha1.digest(&self.der)
    }

    /// Public key of the certificate as an OpenSSL key.
    pub fn public_key(&self) -> Result<PKey<Public>, openssl::error::ErrorStack> {
        X509::from_der(&self.der)?.public_key()
    }

    /// Value of the subjectKeyIdentifier extension, if present and well formed.
    #[must_use]
    pub fn subject_key_identifier(&self) -> Option<SubjectKeyIdentifier> {
        self.parsed
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == constants::ID_CE_SUBJECT_KEY_IDENTIFIER)
            .and_then(|ext| SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes()).ok())
    }
}

impl PartialEq for X509Cert {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for X509Cert {}

impl CertChain {
    #[must_use]
    pub fn new(certificates: Vec<X509Cert>) -> Self {
        Self { certificates }
    }
    #[must_use]
    pub fn leaf(&self) -> Option<&X509Cert> {
        self.certificates.first()
    }
    #[must_use]
    pub fn certificates(&self) -> &[X509Cert] {
        &self.certificates
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &X509Cert> {
        self.certificates.iter()
    }
}

impl fmt::Debug for X509Cert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X509Cert(subject={}, serial={}, len={})",
            self.subject(),
            self.serial_hex(),
            self.der.len()
        )
    }
}
impl fmt::Debug for CertChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertChain(len={})", self.certificates.len())
    }
}
