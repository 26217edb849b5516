//! Digest algorithm domain type.
//!
//! Provides the `DigestAlgorithm` enumeration covering SHA-1 (the signing
//! default) and the SHA-2 family accepted from interoperable producers.
//! Includes OID mapping, size validation and OpenSSL integration.

use std::fmt;
use std::str::FromStr;

use der::asn1::ObjectIdentifier;
use openssl::hash::MessageDigest;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::DigestBytes;
use crate::domain::constants;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha384 => "sha384",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Name used when composing signature algorithm names ("SHA1withRSA").
    #[must_use]
    pub fn jca_name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    #[must_use]
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            DigestAlgorithm::Sha1 => constants::ID_SHA1,
            DigestAlgorithm::Sha256 => constants::ID_SHA256,
            DigestAlgorithm::Sha384 => constants::ID_SHA384,
            DigestAlgorithm::Sha512 => constants::ID_SHA512,
        }
    }

    #[must_use]
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ]
        .into_iter()
        .find(|alg| alg.oid() == *oid)
    }

    /// OpenSSL digest used for signature creation and verification.
    #[must_use]
    pub fn message_digest(&self) -> MessageDigest {
        match self {
            DigestAlgorithm::Sha1 => MessageDigest::sha1(),
            DigestAlgorithm::Sha256 => MessageDigest::sha256(),
            DigestAlgorithm::Sha384 => MessageDigest::sha384(),
            DigestAlgorithm::Sha512 => MessageDigest::sha512(),
        }
    }

    /// Digest `data` with this algorithm.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> DigestBytes {
        let bytes = match self {
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        };
        DigestBytes::from_computed(*self, bytes)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha384" => Ok(DigestAlgorithm::Sha384),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            other => Err(format!("unknown digest algorithm: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_algorithm_properties() {
        assert_eq!(DigestAlgorithm::Sha1.as_str(), "sha1");
        assert_eq!(DigestAlgorithm::Sha1.digest_size(), 20);
        assert_eq!(DigestAlgorithm::Sha256.digest_size(), 32);
        assert_eq!(DigestAlgorithm::Sha384.digest_size(), 48);
        assert_eq!(DigestAlgorithm::Sha512.digest_size(), 64);
    }

    #[test]
    fn test_oid_mapping_is_bijective() {
        for alg in [
            DigestAlgorithm::Sha1,
            DigestAlgorithm::Sha256,
            DigestAlgorithm::Sha384,
            DigestAlgorithm::Sha512,
        ] {
            assert_eq!(DigestAlgorithm::from_oid(&alg.oid()), Some(alg));
        }
        assert_eq!(DigestAlgorithm::from_oid(&constants::ID_DATA), None);
    }

    #[test]
    fn test_known_sha1_vector() {
        let digest = DigestAlgorithm::Sha1.digest(b"abc");
        assert_eq!(
            hex::encode(digest.as_slice()),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("SHA-1".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha1));
        assert_eq!("sha256".parse::<DigestAlgorithm>(), Ok(DigestAlgorithm::Sha256));
        assert!("md5".parse::<DigestAlgorithm>().is_err());
    }
}
