//! Asymmetric key types.

use std::fmt;

use openssl::pkey::{Id, PKey, Private, Public};

/// Asymmetric key family of a signing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Rsa,
    Dsa,
    Ec,
}

impl KeyAlgorithm {
    /// Map an OpenSSL key id onto a supported key family.
    #[must_use]
    pub fn from_id(id: Id) -> Option<Self> {
        match id {
            Id::RSA => Some(KeyAlgorithm::Rsa),
            Id::DSA => Some(KeyAlgorithm::Dsa),
            Id::EC => Some(KeyAlgorithm::Ec),
            _ => None,
        }
    }

    /// Algorithm name as reported by key objects ("RSA", "DSA", "EC").
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Dsa => "DSA",
            KeyAlgorithm::Ec => "EC",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Private key paired with the public key of the leaf certificate.
///
/// The private key stays in memory for the lifetime of this value and is not
/// erased on drop.
#[derive(Clone)]
pub struct KeyPair {
    public: PKey<Public>,
    private: PKey<Private>,
    algorithm: KeyAlgorithm,
}

impl KeyPair {
    pub(crate) fn new(public: PKey<Public>, private: PKey<Private>, algorithm: KeyAlgorithm) -> Self {
        Self {
            public,
            private,
            algorithm,
        }
    }

    #[must_use]
    pub fn public_key(&self) -> &PKey<Public> {
        &self.public
    }

    #[must_use]
    pub fn private_key(&self) -> &PKey<Private> {
        &self.private
    }

    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyPair(algorithm={}, bits={})",
            self.algorithm,
            self.public.bits()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_algorithm_from_id() {
        assert_eq!(KeyAlgorithm::from_id(Id::RSA), Some(KeyAlgorithm::Rsa));
        assert_eq!(KeyAlgorithm::from_id(Id::DSA), Some(KeyAlgorithm::Dsa));
        assert_eq!(KeyAlgorithm::from_id(Id::EC), Some(KeyAlgorithm::Ec));
        assert_eq!(KeyAlgorithm::from_id(Id::ED25519), None);
    }

    #[test]
    fn test_key_algorithm_names() {
        assert_eq!(KeyAlgorithm::Rsa.to_string(), "RSA");
        assert_eq!(KeyAlgorithm::Ec.name(), "EC");
    }
}
