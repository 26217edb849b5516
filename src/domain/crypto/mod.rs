//! Foundational cryptographic domain types.
//!
//! Provides strongly-typed wrappers for cryptographic artifacts including:
//! - Digest algorithms and digest values with size validation
//! - Key families and the signing key pair
//! - Certificate representations and chain structures
//! - Detached CMS signature blobs

mod cert;
mod digest_bytes;
mod hash;
mod key;
mod signature;

pub use cert::{CertChain, X509Cert};
pub use digest_bytes::{DigestBytes, DigestBytesError};
pub use hash::DigestAlgorithm;
pub use key::{KeyAlgorithm, KeyPair};
pub use signature::SignatureBlob;
