//! ASiC Signer Library
//!
//! Detached CMS (PKCS#7) signatures for signed containers: key material
//! extraction from JKS and PKCS#12 keystores, signature generation and
//! signature verification.
//!
//! ```no_run
//! use asic_signer::{AlgorithmRegistry, CmsSigner, CmsVerifier, KeyMaterialLoader, Password};
//!
//! # fn main() -> asic_signer::AsicResult<()> {
//! let registry = AlgorithmRegistry::initialize();
//! let material = KeyMaterialLoader::new().load_file(
//!     "signer.jks",
//!     &Password::from("changeit"),
//!     Some("signer"),
//!     &Password::from("keypass"),
//! )?;
//!
//! let signer = CmsSigner::new(material, &registry)?;
//! let signature = signer.sign(b"hello-asic")?;
//!
//! CmsVerifier::new(registry).verify(b"hello-asic", &signature)?;
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

pub use adapters::keystore::{KeyStore, KeyStoreFormat};
pub use domain::crypto::{CertChain, DigestAlgorithm, KeyAlgorithm, SignatureBlob, X509Cert};
pub use domain::material::KeyMaterial;
pub use domain::types::{KeyAlias, Password};
pub use domain::verification::{SignerOutcome, VerificationPolicy, VerificationReport};
pub use infra::config::{ConfigManager, ExportFormat, SignerConfiguration};
pub use infra::error::{
    AsicError, AsicResult, KeyStoreError, SigningError, VerificationError, VerificationFailure,
};
pub use services::{
    AlgorithmRegistry, CmsSigner, CmsVerifier, ContainerReader, DrainSummary, KeyMaterialLoader,
    ValidationDrain,
};
