//! Service layer module root.
//! Contains the algorithm registry, key loading, CMS signing and verification.

pub mod container;
pub mod loader;
pub mod provider;
pub mod signed_attributes;
pub mod signer;
pub mod verifier;

pub use container::{ContainerReader, DrainSummary, ValidationDrain};
pub use loader::KeyMaterialLoader;
pub use provider::{AlgorithmRegistry, SignatureScheme};
pub use signed_attributes::{SignedAttributeValues, SignedAttributesBuilder};
pub use signer::CmsSigner;
pub use verifier::CmsVerifier;
