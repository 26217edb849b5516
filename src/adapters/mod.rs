//! Adapter layer modules for external formats.
//!
//! Provides keystore decoders for Java KeyStore (JKS) and PKCS#12 files
//! behind a common `KeyStore` trait.

pub mod keystore;
