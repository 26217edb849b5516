//! Detached CMS signer.
//!
//! Produces DER `ContentInfo(SignedData)` blobs: version 1, no encapsulated
//! content, the leaf certificate embedded and a single `SignerInfo`
//! identified by issuer and serial number.

use std::time::SystemTime;

use cms::cert::{CertificateChoices, IssuerAndSerialNumber};
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{
    CertificateSet, DigestAlgorithmIdentifiers, EncapsulatedContentInfo, SignatureValue,
    SignedData, SignerIdentifier, SignerInfo, SignerInfos,
};
use der::asn1::{Null, SetOfVec};
use der::{Any, Encode};
use spki::AlgorithmIdentifierOwned;

use crate::domain::constants;
use crate::domain::crypto::{CertChain, SignatureBlob, X509Cert};
use crate::domain::material::KeyMaterial;
use crate::infra::error::SigningError;
use crate::services::provider::{AlgorithmRegistry, SignatureScheme};
use crate::services::signed_attributes::SignedAttributesBuilder;

/// Signs content with one loaded identity.
///
/// Holds only immutable state. Each [`sign`](CmsSigner::sign) call builds its
/// own OpenSSL signing context, so a `CmsSigner` can be shared across threads.
///
/// Owns the signing identity's private key for its whole lifetime; the key
/// stays in memory until the signer is dropped, without secure erasure.
#[derive(Debug)]
pub struct CmsSigner {
    material: KeyMaterial,
    scheme: SignatureScheme,
}

impl CmsSigner {
    /// Bind key material to the signature scheme the registry assigns to its
    /// key algorithm.
    pub fn new(material: KeyMaterial, registry: &AlgorithmRegistry) -> Result<Self, SigningError> {
        let scheme = registry.signing_scheme(material.key_algorithm())?;
        log::debug!(
            "Signer for '{}' uses {}",
            material.alias(),
            scheme.name()
        );
        Ok(Self { material, scheme })
    }

    /// Produce a detached signature over `content`.
    pub fn sign(&self, content: &[u8]) -> Result<SignatureBlob, SigningError> {
        self.sign_at(content, SystemTime::now())
    }

    /// Like [`sign`](CmsSigner::sign) with an explicit signingTime attribute.
    pub fn sign_at(
        &self,
        content: &[u8],
        signing_time: SystemTime,
    ) -> Result<SignatureBlob, SigningError> {
        let certificate = self.material.certificate();
        let digest = self.scheme.digest.digest(content);

        let signed_attrs = SignedAttributesBuilder::new(&digest, certificate)
            .signing_time(signing_time)
            .build()?;
        let signature = self.raw_signature(&signed_attrs.to_der()?)?;

        let digest_algorithm = AlgorithmIdentifierOwned {
            oid: self.scheme.digest.oid(),
            parameters: None,
        };
        let signature_algorithm = AlgorithmIdentifierOwned {
            oid: self.scheme.oid,
            parameters: if self.scheme.null_parameters {
                Some(Any::encode_from(&Null)?)
            } else {
                None
            },
        };

        let tbs = &certificate.certificate().tbs_certificate;
        let signer_info = SignerInfo {
            version: CmsVersion::V1,
            sid: SignerIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
                issuer: tbs.issuer.clone(),
                serial_number: tbs.serial_number.clone(),
            }),
            digest_alg: digest_algorithm.clone(),
            signed_attrs: Some(signed_attrs),
            signature_algorithm,
            signature: SignatureValue::new(signature)?,
            unsigned_attrs: None,
        };

        let signed_data = SignedData {
            version: CmsVersion::V1,
            digest_algorithms: DigestAlgorithmIdentifiers::try_from(vec![digest_algorithm])?,
            encap_content_info: EncapsulatedContentInfo {
                econtent_type: constants::ID_DATA,
                econtent: None,
            },
            certificates: Some(CertificateSet(SetOfVec::try_from(vec![
                CertificateChoices::Certificate(certificate.certificate().clone()),
            ])?)),
            crls: None,
            signer_infos: SignerInfos(SetOfVec::try_from(vec![signer_info])?),
        };

        let content_info = ContentInfo {
            content_type: constants::ID_SIGNED_DATA,
            content: Any::encode_from(&signed_data)?,
        };

        let blob = SignatureBlob::from_der(content_info.to_der()?);
        log::info!(
            "Signed {} bytes with {} ({} byte signature)",
            content.len(),
            self.scheme.name(),
            blob.len()
        );
        log::debug!("Signature: {}", blob.to_base64());
        Ok(blob)
    }

    fn raw_signature(&self, data: &[u8]) -> Result<Vec<u8>, SigningError> {
        let mut signer = openssl::sign::Signer::new(
            self.scheme.digest.message_digest(),
            self.material.key_pair().private_key(),
        )?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    }

    #[must_use]
    pub fn certificate(&self) -> &X509Cert {
        self.material.certificate()
    }

    #[must_use]
    pub fn certificate_chain(&self) -> &CertChain {
        self.material.certificate_chain()
    }

    #[must_use]
    pub fn key_material(&self) -> &KeyMaterial {
        &self.material
    }

    /// Signature scheme this signer produces.
    #[must_use]
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_signer_is_shareable() {
        assert_send_sync::<CmsSigner>();
    }
}
