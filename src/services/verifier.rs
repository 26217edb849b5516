//! Detached CMS signature verification.
//!
//! Checks a `ContentInfo(SignedData)` blob against externally supplied
//! content. Each `SignerInfo` is validated on its own and the outcomes are
//! combined under a [`VerificationPolicy`]. Certificates are only used as
//! carriers of the signer's public key; no chain or trust decisions are made.

use cms::cert::CertificateChoices;
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{SignedData, SignerIdentifier, SignerInfo};
use der::asn1::Null;
use der::{Decode, Encode};
use spki::AlgorithmIdentifierOwned;

use crate::domain::constants;
use crate::domain::crypto::{KeyAlgorithm, SignatureBlob, X509Cert};
use crate::domain::verification::{SignerOutcome, VerificationPolicy, VerificationReport};
use crate::infra::error::{VerificationError, VerificationFailure};
use crate::services::provider::{AlgorithmRegistry, SignatureScheme};
use crate::services::signed_attributes::SignedAttributeValues;

/// Verifies detached CMS signatures.
#[derive(Debug, Clone)]
pub struct CmsVerifier {
    registry: AlgorithmRegistry,
    policy: VerificationPolicy,
}

impl CmsVerifier {
    #[must_use]
    pub fn new(registry: AlgorithmRegistry) -> Self {
        Self {
            registry,
            policy: VerificationPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: VerificationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> VerificationPolicy {
        self.policy
    }

    /// Verify `signature` over `content`.
    ///
    /// All failures surface as the same [`VerificationError`]; the specific
    /// reason is logged at warn level and kept in [`VerificationError::cause`].
    pub fn verify(&self, content: &[u8], signature: &SignatureBlob) -> Result<(), VerificationError> {
        let result = self
            .verify_report(content, signature)
            .and_then(|report| report.evaluate(self.policy));

        match result {
            Ok(()) => {
                log::info!("Signature verified ({} policy)", self.policy);
                Ok(())
            }
            Err(cause) => {
                log::warn!("Signature verification failed: {cause}");
                Err(VerificationError::new(cause))
            }
        }
    }

    /// Per-signer outcomes without applying the policy.
    ///
    /// Fails outright only when the blob itself cannot be interpreted as a
    /// detached `SignedData`.
    pub fn verify_report(
        &self,
        content: &[u8],
        signature: &SignatureBlob,
    ) -> Result<VerificationReport, VerificationFailure> {
        let signed_data = parse_signed_data(signature.as_bytes())?;
        let certificates = embedded_certificates(&signed_data)?;

        let signer_infos: Vec<&SignerInfo> = signed_data.signer_infos.0.iter().collect();
        if signer_infos.is_empty() {
            return Err(VerificationFailure::NoSigners);
        }
        check_signed_data_version(&signed_data, &signer_infos)?;
        log::debug!(
            "SignedData carries {} signer(s) and {} certificate(s)",
            signer_infos.len(),
            certificates.len()
        );

        let signers = signer_infos
            .iter()
            .enumerate()
            .map(|(index, signer_info)| {
                let certificate = find_certificate(&certificates, &signer_info.sid);
                let result = match certificate {
                    Some(certificate) => {
                        self.verify_signer(content, &signed_data, signer_info, certificate)
                    }
                    None => Err(VerificationFailure::CertificateNotFound),
                };
                if let Err(cause) = &result {
                    log::debug!("Signer {index} rejected: {cause}");
                }
                SignerOutcome {
                    index,
                    subject: certificate.map(X509Cert::subject),
                    result,
                }
            })
            .collect();

        Ok(VerificationReport::new(signers))
    }

    /// Certificates embedded in a signature blob, in stored order.
    pub fn signer_certificates(
        &self,
        signature: &SignatureBlob,
    ) -> Result<Vec<X509Cert>, VerificationError> {
        let signed_data =
            parse_signed_data(signature.as_bytes()).map_err(VerificationError::new)?;
        embedded_certificates(&signed_data).map_err(VerificationError::new)
    }

    fn verify_signer(
        &self,
        content: &[u8],
        signed_data: &SignedData,
        signer_info: &SignerInfo,
        certificate: &X509Cert,
    ) -> Result<(), VerificationFailure> {
        let expected_version = match signer_info.sid {
            SignerIdentifier::IssuerAndSerialNumber(_) => CmsVersion::V1,
            SignerIdentifier::SubjectKeyIdentifier(_) => CmsVersion::V3,
        };
        if signer_info.version != expected_version {
            return Err(malformed("SignerInfo version does not match its identifier"));
        }

        check_parameters(&signer_info.digest_alg)?;
        check_parameters(&signer_info.signature_algorithm)?;

        let digest = self.registry.digest(&signer_info.digest_alg.oid).ok_or_else(|| {
            VerificationFailure::UnsupportedAlgorithm(signer_info.digest_alg.oid.to_string())
        })?;
        if !signed_data
            .digest_algorithms
            .iter()
            .any(|alg| alg.oid == signer_info.digest_alg.oid)
        {
            return Err(malformed("signer digest algorithm not listed in SignedData"));
        }

        let scheme = self
            .registry
            .resolve_signature(&signer_info.signature_algorithm.oid, digest)
            .ok_or_else(|| {
                VerificationFailure::UnsupportedAlgorithm(
                    signer_info.signature_algorithm.oid.to_string(),
                )
            })?;

        let computed = digest.digest(content);
        let signed_bytes = match &signer_info.signed_attrs {
            Some(signed_attrs) => {
                let values = SignedAttributeValues::parse(signed_attrs)?;
                if values.content_type != signed_data.encap_content_info.econtent_type {
                    return Err(VerificationFailure::InvalidAttributes(
                        "contentType does not match encapsulated content type".to_string(),
                    ));
                }
                if !computed.matches(&values.message_digest) {
                    return Err(VerificationFailure::DigestMismatch);
                }
                if let Some(hash) = &values.signing_certificate_hash {
                    if !certificate.sha1_fingerprint().matches(hash) {
                        return Err(VerificationFailure::CertificateMismatch);
                    }
                }
                signed_attrs
                    .to_der()
                    .map_err(|e| malformed(format!("signed attributes: {e}")))?
            }
            None => content.to_vec(),
        };

        verify_raw_signature(
            scheme,
            certificate,
            &signed_bytes,
            signer_info.signature.as_bytes(),
        )
    }
}

fn parse_signed_data(bytes: &[u8]) -> Result<SignedData, VerificationFailure> {
    let content_info =
        ContentInfo::from_der(bytes).map_err(|e| malformed(format!("ContentInfo: {e}")))?;
    if content_info.content_type != constants::ID_SIGNED_DATA {
        return Err(malformed(format!(
            "unexpected content type {}",
            content_info.content_type
        )));
    }

    let signed_data = content_info
        .content
        .decode_as::<SignedData>()
        .map_err(|e| malformed(format!("SignedData: {e}")))?;
    if signed_data.encap_content_info.econtent.is_some() {
        return Err(malformed("signature is not detached"));
    }
    Ok(signed_data)
}

fn embedded_certificates(signed_data: &SignedData) -> Result<Vec<X509Cert>, VerificationFailure> {
    let Some(set) = &signed_data.certificates else {
        return Ok(Vec::new());
    };

    set.0
        .iter()
        .filter_map(|choice| {
            if let CertificateChoices::Certificate(cert) = choice {
                Some(cert)
            } else {
                None
            }
        })
        .map(|cert| {
            X509Cert::from_certificate(cert.clone())
                .map_err(|e| malformed(format!("embedded certificate: {e}")))
        })
        .collect()
}

/// v3 when any signer uses a subject key identifier, v1 otherwise (RFC 5652 §5.1).
fn check_signed_data_version(
    signed_data: &SignedData,
    signer_infos: &[&SignerInfo],
) -> Result<(), VerificationFailure> {
    let uses_key_identifier = signer_infos
        .iter()
        .any(|si| matches!(si.sid, SignerIdentifier::SubjectKeyIdentifier(_)));
    let expected = if uses_key_identifier {
        CmsVersion::V3
    } else {
        CmsVersion::V1
    };
    if signed_data.version != expected {
        return Err(malformed("unexpected SignedData version"));
    }
    Ok(())
}

fn find_certificate<'a>(
    certificates: &'a [X509Cert],
    sid: &SignerIdentifier,
) -> Option<&'a X509Cert> {
    certificates.iter().find(|cert| match sid {
        SignerIdentifier::IssuerAndSerialNumber(ias) => {
            let tbs = &cert.certificate().tbs_certificate;
            tbs.issuer == ias.issuer && tbs.serial_number == ias.serial_number
        }
        SignerIdentifier::SubjectKeyIdentifier(ski) => {
            cert.subject_key_identifier().as_ref() == Some(ski)
        }
    })
}

/// Parameters must be absent or an explicit NULL.
fn check_parameters(algorithm: &AlgorithmIdentifierOwned) -> Result<(), VerificationFailure> {
    match &algorithm.parameters {
        None => Ok(()),
        Some(params) if params.decode_as::<Null>().is_ok() => Ok(()),
        Some(_) => Err(malformed(format!(
            "unexpected parameters for algorithm {}",
            algorithm.oid
        ))),
    }
}

fn verify_raw_signature(
    scheme: SignatureScheme,
    certificate: &X509Cert,
    data: &[u8],
    signature: &[u8],
) -> Result<(), VerificationFailure> {
    let public_key = certificate
        .public_key()
        .map_err(|_| malformed("certificate public key"))?;
    if KeyAlgorithm::from_id(public_key.id()) != Some(scheme.key) {
        return Err(VerificationFailure::SignatureInvalid);
    }

    let valid = openssl::sign::Verifier::new(scheme.digest.message_digest(), &public_key)
        .and_then(|mut verifier| {
            verifier.update(data)?;
            verifier.verify(signature)
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(VerificationFailure::SignatureInvalid)
    }
}

fn malformed(detail: impl Into<String>) -> VerificationFailure {
    VerificationFailure::Malformed(detail.into())
}
