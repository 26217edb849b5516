//! Service for constructing and reading CMS signed attributes.
//!
//! A signature always covers the DER `SET OF` encoding of these attributes:
//! contentType, signingTime, messageDigest and the ESS signingCertificate
//! (RFC 2634) binding the leaf certificate hash into the signed data.

use std::time::SystemTime;

use cms::signed_data::SignedAttributes;
use der::asn1::{GeneralizedTime, ObjectIdentifier, OctetString, SetOfVec, UtcTime};
use der::{Any, DateTime, Decode, Encode, Sequence, Tag};
use x509_cert::attr::Attribute;
use x509_cert::time::Time;

use crate::domain::constants;
use crate::domain::crypto::{DigestBytes, X509Cert};
use crate::infra::error::VerificationFailure;

/// ESSCertID ::= SEQUENCE { certHash OCTET STRING, issuerSerial IssuerSerial OPTIONAL }
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EssCertId {
    pub cert_hash: OctetString,
    pub issuer_serial: Option<Any>,
}

/// SigningCertificate ::= SEQUENCE { certs SEQUENCE OF ESSCertID, policies OPTIONAL }
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SigningCertificate {
    pub certs: Vec<EssCertId>,
    pub policies: Option<Any>,
}

/// Builds the signed attribute set for one `SignerInfo`.
pub struct SignedAttributesBuilder<'a> {
    message_digest: &'a DigestBytes,
    certificate: &'a X509Cert,
    signing_time: SystemTime,
}

impl<'a> SignedAttributesBuilder<'a> {
    #[must_use]
    pub fn new(message_digest: &'a DigestBytes, certificate: &'a X509Cert) -> Self {
        Self {
            message_digest,
            certificate,
            signing_time: SystemTime::now(),
        }
    }

    #[must_use]
    pub fn signing_time(mut self, signing_time: SystemTime) -> Self {
        self.signing_time = signing_time;
        self
    }

    /// Assemble the attributes in DER set order.
    pub fn build(&self) -> Result<SignedAttributes, der::Error> {
        let content_type = attribute(
            constants::ID_CONTENT_TYPE,
            Any::new(Tag::ObjectIdentifier, constants::ID_DATA.as_bytes())?,
        )?;
        let signing_time = attribute(constants::ID_SIGNING_TIME, encode_time(self.signing_time)?)?;
        let message_digest = attribute(
            constants::ID_MESSAGE_DIGEST,
            Any::new(Tag::OctetString, self.message_digest.as_slice())?,
        )?;

        let ess = SigningCertificate {
            certs: vec![EssCertId {
                cert_hash: OctetString::new(self.certificate.sha1_fingerprint().into_vec())?,
                issuer_serial: None,
            }],
            policies: None,
        };
        let signing_certificate =
            attribute(constants::ID_AA_SIGNING_CERTIFICATE, Any::encode_from(&ess)?)?;

        SetOfVec::try_from(vec![
            content_type,
            signing_time,
            message_digest,
            signing_certificate,
        ])
    }
}

/// Values of the signed attributes the verifier relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedAttributeValues {
    pub content_type: ObjectIdentifier,
    pub message_digest: Vec<u8>,
    /// SHA-1 of the signing certificate, from the ESS attribute when present.
    pub signing_certificate_hash: Option<Vec<u8>>,
    pub signing_time: Option<SystemTime>,
}

impl SignedAttributeValues {
    /// Extract and validate the well-known attributes.
    ///
    /// contentType and messageDigest are mandatory; none of the recognised
    /// attributes may appear twice or carry more than one value.
    pub fn parse(attributes: &SignedAttributes) -> Result<Self, VerificationFailure> {
        let mut content_type = None;
        let mut message_digest = None;
        let mut signing_certificate_hash = None;
        let mut signing_time = None;

        for attr in attributes.iter() {
            if attr.oid == constants::ID_CONTENT_TYPE {
                ensure_unset(&content_type, "contentType")?;
                let value = single_value(attr)?;
                content_type = Some(
                    value
                        .decode_as::<ObjectIdentifier>()
                        .map_err(|e| invalid(format!("contentType: {e}")))?,
                );
            } else if attr.oid == constants::ID_MESSAGE_DIGEST {
                ensure_unset(&message_digest, "messageDigest")?;
                let value = single_value(attr)?;
                let digest = value
                    .decode_as::<OctetString>()
                    .map_err(|e| invalid(format!("messageDigest: {e}")))?;
                message_digest = Some(digest.as_bytes().to_vec());
            } else if attr.oid == constants::ID_SIGNING_TIME {
                ensure_unset(&signing_time, "signingTime")?;
                let value = single_value(attr)?;
                let time = value
                    .to_der()
                    .and_then(|der| Time::from_der(&der))
                    .map_err(|e| invalid(format!("signingTime: {e}")))?;
                signing_time = Some(time.to_system_time());
            } else if attr.oid == constants::ID_AA_SIGNING_CERTIFICATE {
                ensure_unset(&signing_certificate_hash, "signingCertificate")?;
                let value = single_value(attr)?;
                let ess = value
                    .decode_as::<SigningCertificate>()
                    .map_err(|e| invalid(format!("signingCertificate: {e}")))?;
                let first = ess
                    .certs
                    .first()
                    .ok_or_else(|| invalid("signingCertificate without certificates"))?;
                signing_certificate_hash = Some(first.cert_hash.as_bytes().to_vec());
            }
        }

        Ok(Self {
            content_type: content_type.ok_or_else(|| invalid("missing contentType"))?,
            message_digest: message_digest.ok_or_else(|| invalid("missing messageDigest"))?,
            signing_certificate_hash,
            signing_time,
        })
    }
}

fn attribute(oid: ObjectIdentifier, value: Any) -> Result<Attribute, der::Error> {
    Ok(Attribute {
        oid,
        values: SetOfVec::try_from(vec![value])?,
    })
}

/// UTCTime for 1950..2049, GeneralizedTime outside that window (RFC 5652 §11.3).
fn encode_time(time: SystemTime) -> Result<Any, der::Error> {
    let date_time = DateTime::from_system_time(time)?;
    if (1950..2050).contains(&date_time.year()) {
        Any::encode_from(&UtcTime::from_date_time(date_time)?)
    } else {
        Any::encode_from(&GeneralizedTime::from_date_time(date_time))
    }
}

fn single_value(attr: &Attribute) -> Result<&Any, VerificationFailure> {
    if attr.values.len() != 1 {
        return Err(invalid(format!(
            "attribute {} must have exactly one value",
            attr.oid
        )));
    }
    attr.values
        .iter()
        .next()
        .ok_or_else(|| invalid(format!("attribute {} has no value", attr.oid)))
}

fn ensure_unset<T>(slot: &Option<T>, name: &str) -> Result<(), VerificationFailure> {
    if slot.is_some() {
        Err(invalid(format!("duplicate {name} attribute")))
    } else {
        Ok(())
    }
}

fn invalid(detail: impl Into<String>) -> VerificationFailure {
    VerificationFailure::InvalidAttributes(detail.into())
}
