//! Tests for signed attribute construction and parsing.

mod common;

use std::time::{Duration, UNIX_EPOCH};

use asic_signer::domain::constants;
use asic_signer::services::{SignedAttributeValues, SignedAttributesBuilder};
use asic_signer::DigestAlgorithm;
use der::Encode;

#[test]
fn built_attributes_parse_back() {
    let cert = common::rsa_identity("Attributes", 9).x509_cert();
    let digest = DigestAlgorithm::Sha1.digest(b"hello-asic");
    let signing_time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    let attrs = SignedAttributesBuilder::new(&digest, &cert)
        .signing_time(signing_time)
        .build()
        .unwrap();
    assert_eq!(attrs.len(), 4);

    let values = SignedAttributeValues::parse(&attrs).unwrap();
    assert_eq!(values.content_type, constants::ID_DATA);
    assert_eq!(values.message_digest, digest.as_slice());
    assert_eq!(values.signing_time, Some(signing_time));
    assert_eq!(
        values.signing_certificate_hash.as_deref(),
        Some(cert.sha1_fingerprint().as_slice())
    );
}

#[test]
fn encoding_is_deterministic() {
    let cert = common::ec_identity("Attributes", 9).x509_cert();
    let digest = DigestAlgorithm::Sha256.digest(b"content");
    let signing_time = UNIX_EPOCH + Duration::from_secs(1_600_000_000);

    let first = SignedAttributesBuilder::new(&digest, &cert)
        .signing_time(signing_time)
        .build()
        .unwrap()
        .to_der()
        .unwrap();
    let second = SignedAttributesBuilder::new(&digest, &cert)
        .signing_time(signing_time)
        .build()
        .unwrap()
        .to_der()
        .unwrap();

    assert_eq!(first, second);
    // SET OF tag
    assert_eq!(first[0], 0x31);
}
