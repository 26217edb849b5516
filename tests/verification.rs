//! Verifier behaviour against tampered and hand-assembled signatures.

mod common;

use asic_signer::domain::constants;
use asic_signer::{
    AlgorithmRegistry, CmsSigner, CmsVerifier, KeyMaterialLoader, SignatureBlob,
    VerificationFailure, VerificationPolicy,
};
use cms::cert::CertificateChoices;
use cms::content_info::{CmsVersion, ContentInfo};
use cms::signed_data::{
    CertificateSet, SignatureValue, SignedData, SignerIdentifier, SignerInfo, SignerInfos,
};
use der::asn1::{ObjectIdentifier, SetOfVec};
use der::{Any, Decode, Encode, Tag};

const CONTENT: &[u8] = b"hello-asic";

fn signer_for(identity: &common::Identity, alias: &str) -> CmsSigner {
    let keystore = common::jks(
        &[(alias, identity)],
        common::STORE_PASSWORD,
        common::KEY_PASSWORD,
    );
    let material = KeyMaterialLoader::new()
        .load_bytes(
            &keystore,
            &common::store_password(),
            None,
            &common::key_password(),
        )
        .unwrap();
    CmsSigner::new(material, &AlgorithmRegistry::initialize()).unwrap()
}

fn verifier() -> CmsVerifier {
    CmsVerifier::new(AlgorithmRegistry::initialize())
}

fn decode(blob: &SignatureBlob) -> SignedData {
    ContentInfo::from_der(blob.as_bytes())
        .unwrap()
        .content
        .decode_as::<SignedData>()
        .unwrap()
}

fn encode(signed_data: &SignedData) -> SignatureBlob {
    let content_info = ContentInfo {
        content_type: constants::ID_SIGNED_DATA,
        content: Any::encode_from(signed_data).unwrap(),
    };
    SignatureBlob::from_der(content_info.to_der().unwrap())
}

fn signer_infos(signed_data: &SignedData) -> Vec<SignerInfo> {
    signed_data.signer_infos.0.iter().cloned().collect()
}

fn certificates(signed_data: &SignedData) -> Vec<CertificateChoices> {
    signed_data
        .certificates
        .as_ref()
        .map(|set| set.0.iter().cloned().collect())
        .unwrap_or_default()
}

fn corrupt_signature(signer_info: &mut SignerInfo) {
    let mut bytes = signer_info.signature.as_bytes().to_vec();
    bytes[0] ^= 0xFF;
    signer_info.signature = SignatureValue::new(bytes).unwrap();
}

fn cause(result: Result<(), asic_signer::VerificationError>) -> VerificationFailure {
    result.unwrap_err().cause().clone()
}

#[test]
fn altered_content_is_a_digest_mismatch() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let blob = signer.sign(CONTENT).unwrap();

    assert_eq!(
        cause(verifier().verify(b"hello-ASIC", &blob)),
        VerificationFailure::DigestMismatch
    );
}

#[test]
fn altered_signature_value_is_invalid() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());

    let mut infos = signer_infos(&signed_data);
    corrupt_signature(&mut infos[0]);
    signed_data.signer_infos = SignerInfos(SetOfVec::try_from(infos).unwrap());

    assert_eq!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::SignatureInvalid
    );
}

#[test]
fn truncated_blob_is_malformed() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let blob = signer.sign(CONTENT).unwrap().into_vec();

    let truncated = SignatureBlob::from_der(blob[..blob.len() - 10].to_vec());
    assert!(matches!(
        cause(verifier().verify(CONTENT, &truncated)),
        VerificationFailure::Malformed(_)
    ));

    let mut extended = blob;
    extended.push(0);
    assert!(verifier()
        .verify(CONTENT, &SignatureBlob::from_der(extended))
        .is_err());
}

#[test]
fn failures_share_one_message() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let blob = signer.sign(CONTENT).unwrap();

    let digest = verifier().verify(b"other", &blob).unwrap_err();
    let garbage = verifier()
        .verify(CONTENT, &SignatureBlob::from_der(b"garbage".to_vec()))
        .unwrap_err();
    assert_eq!(digest.to_string(), garbage.to_string());
    assert_ne!(digest.cause(), garbage.cause());
}

#[test]
fn swapped_certificate_is_detected() {
    let genuine = common::rsa_identity("Signer", 1);
    // Same subject, issuer and serial, different key.
    let impostor = common::rsa_identity("Signer", 1);
    let signer = signer_for(&genuine, "signer");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());

    signed_data.certificates = Some(
        CertificateSet(
            SetOfVec::try_from(vec![CertificateChoices::Certificate(
                impostor.x509_cert().certificate().clone(),
            )])
            .unwrap(),
        ),
    );

    assert_eq!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::CertificateMismatch
    );
}

#[test]
fn missing_certificate_is_reported() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());
    signed_data.certificates = None;

    assert_eq!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::CertificateNotFound
    );
}

#[test]
fn blob_without_signers_is_rejected() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());
    signed_data.signer_infos = SignerInfos(SetOfVec::try_from(Vec::new()).unwrap());

    assert_eq!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::NoSigners
    );
}

#[test]
fn attached_content_is_rejected() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());
    signed_data.encap_content_info.econtent = Some(Any::new(Tag::OctetString, CONTENT).unwrap());

    assert!(matches!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::Malformed(_)
    ));
}

#[test]
fn version_and_digest_list_are_checked() {
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let original = decode(&signer.sign(CONTENT).unwrap());

    let mut wrong_version = original.clone();
    wrong_version.version = CmsVersion::V3;
    assert!(matches!(
        cause(verifier().verify(CONTENT, &encode(&wrong_version))),
        VerificationFailure::Malformed(_)
    ));

    let mut unlisted_digest = original;
    unlisted_digest.digest_algorithms = SetOfVec::try_from(vec![
        spki::AlgorithmIdentifierOwned {
            oid: constants::ID_SHA256,
            parameters: None,
        },
    ])
    .unwrap();
    assert!(matches!(
        cause(verifier().verify(CONTENT, &encode(&unlisted_digest))),
        VerificationFailure::Malformed(_)
    ));
}

#[test]
fn unknown_digest_algorithm_is_unsupported() {
    let md5 = ObjectIdentifier::new_unwrap("1.2.840.113549.2.5");
    let signer = signer_for(&common::rsa_identity("Signer", 1), "signer");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());

    let mut infos = signer_infos(&signed_data);
    infos[0].digest_alg.oid = md5;
    signed_data.signer_infos = SignerInfos(SetOfVec::try_from(infos).unwrap());
    signed_data.digest_algorithms = SetOfVec::try_from(vec![
        spki::AlgorithmIdentifierOwned {
            oid: md5,
            parameters: None,
        },
    ])
    .unwrap();

    assert!(matches!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::UnsupportedAlgorithm(_)
    ));
}

#[test]
fn subject_key_identifier_matches_certificate() {
    let identity = common::rsa_identity("SKI Signer", 3);
    let signer = signer_for(&identity, "ski");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());

    let ski = identity.x509_cert().subject_key_identifier().unwrap();
    let mut infos = signer_infos(&signed_data);
    infos[0].sid = SignerIdentifier::SubjectKeyIdentifier(ski);
    infos[0].version = CmsVersion::V3;
    signed_data.signer_infos = SignerInfos(SetOfVec::try_from(infos).unwrap());
    signed_data.version = CmsVersion::V3;

    assert!(verifier().verify(CONTENT, &encode(&signed_data)).is_ok());
}

#[test]
fn signer_without_signed_attributes_covers_content() {
    let identity = common::rsa_identity("Plain Signer", 4);
    let signer = signer_for(&identity, "plain");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());

    let mut plain = openssl::sign::Signer::new(
        openssl::hash::MessageDigest::sha1(),
        &identity.key,
    )
    .unwrap();
    plain.update(CONTENT).unwrap();
    let signature = plain.sign_to_vec().unwrap();

    let mut infos = signer_infos(&signed_data);
    infos[0].signed_attrs = None;
    infos[0].signature = SignatureValue::new(signature).unwrap();
    signed_data.signer_infos = SignerInfos(SetOfVec::try_from(infos).unwrap());
    let blob = encode(&signed_data);

    assert!(verifier().verify(CONTENT, &blob).is_ok());
    assert_eq!(
        cause(verifier().verify(b"other", &blob)),
        VerificationFailure::SignatureInvalid
    );
}

#[test]
fn unloadable_certificate_key_is_malformed() {
    let identity = common::rsa_identity("Opaque Key", 6);
    let signer = signer_for(&identity, "opaque");
    let mut signed_data = decode(&signer.sign(CONTENT).unwrap());

    // Without signed attributes the certificate hash is not checked first.
    let mut infos = signer_infos(&signed_data);
    infos[0].signed_attrs = None;
    signed_data.signer_infos = SignerInfos(SetOfVec::try_from(infos).unwrap());

    let mut certificate = identity.x509_cert().certificate().clone();
    let key_info = &mut certificate.tbs_certificate.subject_public_key_info;
    key_info.algorithm = spki::AlgorithmIdentifierOwned {
        oid: ObjectIdentifier::new_unwrap("1.3.6.1.4.1.55555.1"),
        parameters: None,
    };
    signed_data.certificates = Some(CertificateSet(
        SetOfVec::try_from(vec![CertificateChoices::Certificate(certificate)]).unwrap(),
    ));

    assert_eq!(
        cause(verifier().verify(CONTENT, &encode(&signed_data))),
        VerificationFailure::Malformed("certificate public key".to_string())
    );
}

/// Two signers over the same content merged into one `SignedData`.
fn two_signer_blob(corrupt_second: bool) -> SignatureBlob {
    let first = signer_for(&common::rsa_identity("First Signer", 1), "first");
    let second = signer_for(&common::ec_identity("Second Signer", 2), "second");

    let mut merged = decode(&first.sign(CONTENT).unwrap());
    let other = decode(&second.sign(CONTENT).unwrap());

    let mut infos = signer_infos(&merged);
    let mut second_info = signer_infos(&other).remove(0);
    if corrupt_second {
        corrupt_signature(&mut second_info);
    }
    infos.push(second_info);

    let mut certs = certificates(&merged);
    certs.extend(certificates(&other));

    merged.signer_infos = SignerInfos(SetOfVec::try_from(infos).unwrap());
    merged.certificates = Some(CertificateSet(SetOfVec::try_from(certs).unwrap()));
    encode(&merged)
}

#[test]
fn all_valid_signers_pass_every_policy() {
    let blob = two_signer_blob(false);

    assert!(verifier().verify(CONTENT, &blob).is_ok());
    assert!(verifier()
        .with_policy(VerificationPolicy::AnySigner)
        .verify(CONTENT, &blob)
        .is_ok());

    let report = verifier().verify_report(CONTENT, &blob).unwrap();
    assert_eq!(report.signers.len(), 2);
    assert!(report.signers.iter().all(|outcome| outcome.is_valid()));
}

#[test]
fn one_bad_signer_fails_the_default_policy() {
    let blob = two_signer_blob(true);

    assert_eq!(
        cause(verifier().verify(CONTENT, &blob)),
        VerificationFailure::SignatureInvalid
    );
    assert!(verifier()
        .with_policy(VerificationPolicy::AnySigner)
        .verify(CONTENT, &blob)
        .is_ok());

    let report = verifier().verify_report(CONTENT, &blob).unwrap();
    let invalid: Vec<_> = report
        .signers
        .iter()
        .filter(|outcome| !outcome.is_valid())
        .collect();
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0]
        .subject
        .as_deref()
        .unwrap()
        .contains("Second Signer"));
}
