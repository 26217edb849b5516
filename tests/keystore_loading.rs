//! Key material loading from JKS and PKCS#12 keystores.

mod common;

use std::io::{Cursor, Write};

use asic_signer::adapters::keystore::{JavaKeyStore, JksWriter, KeyStore};
use asic_signer::{KeyMaterialLoader, KeyStoreError, KeyStoreFormat, Password};
use tempfile::NamedTempFile;

fn load(
    bytes: &[u8],
    alias: Option<&str>,
    key_password: &str,
) -> Result<asic_signer::KeyMaterial, KeyStoreError> {
    KeyMaterialLoader::new().load_bytes(
        bytes,
        &common::store_password(),
        alias,
        &Password::from(key_password),
    )
}

#[test]
fn loads_named_alias() {
    let (identity, keystore) = common::signer_jks();
    let material = load(&keystore, Some("signer"), common::KEY_PASSWORD).unwrap();

    assert_eq!(material.alias(), "signer");
    assert_eq!(material.certificate(), &identity.x509_cert());
    assert_eq!(material.certificate_chain().len(), 1);
    assert!(material
        .key_pair()
        .public_key()
        .public_eq(&identity.key));
}

#[test]
fn alias_lookup_ignores_case() {
    let (_, keystore) = common::signer_jks();
    let material = load(&keystore, Some("SIGNER"), common::KEY_PASSWORD).unwrap();
    assert_eq!(material.alias(), "signer");
}

#[test]
fn loads_from_reader_and_file() {
    let (identity, keystore) = common::signer_jks();

    let material = KeyMaterialLoader::new()
        .load(
            Cursor::new(keystore.clone()),
            &common::store_password(),
            None,
            &common::key_password(),
        )
        .unwrap();
    assert_eq!(material.certificate(), &identity.x509_cert());

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&keystore).unwrap();
    let material = KeyMaterialLoader::with_format(KeyStoreFormat::Jks)
        .load_file(
            file.path(),
            &common::store_password(),
            Some("signer"),
            &common::key_password(),
        )
        .unwrap();
    assert_eq!(material.alias(), "signer");
}

#[test]
fn wrong_store_password_fails_integrity_check() {
    let (_, keystore) = common::signer_jks();
    let result = KeyMaterialLoader::new().load_bytes(
        &keystore,
        &Password::from("not-changeit"),
        Some("signer"),
        &common::key_password(),
    );
    assert!(matches!(result, Err(KeyStoreError::IntegrityCheckFailed)));
}

#[test]
fn missing_alias_is_reported() {
    let (_, keystore) = common::signer_jks();
    let result = load(&keystore, Some("nobody"), common::KEY_PASSWORD);
    assert!(matches!(result, Err(KeyStoreError::AliasNotFound(alias)) if alias == "nobody"));
}

#[test]
fn wrong_key_password_is_unrecoverable() {
    let (_, keystore) = common::signer_jks();
    let result = load(&keystore, Some("signer"), "wrong");
    assert!(matches!(result, Err(KeyStoreError::UnrecoverableKey(_))));
}

#[test]
fn default_alias_is_first_entry_in_file_order() {
    let zeta = common::rsa_identity("Zeta", 1);
    let alpha = common::ec_identity("Alpha", 2);
    let keystore = common::jks(
        &[("zeta", &zeta), ("alpha", &alpha)],
        common::STORE_PASSWORD,
        common::KEY_PASSWORD,
    );

    let first = load(&keystore, None, common::KEY_PASSWORD).unwrap();
    let second = load(&keystore, None, common::KEY_PASSWORD).unwrap();
    assert_eq!(first.alias(), "zeta");
    assert_eq!(first.certificate(), second.certificate());
    assert_eq!(first.certificate(), &zeta.x509_cert());

    let aliases = KeyMaterialLoader::new()
        .list_aliases(&keystore, &common::store_password())
        .unwrap();
    assert_eq!(aliases, vec!["zeta".to_string(), "alpha".to_string()]);
}

#[test]
fn trusted_certificate_entry_has_no_key() {
    let ca = common::rsa_identity("Trusted CA", 100);
    let leaf = common::rsa_identity("Leaf", 101);

    let mut writer = JksWriter::new();
    writer.add_trusted_certificate("ca", ca.x509_cert());
    writer
        .add_private_key("leaf", &leaf.key, &[leaf.x509_cert()], &common::key_password())
        .unwrap();
    let keystore = writer.encode(&common::store_password()).unwrap();

    let result = load(&keystore, None, common::KEY_PASSWORD);
    assert!(matches!(result, Err(KeyStoreError::NotAKeyEntry(alias)) if alias == "ca"));

    let material = load(&keystore, Some("leaf"), common::KEY_PASSWORD).unwrap();
    assert_eq!(material.certificate(), &leaf.x509_cert());

    let store = JavaKeyStore::decode(&keystore, &common::store_password()).unwrap();
    assert!(store.contains_alias("CA"));
    assert!(!store.is_key_entry("ca"));
    assert_eq!(store.certificate("ca"), Some(ca.x509_cert()));
    assert!(store.certificate_chain("ca").is_none());
}

#[test]
fn key_not_matching_certificate_is_rejected() {
    let owner = common::rsa_identity("Owner", 1);
    let other = common::rsa_identity("Other", 2);

    let mut writer = JksWriter::new();
    writer
        .add_private_key("mixed", &other.key, &[owner.x509_cert()], &common::key_password())
        .unwrap();
    let keystore = writer.encode(&common::store_password()).unwrap();

    let result = load(&keystore, Some("mixed"), common::KEY_PASSWORD);
    assert!(matches!(result, Err(KeyStoreError::KeyMismatch(_))));
}

#[test]
fn chain_is_kept_leaf_first() {
    let leaf = common::rsa_identity("Leaf", 1);
    let issuer = common::rsa_identity("Issuer", 2);

    let mut writer = JksWriter::new();
    writer
        .add_private_key(
            "leaf",
            &leaf.key,
            &[leaf.x509_cert(), issuer.x509_cert()],
            &common::key_password(),
        )
        .unwrap();
    let keystore = writer.encode(&common::store_password()).unwrap();

    let material = load(&keystore, None, common::KEY_PASSWORD).unwrap();
    let chain: Vec<_> = material.certificate_chain().iter().cloned().collect();
    assert_eq!(chain, vec![leaf.x509_cert(), issuer.x509_cert()]);
}

#[test]
fn unparsable_input_is_malformed() {
    assert!(matches!(
        load(b"definitely not a keystore", None, common::KEY_PASSWORD),
        Err(KeyStoreError::Malformed(_))
    ));

    let (_, keystore) = common::signer_jks();
    let result = KeyMaterialLoader::with_format(KeyStoreFormat::Pkcs12).load_bytes(
        &keystore,
        &common::store_password(),
        None,
        &common::key_password(),
    );
    assert!(matches!(result, Err(KeyStoreError::Malformed(_))));
}

#[test]
fn empty_keystore_has_no_default_alias() {
    let keystore = JksWriter::new().encode(&common::store_password()).unwrap();
    assert!(matches!(
        load(&keystore, None, common::KEY_PASSWORD),
        Err(KeyStoreError::Empty)
    ));
}

#[test]
fn pkcs12_keystore_loading() {
    let identity = common::ec_identity("P12", 5);
    let keystore = common::pkcs12(&identity, "identity", common::STORE_PASSWORD);
    assert_eq!(KeyStoreFormat::detect(&keystore), Some(KeyStoreFormat::Pkcs12));

    let material = KeyMaterialLoader::new()
        .load_bytes(
            &keystore,
            &common::store_password(),
            Some("IDENTITY"),
            &common::store_password(),
        )
        .unwrap();
    assert_eq!(material.certificate(), &identity.x509_cert());

    let wrong_store = KeyMaterialLoader::new().load_bytes(
        &keystore,
        &Password::from("wrong"),
        None,
        &Password::from("wrong"),
    );
    assert!(matches!(wrong_store, Err(KeyStoreError::IntegrityCheckFailed)));

    let wrong_key = KeyMaterialLoader::new().load_bytes(
        &keystore,
        &common::store_password(),
        None,
        &common::key_password(),
    );
    assert!(matches!(wrong_key, Err(KeyStoreError::UnrecoverableKey(_))));

    let same_length = KeyMaterialLoader::new().load_bytes(
        &keystore,
        &common::store_password(),
        None,
        &Password::from("changeiT"),
    );
    assert!(matches!(same_length, Err(KeyStoreError::UnrecoverableKey(_))));
}
