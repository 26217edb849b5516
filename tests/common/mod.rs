//! Shared fixtures for integration tests.
//!
//! Keys and self-signed certificates are generated with OpenSSL at test time
//! and packed into JKS or PKCS#12 keystores in memory.

#![allow(dead_code)]

use asic_signer::adapters::keystore::JksWriter;
use asic_signer::{Password, X509Cert};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::dsa::Dsa;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::extension::SubjectKeyIdentifier;
use openssl::x509::{X509NameBuilder, X509};

pub const STORE_PASSWORD: &str = "changeit";
pub const KEY_PASSWORD: &str = "keypass";

/// A private key with its self-signed certificate.
pub struct Identity {
    pub key: PKey<Private>,
    pub cert: X509,
}

impl Identity {
    pub fn x509_cert(&self) -> X509Cert {
        X509Cert::from_der(self.cert.to_der().unwrap()).unwrap()
    }
}

pub fn rsa_identity(common_name: &str, serial: u32) -> Identity {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
    identity(key, common_name, serial)
}

pub fn ec_identity(common_name: &str, serial: u32) -> Identity {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
    identity(key, common_name, serial)
}

pub fn dsa_identity(common_name: &str, serial: u32) -> Identity {
    let key = PKey::from_dsa(Dsa::generate(2048).unwrap()).unwrap();
    identity(key, common_name, serial)
}

fn identity(key: PKey<Private>, common_name: &str, serial: u32) -> Identity {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    name.append_entry_by_text("O", "ASiC Test").unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    let ski = SubjectKeyIdentifier::new()
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(ski).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    Identity {
        key,
        cert: builder.build(),
    }
}

/// JKS keystore holding one private key entry per identity, in order.
pub fn jks(entries: &[(&str, &Identity)], store_password: &str, key_password: &str) -> Vec<u8> {
    let mut writer = JksWriter::new();
    for (alias, identity) in entries {
        writer
            .add_private_key(
                alias,
                &identity.key,
                &[identity.x509_cert()],
                &Password::from(key_password),
            )
            .unwrap();
    }
    writer.encode(&Password::from(store_password)).unwrap()
}

/// The keystore of the reference scenario: alias `signer`, RSA key.
pub fn signer_jks() -> (Identity, Vec<u8>) {
    let identity = rsa_identity("ASiC Signer", 1);
    let bytes = jks(&[("signer", &identity)], STORE_PASSWORD, KEY_PASSWORD);
    (identity, bytes)
}

pub fn pkcs12(identity: &Identity, friendly_name: &str, password: &str) -> Vec<u8> {
    let mut builder = Pkcs12::builder();
    builder.name(friendly_name);
    builder.pkey(&identity.key);
    builder.cert(&identity.cert);
    builder.build2(password).unwrap().to_der().unwrap()
}

pub fn store_password() -> Password {
    Password::from(STORE_PASSWORD)
}

pub fn key_password() -> Password {
    Password::from(KEY_PASSWORD)
}
