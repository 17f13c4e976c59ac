// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Raw signature verification over DER structures.
//!
//! Dispatches on the signature algorithm OID and the key type carried in the
//! issuer's SubjectPublicKeyInfo. Supports RSA PKCS#1 v1.5 with SHA-1 (legacy
//! chains; acceptability is the algorithm policy's decision, not this
//! module's) and SHA-256/384/512, and ECDSA over P-256 and P-384.
//!
//! Everything here reports failure as an invalid-signature [`TrustError`];
//! callers decide whether that is fatal (certificate links) or soft (OCSP
//! response signatures, where an unverifiable signature merely leaves the
//! linker undecided).

use const_oid::ObjectIdentifier;
use der::Encode;
use sha1::Sha1;
use sha2::digest;
use sha2::{Sha256, Sha384, Sha512};
use signature::Verifier;
use spki::{DecodePublicKey, SubjectPublicKeyInfoOwned};
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::crl::CertificateList;
use x509_ocsp::BasicOcspResponse;

use crate::error::{Result, TrustError};

/// sha1WithRSAEncryption (1.2.840.113549.1.1.5)
const RSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");

/// sha256WithRSAEncryption (1.2.840.113549.1.1.11)
const RSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// sha384WithRSAEncryption (1.2.840.113549.1.1.12)
const RSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");

/// sha512WithRSAEncryption (1.2.840.113549.1.1.13)
const RSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

/// ecdsa-with-SHA256 (1.2.840.10045.4.3.2)
const ECDSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// ecdsa-with-SHA384 (1.2.840.10045.4.3.3)
const ECDSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// secp256r1 curve (1.2.840.10045.3.1.7)
const P256_CURVE: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// secp384r1 curve (1.3.132.0.34)
const P384_CURVE: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");

/// Verify `signature` over `message` with the public key of `signer`.
pub(crate) fn verify_signed_data(
    signer_spki: &SubjectPublicKeyInfoOwned,
    sig_alg: &ObjectIdentifier,
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    let spki_der = signer_spki
        .to_der()
        .map_err(|e| TrustError::invalid_signature(format!("failed to encode signer key: {}", e)))?;

    match *sig_alg {
        RSA_SHA1 => verify_rsa::<Sha1>(&spki_der, message, signature),
        RSA_SHA256 => verify_rsa::<Sha256>(&spki_der, message, signature),
        RSA_SHA384 => verify_rsa::<Sha384>(&spki_der, message, signature),
        RSA_SHA512 => verify_rsa::<Sha512>(&spki_der, message, signature),
        ECDSA_SHA256 | ECDSA_SHA384 => verify_ecdsa(signer_spki, &spki_der, message, signature),
        _ => Err(TrustError::invalid_signature(format!(
            "unsupported signature algorithm: {}",
            sig_alg
        ))),
    }
}

/// Verify the signature on `child` with the public key of `issuer`.
pub(crate) fn verify_certificate(child: &Certificate, issuer: &Certificate) -> Result<()> {
    let tbs = child.tbs_certificate.to_der().map_err(|e| {
        TrustError::invalid_signature(format!("failed to encode TBS certificate: {}", e))
    })?;
    let signature = child
        .signature
        .as_bytes()
        .ok_or_else(|| TrustError::invalid_signature("certificate signature has unused bits"))?;

    verify_signed_data(
        &issuer.tbs_certificate.subject_public_key_info,
        &child.signature_algorithm.oid,
        &tbs,
        signature,
    )
}

/// Verify the signature on `crl` with the public key of `issuer`.
pub(crate) fn verify_crl(crl: &CertificateList, issuer: &Certificate) -> Result<()> {
    let tbs = crl
        .tbs_cert_list
        .to_der()
        .map_err(|e| TrustError::invalid_signature(format!("failed to encode TBS CRL: {}", e)))?;
    let signature = crl
        .signature
        .as_bytes()
        .ok_or_else(|| TrustError::invalid_signature("CRL signature has unused bits"))?;

    verify_signed_data(
        &issuer.tbs_certificate.subject_public_key_info,
        &crl.signature_algorithm.oid,
        &tbs,
        signature,
    )
}

/// Verify the signature on a basic OCSP response with `signer`'s public key.
pub(crate) fn verify_basic_ocsp_response(
    basic: &BasicOcspResponse,
    signer: &Certificate,
) -> Result<()> {
    let tbs = basic.tbs_response_data.to_der().map_err(|e| {
        TrustError::invalid_signature(format!("failed to encode OCSP response data: {}", e))
    })?;
    let signature = basic
        .signature
        .as_bytes()
        .ok_or_else(|| TrustError::invalid_signature("OCSP signature has unused bits"))?;

    verify_signed_data(
        &signer.tbs_certificate.subject_public_key_info,
        &basic.signature_algorithm.oid,
        &tbs,
        signature,
    )
}

fn verify_rsa<D>(signer_spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<()>
where
    D: digest::Digest + digest::const_oid::AssociatedOid,
    rsa::pkcs1v15::VerifyingKey<D>: Verifier<rsa::pkcs1v15::Signature>,
{
    let public_key = rsa::RsaPublicKey::from_public_key_der(signer_spki_der)
        .map_err(|e| TrustError::invalid_signature(format!("invalid RSA public key: {}", e)))?;
    let verifying_key = rsa::pkcs1v15::VerifyingKey::<D>::new(public_key);
    let sig = rsa::pkcs1v15::Signature::try_from(signature)
        .map_err(|e| TrustError::invalid_signature(format!("invalid RSA signature: {}", e)))?;

    verifying_key
        .verify(message, &sig)
        .map_err(|e| TrustError::invalid_signature(format!("RSA verification failed: {}", e)))
}

fn verify_ecdsa(
    signer_spki: &SubjectPublicKeyInfoOwned,
    signer_spki_der: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<()> {
    // The curve is named by the key, not the signature algorithm: an EC SPKI
    // carries id-ecPublicKey with the curve OID as parameters.
    let curve = signer_spki
        .algorithm
        .parameters
        .as_ref()
        .and_then(|p| p.decode_as::<ObjectIdentifier>().ok());

    match curve {
        Some(P256_CURVE) => verify_ecdsa_p256(signer_spki_der, message, signature),
        Some(P384_CURVE) => verify_ecdsa_p384(signer_spki_der, message, signature),
        Some(other) => Err(TrustError::invalid_signature(format!(
            "unsupported EC curve: {}",
            other
        ))),
        None => {
            debug!("EC key without readable curve parameters, trying known curves");
            verify_ecdsa_p256(signer_spki_der, message, signature)
                .or_else(|_| verify_ecdsa_p384(signer_spki_der, message, signature))
        }
    }
}

fn verify_ecdsa_p256(signer_spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key = p256::ecdsa::VerifyingKey::from_public_key_der(signer_spki_der)
        .map_err(|e| TrustError::invalid_signature(format!("invalid P-256 public key: {}", e)))?;
    let sig = p256::ecdsa::Signature::from_der(signature)
        .map_err(|e| TrustError::invalid_signature(format!("invalid ECDSA signature: {}", e)))?;

    verifying_key
        .verify(message, &sig)
        .map_err(|e| TrustError::invalid_signature(format!("ECDSA verification failed: {}", e)))
}

fn verify_ecdsa_p384(signer_spki_der: &[u8], message: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key = p384::ecdsa::VerifyingKey::from_public_key_der(signer_spki_der)
        .map_err(|e| TrustError::invalid_signature(format!("invalid P-384 public key: {}", e)))?;
    let sig = p384::ecdsa::Signature::from_der(signature)
        .map_err(|e| TrustError::invalid_signature(format!("invalid ECDSA signature: {}", e)))?;

    verifying_key
        .verify(message, &sig)
        .map_err(|e| TrustError::invalid_signature(format!("ECDSA verification failed: {}", e)))
}
