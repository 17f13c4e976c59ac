// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! X.509 extension helpers used by the trust linkers.
//!
//! Decoding is deliberately forgiving: a malformed or absent extension yields
//! `None` (with a debug log) rather than an error, because the linkers treat
//! missing information as grounds for an undecided verdict, not a failure.

use const_oid::ObjectIdentifier;
use der::Decode;
use tracing::debug;
use url::Url;
use x509_cert::Certificate;
use x509_cert::ext::Extension;
use x509_cert::ext::pkix::name::{DistributionPointName, GeneralName};
use x509_cert::ext::pkix::{
    AuthorityInfoAccessSyntax, BasicConstraints, CrlDistributionPoints, ExtendedKeyUsage, KeyUsage,
};

/// id-ad-ocsp access method (1.3.6.1.5.5.7.48.1)
const ID_AD_OCSP: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1");

/// id-pkix-ocsp-nocheck (1.3.6.1.5.5.7.48.1.5)
const ID_PKIX_OCSP_NOCHECK: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1.5");

/// Find an extension by OID.
pub(crate) fn find_extension<'a>(
    certificate: &'a Certificate,
    oid: &ObjectIdentifier,
) -> Option<&'a Extension> {
    certificate
        .tbs_certificate
        .extensions
        .as_ref()?
        .iter()
        .find(|ext| ext.extn_id == *oid)
}

/// Extract the OCSP responder URI from the Authority Information Access
/// extension, if any access description carries one.
pub(crate) fn ocsp_uri(certificate: &Certificate) -> Option<String> {
    let ext = find_extension(
        certificate,
        &const_oid::db::rfc5280::ID_PE_AUTHORITY_INFO_ACCESS,
    )?;
    let aia = match AuthorityInfoAccessSyntax::from_der(ext.extn_value.as_bytes()) {
        Ok(aia) => aia,
        Err(e) => {
            debug!("undecodable AuthorityInfoAccess extension: {}", e);
            return None;
        }
    };

    for access in aia.0.iter() {
        if access.access_method != ID_AD_OCSP {
            continue;
        }
        let GeneralName::UniformResourceIdentifier(uri) = &access.access_location else {
            debug!("OCSP access location is not a URI");
            continue;
        };
        let uri = uri.to_string();
        match Url::parse(&uri) {
            Ok(_) => return Some(uri),
            Err(e) => debug!("skipping malformed OCSP URI {}: {}", uri, e),
        }
    }
    None
}

/// Extract the distribution point URIs from the CRL Distribution Points
/// extension.
pub(crate) fn crl_distribution_point_uris(certificate: &Certificate) -> Vec<String> {
    let mut uris = Vec::new();

    let Some(ext) = find_extension(
        certificate,
        &const_oid::db::rfc5280::ID_CE_CRL_DISTRIBUTION_POINTS,
    ) else {
        return uris;
    };
    let points = match CrlDistributionPoints::from_der(ext.extn_value.as_bytes()) {
        Ok(points) => points,
        Err(e) => {
            debug!("undecodable CRLDistributionPoints extension: {}", e);
            return uris;
        }
    };

    for point in points.0.iter() {
        let Some(DistributionPointName::FullName(names)) = &point.distribution_point else {
            continue;
        };
        for name in names {
            let GeneralName::UniformResourceIdentifier(uri) = name else {
                continue;
            };
            let uri = uri.to_string();
            match Url::parse(&uri) {
                Ok(_) => uris.push(uri),
                Err(e) => debug!("skipping malformed CRL URI {}: {}", uri, e),
            }
        }
    }
    uris
}

/// Decode the BasicConstraints extension.
pub(crate) fn basic_constraints(certificate: &Certificate) -> Option<BasicConstraints> {
    let ext = find_extension(certificate, &const_oid::db::rfc5280::ID_CE_BASIC_CONSTRAINTS)?;
    match BasicConstraints::from_der(ext.extn_value.as_bytes()) {
        Ok(bc) => Some(bc),
        Err(e) => {
            debug!("undecodable BasicConstraints extension: {}", e);
            None
        }
    }
}

/// Decode the KeyUsage extension.
pub(crate) fn key_usage(certificate: &Certificate) -> Option<KeyUsage> {
    let ext = find_extension(certificate, &const_oid::db::rfc5280::ID_CE_KEY_USAGE)?;
    match KeyUsage::from_der(ext.extn_value.as_bytes()) {
        Ok(ku) => Some(ku),
        Err(e) => {
            debug!("undecodable KeyUsage extension: {}", e);
            None
        }
    }
}

/// Decode the Extended Key Usage extension.
pub(crate) fn extended_key_usage(certificate: &Certificate) -> Option<ExtendedKeyUsage> {
    let ext = find_extension(certificate, &const_oid::db::rfc5280::ID_CE_EXT_KEY_USAGE)?;
    match ExtendedKeyUsage::from_der(ext.extn_value.as_bytes()) {
        Ok(eku) => Some(eku),
        Err(e) => {
            debug!("undecodable ExtendedKeyUsage extension: {}", e);
            None
        }
    }
}

/// Returns true if the certificate carries id-pkix-ocsp-nocheck.
pub(crate) fn has_ocsp_no_check(certificate: &Certificate) -> bool {
    find_extension(certificate, &ID_PKIX_OCSP_NOCHECK).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::DecodePem;
    use x509_cert::ext::pkix::KeyUsages;

    const INTERMEDIATE_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/intermediate.pem");
    const LEAF_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/leaf.pem");
    const RESPONDER_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/responder.pem");
    const RESPONDER_NOCHECKLESS_PEM: &[u8] =
        include_bytes!("../tests/fixtures/certs/responder-nocheckless.pem");

    fn cert(pem: &[u8]) -> Certificate {
        Certificate::from_pem(pem).unwrap()
    }

    #[test]
    fn test_ocsp_uri_from_aia() {
        let leaf = cert(LEAF_PEM);
        assert_eq!(
            ocsp_uri(&leaf).as_deref(),
            Some("http://ocsp.example.test/intermediate")
        );

        let intermediate = cert(INTERMEDIATE_PEM);
        assert_eq!(
            ocsp_uri(&intermediate).as_deref(),
            Some("http://ocsp.example.test/root")
        );
    }

    #[test]
    fn test_crl_distribution_point_uris() {
        let leaf = cert(LEAF_PEM);
        assert_eq!(
            crl_distribution_point_uris(&leaf),
            vec!["http://crl.example.test/intermediate.crl".to_string()]
        );
    }

    #[test]
    fn test_basic_constraints() {
        let intermediate = cert(INTERMEDIATE_PEM);
        let bc = basic_constraints(&intermediate).unwrap();
        assert!(bc.ca);

        let leaf = cert(LEAF_PEM);
        let bc = basic_constraints(&leaf).unwrap();
        assert!(!bc.ca);
    }

    #[test]
    fn test_key_usage_cert_sign() {
        let intermediate = cert(INTERMEDIATE_PEM);
        let ku = key_usage(&intermediate).unwrap();
        assert!(ku.0.contains(KeyUsages::KeyCertSign));

        let leaf = cert(LEAF_PEM);
        let ku = key_usage(&leaf).unwrap();
        assert!(!ku.0.contains(KeyUsages::KeyCertSign));
    }

    #[test]
    fn test_ocsp_responder_extensions() {
        let responder = cert(RESPONDER_PEM);
        assert!(has_ocsp_no_check(&responder));

        let ocsp_signing = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.9");
        let eku = extended_key_usage(&responder).unwrap();
        assert!(eku.0.contains(&ocsp_signing));

        let leaf = cert(LEAF_PEM);
        assert!(!has_ocsp_no_check(&leaf));
        assert!(extended_key_usage(&leaf).is_some()); // serverAuth only
        assert!(!extended_key_usage(&leaf).unwrap().0.contains(&ocsp_signing));
    }

    #[test]
    fn test_responder_without_nocheck_extension() {
        // an OCSPSigning certificate that merely omits id-pkix-ocsp-nocheck
        let responder = cert(RESPONDER_NOCHECKLESS_PEM);
        assert!(!has_ocsp_no_check(&responder));

        let ocsp_signing = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.9");
        assert!(
            extended_key_usage(&responder)
                .unwrap()
                .0
                .contains(&ocsp_signing)
        );
    }
}
