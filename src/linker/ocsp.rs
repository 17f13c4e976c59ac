// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OCSP-based trust linker (RFC 6960).
//!
//! Resolves the revocation status of a child certificate from an OCSP
//! response supplied by an [`OcspRepository`]. The linker verifies that the
//! response was produced by an authorized responder (the issuing CA itself,
//! or a delegated responder holding an OCSPSigning certificate issued by that
//! CA), matches the response entry against the (issuer, serial) pair, and
//! reconciles the entry's update window with the validation date.
//!
//! OCSP is advisory when misconfigured: most anomalies (absent response,
//! unverifiable signature, stale window, unauthorized responder) leave the
//! linker undecided so that a CRL linker can still decide. Only a definitive
//! revoked or unknown certificate status is fatal.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use const_oid::ObjectIdentifier;
use der::{Decode, Encode};
use sha1::{Digest, Sha1};
use tracing::{debug, warn};
use x509_cert::Certificate;
use x509_cert::serial_number::SerialNumber;
use x509_ocsp::{BasicOcspResponse, CertId, CertStatus, OcspResponse, OcspResponseStatus};

use crate::certext;
use crate::error::{Result, TrustError, TrustReason};
use crate::linker::{LinkStatus, PublicKeyTrustLinker, TrustLinker};
use crate::policy::AlgorithmPolicy;
use crate::repository::OcspRepository;
use crate::revocation::{OcspRevocationData, RevocationData};
use crate::verify;

/// id-pkix-ocsp-basic (1.3.6.1.5.5.7.48.1.1)
const ID_PKIX_OCSP_BASIC: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.48.1.1");

/// id-kp-OCSPSigning (1.3.6.1.5.5.7.3.9)
const ID_KP_OCSP_SIGNING: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.9");

/// SHA-1 digest algorithm (1.3.14.3.2.26), the RFC 6960 default for CertID.
const SHA1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");

/// Trust linker based on OCSP revocation information.
pub struct OcspTrustLinker {
    ocsp_repository: Arc<dyn OcspRepository>,
    freshness: Duration,
}

impl OcspTrustLinker {
    /// Default OCSP freshness interval. Update windows are widened by this
    /// tolerance on both ends; seconds-level tolerances are too tight for
    /// responders whose clocks are merely NTP-synchronized.
    pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(300);

    /// Create a linker backed by the given repository.
    pub fn new(ocsp_repository: Arc<dyn OcspRepository>) -> Self {
        Self {
            ocsp_repository,
            freshness: Self::DEFAULT_FRESHNESS,
        }
    }

    /// Override the freshness interval applied around the response's
    /// thisUpdate/nextUpdate window.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    /// Verify that the basic response was signed by an authorized responder.
    ///
    /// `certs` holds the certificates carried inside the response, decoded.
    /// Returns the soft verdict `Undecided` whenever the responder cannot be
    /// positively authorized; hard failures (algorithm policy, a broken
    /// responder certificate chain) propagate.
    fn check_responder(
        &self,
        basic: &BasicOcspResponse,
        certs: &[Certificate],
        issuer: &Certificate,
        validation_date: SystemTime,
        revocation_data: &mut RevocationData,
        algorithm_policy: &dyn AlgorithmPolicy,
    ) -> Result<LinkStatus> {
        let Some(responder) = certs.first() else {
            // No responder certificates: the issuing CA signed the response.
            if let Err(e) = verify::verify_basic_ocsp_response(basic, issuer) {
                debug!("OCSP response signature invalid: {}", e);
                return Ok(LinkStatus::Undecided);
            }
            return Ok(LinkStatus::Trusted);
        };

        if let Err(e) = verify::verify_basic_ocsp_response(basic, responder) {
            debug!("OCSP responder response signature invalid: {}", e);
            return Ok(LinkStatus::Undecided);
        }

        if der_equal(responder, issuer) {
            debug!("OCSP responder certificate equals the CA certificate");
            // the CA certificate is already trusted at this point
            return Ok(LinkStatus::Trusted);
        }

        // Delegated responder.
        algorithm_policy
            .check_signature_algorithm(&responder.signature_algorithm.oid, validation_date)?;

        let issuing_ca = if certs.len() < 2 {
            debug!("OCSP responder certificate chain not included, assuming the CA issued it");
            issuer
        } else {
            if !der_equal(&certs[1], issuer) {
                debug!("OCSP responder certificate not issued by the CA");
                return Ok(LinkStatus::Undecided);
            }
            &certs[1]
        };
        algorithm_policy
            .check_signature_algorithm(&issuing_ca.signature_algorithm.oid, validation_date)?;

        PublicKeyTrustLinker::new().has_trust_link(
            responder,
            issuing_ca,
            validation_date,
            revocation_data,
            algorithm_policy,
        )?;

        if !certext::has_ocsp_no_check(responder) {
            debug!("OCSP responder certificate lacks id-pkix-ocsp-nocheck");
            return Ok(LinkStatus::Undecided);
        }

        match certext::extended_key_usage(responder) {
            Some(eku) if eku.0.contains(&ID_KP_OCSP_SIGNING) => Ok(LinkStatus::Trusted),
            Some(_) => {
                debug!("OCSP responder certificate lacks the OCSPSigning extended key usage");
                Ok(LinkStatus::Undecided)
            }
            None => {
                debug!("OCSP responder certificate has no extended key usage extension");
                Ok(LinkStatus::Undecided)
            }
        }
    }
}

impl TrustLinker for OcspTrustLinker {
    fn has_trust_link(
        &self,
        child: &Certificate,
        issuer: &Certificate,
        validation_date: SystemTime,
        revocation_data: &mut RevocationData,
        algorithm_policy: &dyn AlgorithmPolicy,
    ) -> Result<LinkStatus> {
        let uri = certext::ocsp_uri(child);
        if uri.is_none() {
            // the repository may still resolve a response by other means
            debug!("no OCSP URI in authority information access");
        }

        let encoded = match self.ocsp_repository.find_ocsp_response(
            uri.as_deref(),
            child,
            issuer,
            validation_date,
        ) {
            Ok(Some(encoded)) => encoded,
            Ok(None) => {
                debug!("OCSP response not found");
                return Ok(LinkStatus::Undecided);
            }
            Err(e) => {
                return Err(TrustError::with_source(
                    TrustReason::OcspUnavailable,
                    "OCSP server is unavailable",
                    e,
                ));
            }
        };

        let response = match OcspResponse::from_der(&encoded) {
            Ok(response) => response,
            Err(e) => {
                warn!("undecodable OCSP response: {}", e);
                return Ok(LinkStatus::Undecided);
            }
        };

        if !matches!(response.response_status, OcspResponseStatus::Successful) {
            debug!("OCSP response status: {:?}", response.response_status);
            return Ok(LinkStatus::Undecided);
        }
        let Some(response_bytes) = &response.response_bytes else {
            debug!("OCSP response carries no response bytes");
            return Ok(LinkStatus::Undecided);
        };
        if response_bytes.response_type != ID_PKIX_OCSP_BASIC {
            debug!(
                "unsupported OCSP response type: {}",
                response_bytes.response_type
            );
            return Ok(LinkStatus::Undecided);
        }
        let basic = match BasicOcspResponse::from_der(response_bytes.response.as_bytes()) {
            Ok(basic) => basic,
            Err(e) => {
                warn!("undecodable basic OCSP response: {}", e);
                return Ok(LinkStatus::Undecided);
            }
        };

        algorithm_policy
            .check_signature_algorithm(&basic.signature_algorithm.oid, validation_date)?;

        let Some(certs) = decode_responder_certificates(&basic) else {
            return Ok(LinkStatus::Undecided);
        };

        if self
            .check_responder(
                &basic,
                &certs,
                issuer,
                validation_date,
                revocation_data,
                algorithm_policy,
            )?
            .is_undecided()
        {
            return Ok(LinkStatus::Undecided);
        }

        let Some((issuer_name_hash, issuer_key_hash)) = expected_cert_id_hashes(issuer) else {
            warn!("cannot compute expected OCSP certificate identifier");
            return Ok(LinkStatus::Undecided);
        };
        let serial = &child.tbs_certificate.serial_number;

        let date = validation_date
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        for single in &basic.tbs_response_data.responses {
            if !cert_id_matches(&single.cert_id, &issuer_name_hash, &issuer_key_hash, serial) {
                continue;
            }

            let this_update = single.this_update.0.to_unix_duration();
            let next_update = single
                .next_update
                .map(|next| next.0.to_unix_duration())
                .unwrap_or(this_update);
            let begin_validity = this_update.saturating_sub(self.freshness);
            let end_validity = next_update + self.freshness;
            if date < begin_validity {
                warn!("OCSP response entry not yet valid");
                continue;
            }
            if date > end_validity {
                warn!("OCSP response entry expired");
                continue;
            }

            match &single.cert_status {
                CertStatus::Good(_) => {
                    debug!("OCSP good for {}", child.tbs_certificate.subject);
                    revocation_data.add_ocsp(OcspRevocationData::new(encoded.clone(), uri.clone()));
                    return Ok(LinkStatus::Trusted);
                }
                CertStatus::Revoked(info) => {
                    revocation_data.add_ocsp(OcspRevocationData::new(encoded.clone(), uri.clone()));
                    return Err(TrustError::invalid_revocation_status(format!(
                        "certificate revoked by OCSP at {} (reason: {:?})",
                        info.revocation_time.0.to_date_time(),
                        info.revocation_reason
                    )));
                }
                CertStatus::Unknown(_) => {
                    revocation_data.add_ocsp(OcspRevocationData::new(encoded.clone(), uri.clone()));
                    return Err(TrustError::invalid_revocation_status(
                        "certificate status unknown per OCSP",
                    ));
                }
            }
        }

        debug!("no matching OCSP response entry");
        Ok(LinkStatus::Undecided)
    }
}

/// Decode the certificates embedded in a basic response.
///
/// Returns `None` (undecided territory) when any of them fails to decode.
fn decode_responder_certificates(basic: &BasicOcspResponse) -> Option<Vec<Certificate>> {
    Some(basic.certs.clone().unwrap_or_default())
}

/// Encoded-bytes equality of two certificates.
fn der_equal(a: &Certificate, b: &Certificate) -> bool {
    match (a.to_der(), b.to_der()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// SHA-1 hashes of the issuer subject name and public key, as used by the
/// RFC 6960 default CertID.
fn expected_cert_id_hashes(issuer: &Certificate) -> Option<(Vec<u8>, Vec<u8>)> {
    let name = issuer.tbs_certificate.subject.to_der().ok()?;
    let key = issuer
        .tbs_certificate
        .subject_public_key_info
        .subject_public_key
        .as_bytes()?;
    Some((Sha1::digest(&name).to_vec(), Sha1::digest(key).to_vec()))
}

fn cert_id_matches(
    cert_id: &CertId,
    issuer_name_hash: &[u8],
    issuer_key_hash: &[u8],
    serial: &SerialNumber,
) -> bool {
    cert_id.hash_algorithm.oid == SHA1_OID
        && cert_id.issuer_name_hash.as_bytes() == issuer_name_hash
        && cert_id.issuer_key_hash.as_bytes() == issuer_key_hash
        && cert_id.serial_number == *serial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultAlgorithmPolicy;
    use crate::repository::ServerNotAvailable;
    use der::DecodePem;

    const INTERMEDIATE_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/intermediate.pem");
    const LEAF_PEM: &[u8] = include_bytes!("../../tests/fixtures/certs/leaf.pem");

    const LEAF_GOOD: &[u8] = include_bytes!("../../tests/fixtures/ocsp/leaf-good.der");
    const LEAF_GOOD_NO_NEXT: &[u8] =
        include_bytes!("../../tests/fixtures/ocsp/leaf-good-no-next-update.der");
    const LEAF_REVOKED: &[u8] = include_bytes!("../../tests/fixtures/ocsp/leaf-revoked.der");
    const LEAF_UNKNOWN: &[u8] = include_bytes!("../../tests/fixtures/ocsp/leaf-unknown.der");
    const LEAF_GOOD_DELEGATED: &[u8] =
        include_bytes!("../../tests/fixtures/ocsp/leaf-good-delegated.der");
    const LEAF_GOOD_DELEGATED_CHAIN: &[u8] =
        include_bytes!("../../tests/fixtures/ocsp/leaf-good-delegated-chain.der");
    const LEAF_GOOD_DELEGATED_NOCHECKLESS: &[u8] =
        include_bytes!("../../tests/fixtures/ocsp/leaf-good-delegated-nocheckless.der");
    const INTERMEDIATE_GOOD: &[u8] =
        include_bytes!("../../tests/fixtures/ocsp/intermediate-good.der");
    const UNKNOWN_SERIAL: &[u8] = include_bytes!("../../tests/fixtures/ocsp/unknown-serial.der");

    /// Repository returning one canned response, or failing when marked
    /// unavailable.
    struct StaticOcspRepository {
        response: Option<Vec<u8>>,
        unavailable: bool,
    }

    impl StaticOcspRepository {
        fn with(response: &[u8]) -> Self {
            Self {
                response: Some(response.to_vec()),
                unavailable: false,
            }
        }

        fn empty() -> Self {
            Self {
                response: None,
                unavailable: false,
            }
        }

        fn down() -> Self {
            Self {
                response: None,
                unavailable: true,
            }
        }
    }

    impl OcspRepository for StaticOcspRepository {
        fn find_ocsp_response(
            &self,
            _uri: Option<&str>,
            _child: &Certificate,
            _issuer: &Certificate,
            _validation_date: SystemTime,
        ) -> std::result::Result<Option<Vec<u8>>, ServerNotAvailable> {
            if self.unavailable {
                return Err(ServerNotAvailable("connection refused".into()));
            }
            Ok(self.response.clone())
        }
    }

    fn cert(pem: &[u8]) -> Certificate {
        Certificate::from_pem(pem).unwrap()
    }

    /// thisUpdate of the first response entry, as a SystemTime.
    fn this_update(encoded: &[u8]) -> SystemTime {
        let response = OcspResponse::from_der(encoded).unwrap();
        let basic =
            BasicOcspResponse::from_der(response.response_bytes.unwrap().response.as_bytes())
                .unwrap();
        UNIX_EPOCH + basic.tbs_response_data.responses[0].this_update.0.to_unix_duration()
    }

    fn link(
        repository: StaticOcspRepository,
        date: SystemTime,
    ) -> (Result<LinkStatus>, RevocationData) {
        let leaf = cert(LEAF_PEM);
        let intermediate = cert(INTERMEDIATE_PEM);
        let mut revocation_data = RevocationData::new();
        let policy = DefaultAlgorithmPolicy::new();
        let linker = OcspTrustLinker::new(Arc::new(repository));
        let result =
            linker.has_trust_link(&leaf, &intermediate, date, &mut revocation_data, &policy);
        (result, revocation_data)
    }

    #[test]
    fn test_good_response_is_trusted() {
        let date = this_update(LEAF_GOOD) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::with(LEAF_GOOD), date);
        assert_eq!(result.unwrap(), LinkStatus::Trusted);
        assert_eq!(data.ocsp().len(), 1);
        // attached bytes are exactly what the repository returned
        assert_eq!(data.ocsp()[0].encoded(), LEAF_GOOD);
        assert_eq!(
            data.ocsp()[0].uri(),
            Some("http://ocsp.example.test/intermediate")
        );
    }

    #[test]
    fn test_revoked_response_is_fatal() {
        let date = this_update(LEAF_REVOKED) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::with(LEAF_REVOKED), date);
        let err = result.unwrap_err();
        assert_eq!(err.reason(), TrustReason::InvalidRevocationStatus);
        // the revoked response is still attached as evidence
        assert_eq!(data.ocsp().len(), 1);
    }

    #[test]
    fn test_unknown_status_is_fatal() {
        let date = this_update(LEAF_UNKNOWN) + Duration::from_secs(3600);
        let (result, _) = link(StaticOcspRepository::with(LEAF_UNKNOWN), date);
        assert_eq!(
            result.unwrap_err().reason(),
            TrustReason::InvalidRevocationStatus
        );
    }

    #[test]
    fn test_missing_response_is_undecided() {
        let date = this_update(LEAF_GOOD) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::empty(), date);
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
        assert!(data.is_empty());
    }

    #[test]
    fn test_unavailable_server_is_fatal() {
        let date = this_update(LEAF_GOOD) + Duration::from_secs(3600);
        let (result, _) = link(StaticOcspRepository::down(), date);
        assert_eq!(result.unwrap_err().reason(), TrustReason::OcspUnavailable);
    }

    #[test]
    fn test_stale_response_is_undecided() {
        // one day past nextUpdate, well outside the freshness tolerance
        let date = this_update(LEAF_GOOD) + Duration::from_secs(3 * 24 * 3600);
        let (result, data) = link(StaticOcspRepository::with(LEAF_GOOD), date);
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
        assert!(data.is_empty());
    }

    #[test]
    fn test_missing_next_update_defaults_to_this_update() {
        // inside thisUpdate + freshness
        let date = this_update(LEAF_GOOD_NO_NEXT) + Duration::from_secs(60);
        let (result, _) = link(StaticOcspRepository::with(LEAF_GOOD_NO_NEXT), date);
        assert_eq!(result.unwrap(), LinkStatus::Trusted);

        // past thisUpdate + freshness
        let date = this_update(LEAF_GOOD_NO_NEXT) + Duration::from_secs(600);
        let (result, _) = link(StaticOcspRepository::with(LEAF_GOOD_NO_NEXT), date);
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
    }

    #[test]
    fn test_mismatched_cert_id_is_undecided() {
        // a perfectly valid response, but for the intermediate, not the leaf
        let date = this_update(INTERMEDIATE_GOOD) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::with(INTERMEDIATE_GOOD), date);
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
        assert!(data.is_empty());
    }

    #[test]
    fn test_mismatched_serial_is_undecided() {
        // issuer hashes match the intermediate, but the single entry covers
        // serial 0x0dedbeef, not the leaf; its unknown status is never read
        let date = this_update(UNKNOWN_SERIAL) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::with(UNKNOWN_SERIAL), date);
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
        assert!(data.is_empty());
    }

    #[test]
    fn test_non_successful_outer_status_is_undecided() {
        // OCSPResponse { responseStatus: tryLater(3) }
        let try_later = [0x30, 0x03, 0x0a, 0x01, 0x03];
        let date = this_update(LEAF_GOOD) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::with(&try_later), date);
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
        assert!(data.is_empty());
    }

    #[test]
    fn test_delegated_responder_is_trusted() {
        let date = this_update(LEAF_GOOD_DELEGATED) + Duration::from_secs(3600);
        let (result, data) = link(StaticOcspRepository::with(LEAF_GOOD_DELEGATED), date);
        assert_eq!(result.unwrap(), LinkStatus::Trusted);
        assert_eq!(data.ocsp().len(), 1);
    }

    #[test]
    fn test_delegated_responder_with_chain_is_trusted() {
        let date = this_update(LEAF_GOOD_DELEGATED_CHAIN) + Duration::from_secs(3600);
        let (result, _) = link(StaticOcspRepository::with(LEAF_GOOD_DELEGATED_CHAIN), date);
        assert_eq!(result.unwrap(), LinkStatus::Trusted);
    }

    #[test]
    fn test_delegated_responder_without_nocheck_is_undecided() {
        let date = this_update(LEAF_GOOD_DELEGATED_NOCHECKLESS) + Duration::from_secs(3600);
        let (result, data) = link(
            StaticOcspRepository::with(LEAF_GOOD_DELEGATED_NOCHECKLESS),
            date,
        );
        assert_eq!(result.unwrap(), LinkStatus::Undecided);
        assert!(data.is_empty());
    }
}
