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

//! The mandatory public-key trust linker.
//!
//! Establishes the basic cryptographic link between a child certificate and
//! its issuer: name chaining, signature, validity window, CA constraints and
//! algorithm policy. A `Trusted` verdict from this linker means only that the
//! pair is well-formed; revocation is left to the subsequent linkers.

use std::time::{SystemTime, UNIX_EPOCH};

use der::Decode;
use tracing::debug;
use x509_cert::Certificate;
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, KeyUsages, SubjectKeyIdentifier};

use crate::certext;
use crate::error::{Result, TrustError};
use crate::linker::{LinkStatus, TrustLinker};
use crate::policy::AlgorithmPolicy;
use crate::revocation::RevocationData;
use crate::verify;

/// Trust linker verifying the issuer/subject relation, certificate signature,
/// validity window and CA constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicKeyTrustLinker;

impl PublicKeyTrustLinker {
    /// Create the linker.
    pub fn new() -> Self {
        Self
    }
}

impl TrustLinker for PublicKeyTrustLinker {
    fn has_trust_link(
        &self,
        child: &Certificate,
        issuer: &Certificate,
        validation_date: SystemTime,
        _revocation_data: &mut RevocationData,
        algorithm_policy: &dyn AlgorithmPolicy,
    ) -> Result<LinkStatus> {
        if child.tbs_certificate.issuer != issuer.tbs_certificate.subject {
            debug!(
                "child issuer {} does not match issuer subject {}",
                child.tbs_certificate.issuer, issuer.tbs_certificate.subject
            );
            return Err(TrustError::invalid_signature(
                "child certificate issuer does not match issuer certificate subject",
            ));
        }

        log_key_identifier_mismatch(child, issuer);

        verify::verify_certificate(child, issuer)?;

        let date = validation_date
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let not_before = child.tbs_certificate.validity.not_before.to_unix_duration();
        let not_after = child.tbs_certificate.validity.not_after.to_unix_duration();
        if date < not_before || date > not_after {
            return Err(TrustError::invalid_validity_interval(format!(
                "validation date outside validity of {}",
                child.tbs_certificate.subject
            )));
        }

        match certext::basic_constraints(issuer) {
            Some(bc) if bc.ca => {}
            _ => {
                return Err(TrustError::constraint_violation(format!(
                    "issuer {} has no CA basic constraints",
                    issuer.tbs_certificate.subject
                )));
            }
        }

        if let Some(ku) = certext::key_usage(issuer) {
            if !ku.0.contains(KeyUsages::KeyCertSign) {
                return Err(TrustError::constraint_violation(format!(
                    "issuer {} key usage lacks keyCertSign",
                    issuer.tbs_certificate.subject
                )));
            }
        } else {
            debug!(
                "issuer {} carries no key usage extension",
                issuer.tbs_certificate.subject
            );
        }

        algorithm_policy
            .check_signature_algorithm(&child.signature_algorithm.oid, validation_date)?;

        Ok(LinkStatus::Trusted)
    }
}

/// Compare the child's Authority Key Identifier against the issuer's Subject
/// Key Identifier. The identifiers are advisory chain-building hints, so a
/// mismatch is only logged.
fn log_key_identifier_mismatch(child: &Certificate, issuer: &Certificate) {
    let aki = certext::find_extension(child, &const_oid::db::rfc5280::ID_CE_AUTHORITY_KEY_IDENTIFIER)
        .and_then(|ext| AuthorityKeyIdentifier::from_der(ext.extn_value.as_bytes()).ok())
        .and_then(|aki| aki.key_identifier);
    let ski = certext::find_extension(issuer, &const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER)
        .and_then(|ext| SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes()).ok());

    if let (Some(aki), Some(ski)) = (aki, ski) {
        if aki.as_bytes() != ski.0.as_bytes() {
            debug!("child authority key identifier does not match issuer subject key identifier");
        }
    }
}
