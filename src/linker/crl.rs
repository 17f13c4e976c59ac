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

//! CRL-based trust linker (RFC 5280).
//!
//! The fallback revocation source: fetches the CRL named by the child
//! certificate's CRL Distribution Points extension, verifies it against the
//! issuer, checks its update window and scans it for the child's serial
//! number. Like the OCSP linker it fails soft: only a listed serial is
//! fatal; an absent, unverifiable or stale CRL leaves the linker undecided.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use der::Decode;
use tracing::{debug, warn};
use x509_cert::Certificate;
use x509_cert::crl::CertificateList;

use crate::certext;
use crate::error::{Result, TrustError};
use crate::linker::{LinkStatus, TrustLinker};
use crate::policy::AlgorithmPolicy;
use crate::repository::CrlRepository;
use crate::revocation::{CrlRevocationData, RevocationData};
use crate::verify;

/// Trust linker based on CRL revocation information.
pub struct CrlTrustLinker {
    crl_repository: Arc<dyn CrlRepository>,
    freshness: Duration,
}

impl CrlTrustLinker {
    /// Default CRL freshness interval applied around thisUpdate/nextUpdate.
    pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(300);

    /// Create a linker backed by the given repository.
    pub fn new(crl_repository: Arc<dyn CrlRepository>) -> Self {
        Self {
            crl_repository,
            freshness: Self::DEFAULT_FRESHNESS,
        }
    }

    /// Override the freshness interval applied around the CRL update window.
    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    fn check_crl(
        &self,
        encoded: &[u8],
        uri: &str,
        child: &Certificate,
        issuer: &Certificate,
        validation_date: SystemTime,
        revocation_data: &mut RevocationData,
        algorithm_policy: &dyn AlgorithmPolicy,
    ) -> Result<LinkStatus> {
        let crl = match CertificateList::from_der(encoded) {
            Ok(crl) => crl,
            Err(e) => {
                warn!("undecodable CRL from {}: {}", uri, e);
                return Ok(LinkStatus::Undecided);
            }
        };

        if crl.tbs_cert_list.issuer != issuer.tbs_certificate.subject {
            debug!("CRL issuer does not match the issuing certificate subject");
            return Ok(LinkStatus::Undecided);
        }

        if let Err(e) = verify::verify_crl(&crl, issuer) {
            debug!("CRL signature invalid: {}", e);
            return Ok(LinkStatus::Undecided);
        }

        algorithm_policy
            .check_signature_algorithm(&crl.signature_algorithm.oid, validation_date)?;

        let Some(next_update) = crl.tbs_cert_list.next_update.as_ref() else {
            debug!("CRL carries no nextUpdate");
            return Ok(LinkStatus::Undecided);
        };
        let this_update = crl.tbs_cert_list.this_update.to_unix_duration();
        let begin_validity = this_update.saturating_sub(self.freshness);
        let end_validity = next_update.to_unix_duration() + self.freshness;
        let date = validation_date
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        if date < begin_validity {
            warn!("CRL not yet valid");
            return Ok(LinkStatus::Undecided);
        }
        if date > end_validity {
            warn!("CRL expired");
            return Ok(LinkStatus::Undecided);
        }

        let serial = &child.tbs_certificate.serial_number;
        if let Some(revoked) = &crl.tbs_cert_list.revoked_certificates {
            for entry in revoked {
                if entry.serial_number == *serial {
                    revocation_data
                        .add_crl(CrlRevocationData::new(encoded.to_vec(), uri));
                    return Err(TrustError::invalid_revocation_status(format!(
                        "certificate with serial {} revoked by CRL",
                        serial
                    )));
                }
            }
        }

        debug!("CRL OK for {}", child.tbs_certificate.subject);
        revocation_data.add_crl(CrlRevocationData::new(encoded.to_vec(), uri));
        Ok(LinkStatus::Trusted)
    }
}

impl TrustLinker for CrlTrustLinker {
    fn has_trust_link(
        &self,
        child: &Certificate,
        issuer: &Certificate,
        validation_date: SystemTime,
        revocation_data: &mut RevocationData,
        algorithm_policy: &dyn AlgorithmPolicy,
    ) -> Result<LinkStatus> {
        let uris = certext::crl_distribution_point_uris(child);
        if uris.is_empty() {
            debug!("no CRL distribution points");
            return Ok(LinkStatus::Undecided);
        }

        for uri in &uris {
            let Some(encoded) = self
                .crl_repository
                .find_crl(uri, issuer, validation_date)
            else {
                debug!("no CRL found at {}", uri);
                continue;
            };

            return self.check_crl(
                &encoded,
                uri,
                child,
                issuer,
                validation_date,
                revocation_data,
                algorithm_policy,
            );
        }

        Ok(LinkStatus::Undecided)
    }
}
