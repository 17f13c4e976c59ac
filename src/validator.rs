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

//! Chain-walking trust validator.
//!
//! The validator answers the question "is this certificate chain trusted as
//! of date D?". The caller supplies the chain in order, end-entity first,
//! each certificate followed by its alleged issuer, and the validator:
//!
//! 1. requires the top of the chain to be a trust anchor;
//! 2. runs the mandatory [`PublicKeyTrustLinker`] on every adjacent pair;
//! 3. runs the configured revocation linkers on each pair, in order, until
//!    one positively establishes trust, propagating any definitive failure;
//! 4. refuses to trust a pair on which every configured revocation linker
//!    stayed undecided.
//!
//! Path building is out of scope: a chain that is merely unordered fails.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use x509_trust::{MemoryCertificateRepository, TrustValidator};
//!
//! # fn example(root: x509_trust::Certificate, chain: Vec<x509_trust::Certificate>)
//! #     -> x509_trust::Result<()> {
//! let mut anchors = MemoryCertificateRepository::new();
//! anchors.add_trust_point(&root).expect("anchor encoding");
//!
//! // no revocation linkers configured: pairs are accepted on the basic link
//! let validator = TrustValidator::new(Arc::new(anchors));
//! validator.is_trusted(&chain)?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;
use x509_cert::Certificate;

use crate::error::{Result, TrustError};
use crate::linker::{CrlTrustLinker, OcspTrustLinker, PublicKeyTrustLinker, TrustLinker};
use crate::policy::{AlgorithmPolicy, DefaultAlgorithmPolicy};
use crate::repository::{CertificateRepository, CrlRepository, OcspRepository};
use crate::revocation::RevocationData;

/// Validates certificate chains against a trust anchor repository through an
/// ordered sequence of trust linkers.
///
/// A single validator instance is long-lived and may be shared across threads
/// once configured; all per-validation state lives in the caller-owned
/// [`RevocationData`].
pub struct TrustValidator {
    certificate_repository: Arc<dyn CertificateRepository>,
    trust_linkers: Vec<Box<dyn TrustLinker>>,
    algorithm_policy: Arc<dyn AlgorithmPolicy>,
}

impl TrustValidator {
    /// Create a validator over the given trust anchor repository.
    ///
    /// The new validator carries the default algorithm policy and no
    /// revocation linkers; without linkers, pairs are accepted on the basic
    /// public-key link alone. Use
    /// [`TrustValidatorDecorator::add_default_trust_linker_config`] or
    /// [`add_trust_linker`](Self::add_trust_linker) to require revocation
    /// evidence.
    pub fn new(certificate_repository: Arc<dyn CertificateRepository>) -> Self {
        Self {
            certificate_repository,
            trust_linkers: Vec::new(),
            algorithm_policy: Arc::new(DefaultAlgorithmPolicy::new()),
        }
    }

    /// Append a revocation trust linker. Linkers run in insertion order.
    pub fn add_trust_linker(&mut self, linker: Box<dyn TrustLinker>) {
        self.trust_linkers.push(linker);
    }

    /// Replace the algorithm policy.
    pub fn set_algorithm_policy(&mut self, algorithm_policy: Arc<dyn AlgorithmPolicy>) {
        self.algorithm_policy = algorithm_policy;
    }

    /// Validate `chain` at the current system time.
    pub fn is_trusted(&self, chain: &[Certificate]) -> Result<()> {
        self.is_trusted_at(chain, SystemTime::now())
    }

    /// Validate `chain` at `validation_date`.
    pub fn is_trusted_at(&self, chain: &[Certificate], validation_date: SystemTime) -> Result<()> {
        let mut revocation_data = RevocationData::new();
        self.is_trusted_with(chain, validation_date, &mut revocation_data)
    }

    /// Validate `chain` at `validation_date`, collecting revocation evidence
    /// into the caller-owned `revocation_data`.
    ///
    /// On failure, `revocation_data` still holds the evidence gathered before
    /// the failing pair, including any response or CRL that proved a
    /// certificate revoked.
    pub fn is_trusted_with(
        &self,
        chain: &[Certificate],
        validation_date: SystemTime,
        revocation_data: &mut RevocationData,
    ) -> Result<()> {
        let Some(root) = chain.last() else {
            return Err(TrustError::no_trust("empty certificate chain"));
        };

        if !self.certificate_repository.is_trust_point(root) {
            return Err(TrustError::root_not_trusted(format!(
                "root {} not in trust repository",
                root.tbs_certificate.subject
            )));
        }

        let public_key_linker = PublicKeyTrustLinker::new();

        if root.tbs_certificate.subject == root.tbs_certificate.issuer {
            debug!("verifying self-signed root {}", root.tbs_certificate.subject);
            public_key_linker.has_trust_link(
                root,
                root,
                validation_date,
                revocation_data,
                self.algorithm_policy.as_ref(),
            )?;
        }

        for pair in chain.windows(2) {
            let (child, issuer) = (&pair[0], &pair[1]);
            debug!(
                "linking {} to {}",
                child.tbs_certificate.subject, issuer.tbs_certificate.subject
            );

            public_key_linker.has_trust_link(
                child,
                issuer,
                validation_date,
                revocation_data,
                self.algorithm_policy.as_ref(),
            )?;

            if self.trust_linkers.is_empty() {
                continue;
            }

            let mut decided = false;
            for linker in &self.trust_linkers {
                let status = linker.has_trust_link(
                    child,
                    issuer,
                    validation_date,
                    revocation_data,
                    self.algorithm_policy.as_ref(),
                )?;
                if status.is_trusted() {
                    decided = true;
                    break;
                }
            }

            if !decided {
                return Err(TrustError::no_trust(format!(
                    "no trust linker could establish revocation status of {}",
                    child.tbs_certificate.subject
                )));
            }
        }

        Ok(())
    }
}

/// Installs the default trust linker configuration on a validator.
pub struct TrustValidatorDecorator {
    ocsp_repository: Arc<dyn OcspRepository>,
    crl_repository: Arc<dyn CrlRepository>,
}

impl TrustValidatorDecorator {
    /// Create a decorator wiring the given revocation repositories.
    pub fn new(
        ocsp_repository: Arc<dyn OcspRepository>,
        crl_repository: Arc<dyn CrlRepository>,
    ) -> Self {
        Self {
            ocsp_repository,
            crl_repository,
        }
    }

    /// Install the default linker configuration: OCSP first, CRL as the
    /// fallback.
    pub fn add_default_trust_linker_config(&self, validator: &mut TrustValidator) {
        validator.add_trust_linker(Box::new(OcspTrustLinker::new(self.ocsp_repository.clone())));
        validator.add_trust_linker(Box::new(CrlTrustLinker::new(self.crl_repository.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrustReason;
    use crate::repository::MemoryCertificateRepository;
    use der::DecodePem;
    use std::time::{Duration, UNIX_EPOCH};

    const ROOT_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/root.pem");
    const INTERMEDIATE_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/intermediate.pem");
    const LEAF_PEM: &[u8] = include_bytes!("../tests/fixtures/certs/leaf.pem");

    fn cert(pem: &[u8]) -> Certificate {
        Certificate::from_pem(pem).unwrap()
    }

    fn mid_validity(cert: &Certificate) -> SystemTime {
        let not_before = cert.tbs_certificate.validity.not_before.to_unix_duration();
        UNIX_EPOCH + not_before + Duration::from_secs(24 * 3600)
    }

    fn validator_with(root: &Certificate) -> TrustValidator {
        let mut anchors = MemoryCertificateRepository::new();
        anchors.add_trust_point(root).unwrap();
        TrustValidator::new(Arc::new(anchors))
    }

    #[test]
    fn test_empty_chain_is_no_trust() {
        let root = cert(ROOT_PEM);
        let validator = validator_with(&root);
        let err = validator.is_trusted(&[]).unwrap_err();
        assert_eq!(err.reason(), TrustReason::NoTrust);
    }

    #[test]
    fn test_chain_without_revocation_linkers() {
        let root = cert(ROOT_PEM);
        let chain = vec![cert(LEAF_PEM), cert(INTERMEDIATE_PEM), root.clone()];
        let validator = validator_with(&root);
        let date = mid_validity(&chain[0]);
        assert!(validator.is_trusted_at(&chain, date).is_ok());
    }

    #[test]
    fn test_untrusted_root_rejected() {
        let root = cert(ROOT_PEM);
        let chain = vec![cert(LEAF_PEM), cert(INTERMEDIATE_PEM), root];
        let validator = TrustValidator::new(Arc::new(MemoryCertificateRepository::new()));
        let err = validator
            .is_trusted_at(&chain, mid_validity(&chain[0]))
            .unwrap_err();
        assert_eq!(err.reason(), TrustReason::RootNotTrusted);
    }

    #[test]
    fn test_unordered_chain_rejected() {
        let root = cert(ROOT_PEM);
        let chain = vec![cert(LEAF_PEM), root.clone()];
        let validator = validator_with(&root);
        let err = validator
            .is_trusted_at(&chain, mid_validity(&chain[0]))
            .unwrap_err();
        assert_eq!(err.reason(), TrustReason::InvalidSignature);
    }

    #[test]
    fn test_single_anchor_chain() {
        let root = cert(ROOT_PEM);
        let validator = validator_with(&root);
        let date = mid_validity(&root);
        assert!(validator.is_trusted_at(&[root], date).is_ok());
    }
}
