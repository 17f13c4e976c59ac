// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Signature algorithm policy enforcement.
//!
//! Certificates, OCSP responses and CRLs are only as strong as the signature
//! algorithms protecting them. The [`AlgorithmPolicy`] trait lets a deployment
//! decide which signature algorithm OIDs are acceptable at a given validation
//! date; the [`DefaultAlgorithmPolicy`] accepts the SHA-2 family and rejects
//! broken digests, with SHA-1 allowed only before a configurable cutoff date.
//!
//! # Accepted by the default policy
//!
//! - RSA PKCS#1 v1.5 with SHA-256 / SHA-384 / SHA-512
//! - RSASSA-PSS
//! - ECDSA with SHA-256 / SHA-384 / SHA-512
//! - Ed25519
//!
//! # Date-gated
//!
//! - RSA, ECDSA and DSA with SHA-1 (before the SHA-1 cutoff only)
//!
//! # Always rejected
//!
//! - Anything MD2 or MD5 based, and any OID not listed above

use std::time::{Duration, SystemTime};

use const_oid::ObjectIdentifier;
use tracing::debug;

use crate::error::{Result, TrustError};

/// sha256WithRSAEncryption (1.2.840.113549.1.1.11)
const RSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

/// sha384WithRSAEncryption (1.2.840.113549.1.1.12)
const RSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.12");

/// sha512WithRSAEncryption (1.2.840.113549.1.1.13)
const RSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.13");

/// id-RSASSA-PSS (1.2.840.113549.1.1.10)
const RSA_PSS: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.10");

/// ecdsa-with-SHA256 (1.2.840.10045.4.3.2)
const ECDSA_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.2");

/// ecdsa-with-SHA384 (1.2.840.10045.4.3.3)
const ECDSA_SHA384: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.3");

/// ecdsa-with-SHA512 (1.2.840.10045.4.3.4)
const ECDSA_SHA512: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.3.4");

/// id-Ed25519 (1.3.101.112)
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// sha1WithRSAEncryption (1.2.840.113549.1.1.5)
const RSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");

/// ecdsa-with-SHA1 (1.2.840.10045.4.1)
const ECDSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.4.1");

/// dsa-with-sha1 (1.2.840.10040.4.3)
const DSA_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10040.4.3");

/// md5WithRSAEncryption (1.2.840.113549.1.1.4)
const RSA_MD5: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.4");

/// md2WithRSAEncryption (1.2.840.113549.1.1.2)
const RSA_MD2: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.2");

/// Signature algorithm OIDs acceptable at any validation date.
const ACCEPTED: &[ObjectIdentifier] = &[
    RSA_SHA256,
    RSA_SHA384,
    RSA_SHA512,
    RSA_PSS,
    ECDSA_SHA256,
    ECDSA_SHA384,
    ECDSA_SHA512,
    ED25519,
];

/// Signature algorithm OIDs acceptable only before the SHA-1 cutoff.
const SHA1_GATED: &[ObjectIdentifier] = &[RSA_SHA1, ECDSA_SHA1, DSA_SHA1];

/// Signature algorithm OIDs rejected unconditionally.
const REJECTED: &[ObjectIdentifier] = &[RSA_MD5, RSA_MD2];

/// Policy deciding whether a signature algorithm is acceptable at a date.
pub trait AlgorithmPolicy: Send + Sync {
    /// Check a signature algorithm OID against this policy.
    ///
    /// Fails with [`TrustReason::ConstraintViolation`](crate::TrustReason) if
    /// the algorithm is disallowed at `validation_date`.
    fn check_signature_algorithm(
        &self,
        oid: &ObjectIdentifier,
        validation_date: SystemTime,
    ) -> Result<()>;
}

/// Default algorithm policy with a date-gated SHA-1 sunset.
#[derive(Debug, Clone)]
pub struct DefaultAlgorithmPolicy {
    sha1_cutoff: SystemTime,
}

/// 2016-01-01T00:00:00Z, after which SHA-1 signatures are rejected.
const DEFAULT_SHA1_CUTOFF_SECS: u64 = 1_451_606_400;

impl Default for DefaultAlgorithmPolicy {
    fn default() -> Self {
        Self {
            sha1_cutoff: SystemTime::UNIX_EPOCH + Duration::from_secs(DEFAULT_SHA1_CUTOFF_SECS),
        }
    }
}

impl DefaultAlgorithmPolicy {
    /// Create the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the date after which SHA-1 signatures are rejected.
    pub fn with_sha1_cutoff(mut self, cutoff: SystemTime) -> Self {
        self.sha1_cutoff = cutoff;
        self
    }
}

impl AlgorithmPolicy for DefaultAlgorithmPolicy {
    fn check_signature_algorithm(
        &self,
        oid: &ObjectIdentifier,
        validation_date: SystemTime,
    ) -> Result<()> {
        if ACCEPTED.contains(oid) {
            return Ok(());
        }

        if SHA1_GATED.contains(oid) {
            if validation_date < self.sha1_cutoff {
                debug!("accepting SHA-1 signature algorithm {} before cutoff", oid);
                return Ok(());
            }
            return Err(TrustError::constraint_violation(format!(
                "SHA-1 signature algorithm {} not allowed at validation date",
                oid
            )));
        }

        if REJECTED.contains(oid) {
            return Err(TrustError::constraint_violation(format!(
                "signature algorithm {} is cryptographically broken",
                oid
            )));
        }

        Err(TrustError::constraint_violation(format!(
            "signature algorithm {} not in accepted set",
            oid
        )))
    }
}
