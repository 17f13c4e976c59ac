// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Repository abstractions consumed by the trust validator.
//!
//! The validator itself performs no I/O. Trust anchors, OCSP responses and
//! CRLs are supplied by repository implementations behind the traits in this
//! module. Network-backed implementations are expected to block inside the
//! repository call and to release any connection on every exit path; the
//! in-memory [`MemoryCertificateRepository`] is provided for the common case
//! of a static trust anchor set.
//!
//! OCSP and CRL repositories hand back the raw DER bytes they obtained, so
//! the evidence recorded in [`RevocationData`](crate::RevocationData) is
//! byte-identical to what was fetched.

use std::collections::HashSet;
use std::time::SystemTime;

use der::Encode;
use thiserror::Error;
use tracing::warn;
use x509_cert::Certificate;

/// Error signalled by an [`OcspRepository`] when the responder is unreachable.
#[derive(Debug, Error)]
#[error("OCSP server not available: {0}")]
pub struct ServerNotAvailable(
    /// Human-readable cause reported by the repository.
    pub String,
);

/// Source of OCSP responses for (child, issuer) certificate pairs.
pub trait OcspRepository: Send + Sync {
    /// Find a DER-encoded OCSP response for `child` issued by `issuer`.
    ///
    /// `uri` is the responder URI extracted from the child's Authority
    /// Information Access extension, when present; implementations may
    /// resolve a response through other means when it is absent.
    ///
    /// Returns `Ok(None)` when no response is available, and
    /// [`ServerNotAvailable`] when the responder could not be reached.
    fn find_ocsp_response(
        &self,
        uri: Option<&str>,
        child: &Certificate,
        issuer: &Certificate,
        validation_date: SystemTime,
    ) -> Result<Option<Vec<u8>>, ServerNotAvailable>;
}

/// Source of CRLs for a distribution point URI.
pub trait CrlRepository: Send + Sync {
    /// Find the DER-encoded CRL published at `uri` by `issuer`.
    fn find_crl(
        &self,
        uri: &str,
        issuer: &Certificate,
        validation_date: SystemTime,
    ) -> Option<Vec<u8>>;
}

/// Set of trust anchors.
pub trait CertificateRepository: Send + Sync {
    /// Returns true if `certificate` is a trust point.
    ///
    /// Membership is decided on the encoded certificate bytes, not on any
    /// parsed field.
    fn is_trust_point(&self, certificate: &Certificate) -> bool;
}

/// In-memory trust anchor repository.
///
/// Anchors are stored by their DER encoding; [`is_trust_point`] re-encodes the
/// candidate and tests byte equality.
///
/// [`is_trust_point`]: CertificateRepository::is_trust_point
#[derive(Debug, Clone, Default)]
pub struct MemoryCertificateRepository {
    anchors: HashSet<Vec<u8>>,
}

impl MemoryCertificateRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trust anchor.
    pub fn add_trust_point(&mut self, certificate: &Certificate) -> der::Result<()> {
        self.anchors.insert(certificate.to_der()?);
        Ok(())
    }

    /// Number of trust anchors held.
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns true if no anchors have been added.
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

impl CertificateRepository for MemoryCertificateRepository {
    fn is_trust_point(&self, certificate: &Certificate) -> bool {
        match certificate.to_der() {
            Ok(der) => self.anchors.contains(&der),
            Err(e) => {
                warn!("failed to encode candidate trust point: {}", e);
                false
            }
        }
    }
}
