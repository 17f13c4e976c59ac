//! Revocation evidence collected during a validation.
//!
//! Every successful consultation of an OCSP responder or CRL distribution
//! point is recorded in a caller-owned [`RevocationData`] accumulator. The
//! recorded bytes are exactly the DER bytes returned by the repository, so a
//! caller can archive them or re-verify the decision later (for example in a
//! long-term signature validation context).
//!
//! Linkers that came up empty-handed (no response, stale response, unverifiable
//! signature) never attach evidence.
//!
//! # Example
//!
//! ```no_run
//! use x509_trust::{RevocationData, TrustValidator};
//! # fn example(validator: TrustValidator, chain: Vec<x509_trust::Certificate>) {
//! let mut revocation_data = RevocationData::new();
//! validator
//!     .is_trusted_with(&chain, std::time::SystemTime::now(), &mut revocation_data)
//!     .expect("chain should be trusted");
//!
//! for ocsp in revocation_data.ocsp() {
//!     println!("consulted OCSP at {:?}: {} bytes", ocsp.uri(), ocsp.encoded().len());
//! }
//! # }
//! ```

/// An OCSP response consulted during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcspRevocationData {
    encoded: Vec<u8>,
    uri: Option<String>,
}

impl OcspRevocationData {
    /// Record an OCSP response as returned by the repository.
    ///
    /// `uri` is the responder URI the response was resolved from, when one
    /// was known; repositories may resolve responses without an explicit URI.
    pub fn new(encoded: Vec<u8>, uri: Option<String>) -> Self {
        Self { encoded, uri }
    }

    /// The DER-encoded OCSP response, byte-identical to the repository output.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// The responder URI, if one was known.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

/// A CRL consulted during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrlRevocationData {
    encoded: Vec<u8>,
    uri: String,
}

impl CrlRevocationData {
    /// Record a CRL as returned by the repository.
    pub fn new(encoded: Vec<u8>, uri: impl Into<String>) -> Self {
        Self {
            encoded,
            uri: uri.into(),
        }
    }

    /// The DER-encoded CRL, byte-identical to the repository output.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// The distribution point URI the CRL was fetched from.
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Accumulator for revocation evidence attached to a validation.
///
/// Owned by the caller; the validator and its linkers only ever append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevocationData {
    ocsp: Vec<OcspRevocationData>,
    crl: Vec<CrlRevocationData>,
}

impl RevocationData {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an OCSP response.
    pub fn add_ocsp(&mut self, data: OcspRevocationData) {
        self.ocsp.push(data);
    }

    /// Attach a CRL.
    pub fn add_crl(&mut self, data: CrlRevocationData) {
        self.crl.push(data);
    }

    /// OCSP responses consulted so far, in consultation order.
    pub fn ocsp(&self) -> &[OcspRevocationData] {
        &self.ocsp
    }

    /// CRLs consulted so far, in consultation order.
    pub fn crl(&self) -> &[CrlRevocationData] {
        &self.crl
    }

    /// Returns true if no evidence has been attached.
    pub fn is_empty(&self) -> bool {
        self.ocsp.is_empty() && self.crl.is_empty()
    }
}
