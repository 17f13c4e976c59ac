//! Error types for trust validation.
//!
//! All failures raised by the validator and its trust linkers are expressed
//! as a single structured [`TrustError`] carrying a [`TrustReason`]. Benign
//! ambiguity inside a linker (missing response, unverifiable signature, stale
//! freshness window) is never an error; it surfaces as
//! [`LinkStatus::Undecided`](crate::linker::LinkStatus::Undecided) instead.

use std::fmt;

use thiserror::Error;

/// Result type alias using [`TrustError`].
pub type Result<T> = std::result::Result<T, TrustError>;

/// Reason attached to a [`TrustError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustReason {
    /// Signature verification failed.
    InvalidSignature,

    /// The validation date lies outside a certificate's validity interval.
    InvalidValidityInterval,

    /// The certificate has been revoked per OCSP or CRL.
    InvalidRevocationStatus,

    /// The OCSP server could not be reached.
    OcspUnavailable,

    /// No trust linker could positively establish trust.
    NoTrust,

    /// The top of the chain is not a trust anchor.
    RootNotTrusted,

    /// Algorithm policy, BasicConstraints, KeyUsage or EKU violation.
    ConstraintViolation,
}

impl TrustReason {
    /// Stable name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "invalid signature",
            Self::InvalidValidityInterval => "invalid validity interval",
            Self::InvalidRevocationStatus => "invalid revocation status",
            Self::OcspUnavailable => "OCSP unavailable",
            Self::NoTrust => "no trust",
            Self::RootNotTrusted => "root not trusted",
            Self::ConstraintViolation => "constraint violation",
        }
    }
}

impl fmt::Display for TrustReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised when a certificate chain cannot be trusted.
#[derive(Debug, Error)]
#[error("{reason}: {message}")]
pub struct TrustError {
    reason: TrustReason,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TrustError {
    /// Create a new error with the given reason and message.
    pub fn new(reason: TrustReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error wrapping an underlying cause.
    pub fn with_source(
        reason: TrustReason,
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            reason,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The reason this chain was rejected.
    pub fn reason(&self) -> TrustReason {
        self.reason
    }

    /// Human-readable detail message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::InvalidSignature, msg)
    }

    /// Create an invalid-validity-interval error.
    pub fn invalid_validity_interval(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::InvalidValidityInterval, msg)
    }

    /// Create an invalid-revocation-status error.
    pub fn invalid_revocation_status(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::InvalidRevocationStatus, msg)
    }

    /// Create an OCSP-unavailable error.
    pub fn ocsp_unavailable(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::OcspUnavailable, msg)
    }

    /// Create a no-trust error.
    pub fn no_trust(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::NoTrust, msg)
    }

    /// Create a root-not-trusted error.
    pub fn root_not_trusted(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::RootNotTrusted, msg)
    }

    /// Create a constraint-violation error.
    pub fn constraint_violation(msg: impl Into<String>) -> Self {
        Self::new(TrustReason::ConstraintViolation, msg)
    }

    /// Returns true if the chain was rejected because of revocation.
    pub fn is_revoked(&self) -> bool {
        matches!(self.reason, TrustReason::InvalidRevocationStatus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrustError::invalid_revocation_status("certificate revoked by OCSP");
        assert_eq!(
            err.to_string(),
            "invalid revocation status: certificate revoked by OCSP"
        );

        let err = TrustError::root_not_trusted("root CN=Test not in repository");
        assert!(err.to_string().starts_with("root not trusted:"));
    }

    #[test]
    fn test_reason_accessor() {
        let err = TrustError::no_trust("no linker decided");
        assert_eq!(err.reason(), TrustReason::NoTrust);
        assert_eq!(err.message(), "no linker decided");
    }

    #[test]
    fn test_is_revoked() {
        assert!(TrustError::invalid_revocation_status("revoked").is_revoked());
        assert!(!TrustError::no_trust("undecided").is_revoked());
    }

    #[test]
    fn test_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "connection refused");
        let err = TrustError::with_source(TrustReason::OcspUnavailable, "OCSP server down", io);
        assert_eq!(err.reason(), TrustReason::OcspUnavailable);
        assert!(std::error::Error::source(&err).is_some());
    }
}
