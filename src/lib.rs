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

//! # x509-trust
//!
//! X.509 certificate chain validation built around a pluggable
//! trust-linking pipeline.
//!
//! A [`TrustValidator`] walks an ordered certificate chain (end-entity
//! first, root last) and, for every adjacent (child, issuer) pair, consults
//! a sequence of trust linkers: the mandatory [`PublicKeyTrustLinker`]
//! (names, signature, validity window, CA constraints, algorithm policy),
//! then the configured revocation linkers ([`OcspTrustLinker`],
//! [`CrlTrustLinker`]) until one of them positively establishes trust. The
//! chain's top must be present in a [`CertificateRepository`] of trust
//! anchors.
//!
//! ## Features
//!
//! - **Pluggable linkers**: any [`TrustLinker`] implementation can join the
//!   pipeline; verdicts are `Trusted`, `Undecided`, or a structured failure
//! - **OCSP with delegated responders** (RFC 6960): responder authorization,
//!   CertID matching, freshness windows
//! - **CRL fallback** (RFC 5280) when OCSP stays undecided
//! - **Algorithm policy**: date-gated rejection of weak signature algorithms
//! - **Revocation evidence**: every consulted response and CRL is handed back
//!   to the caller byte-for-byte in [`RevocationData`]
//!
//! The validator performs no network I/O of its own; OCSP responses and CRLs
//! come from caller-supplied [`OcspRepository`] / [`CrlRepository`]
//! implementations, which may block or consult caches as they see fit.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use x509_trust::{
//!     MemoryCertificateRepository, TrustValidator, TrustValidatorDecorator,
//! };
//! # fn repositories() -> (Arc<dyn x509_trust::OcspRepository>, Arc<dyn x509_trust::CrlRepository>) { unimplemented!() }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let (ocsp_repository, crl_repository) = repositories();
//! # let (root, chain): (x509_trust::Certificate, Vec<x509_trust::Certificate>) = unimplemented!();
//! // Trust anchors
//! let mut anchors = MemoryCertificateRepository::new();
//! anchors.add_trust_point(&root)?;
//!
//! // Validator with the default OCSP-then-CRL linker configuration
//! let mut validator = TrustValidator::new(Arc::new(anchors));
//! TrustValidatorDecorator::new(ocsp_repository, crl_repository)
//!     .add_default_trust_linker_config(&mut validator);
//!
//! // Succeeds silently, or fails with a TrustError carrying the reason
//! validator.is_trusted(&chain)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure semantics
//!
//! Inside a linker, benign ambiguity (a missing response, an unverifiable
//! signature, a stale freshness window, an absent extension) yields an
//! undecided verdict and the next linker is consulted. Only definitive
//! findings fail a validation: a revoked certificate, a broken chain
//! signature, a policy violation, an unreachable OCSP responder. When every
//! configured revocation linker stays undecided on a pair, the validator
//! refuses to trust the chain ([`TrustReason::NoTrust`]).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod certext;
pub mod error;
pub mod linker;
pub mod policy;
pub mod repository;
pub mod revocation;
pub mod validator;
mod verify;

// Re-export main types at crate root for convenience
pub use error::{Result, TrustError, TrustReason};
pub use linker::{CrlTrustLinker, LinkStatus, OcspTrustLinker, PublicKeyTrustLinker, TrustLinker};
pub use policy::{AlgorithmPolicy, DefaultAlgorithmPolicy};
pub use repository::{
    CertificateRepository, CrlRepository, MemoryCertificateRepository, OcspRepository,
    ServerNotAvailable,
};
pub use revocation::{CrlRevocationData, OcspRevocationData, RevocationData};
pub use validator::{TrustValidator, TrustValidatorDecorator};

// Re-export x509_cert::Certificate for convenience
pub use x509_cert::Certificate;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
