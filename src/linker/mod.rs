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

//! Trust linkers.
//!
//! A trust linker evaluates one aspect of the relationship between a child
//! certificate and its alleged issuer at a given validation date. Each linker
//! answers with one of three outcomes:
//!
//! - `Ok(LinkStatus::Trusted)`: the aspect is positively established;
//! - `Ok(LinkStatus::Undecided)`: the linker has nothing conclusive to say
//!   (missing data, unverifiable response, stale window) and the next linker
//!   should be consulted;
//! - `Err(TrustError)`: a definitive problem (revoked certificate, broken
//!   signature, policy violation) that aborts the validation.
//!
//! The [`TrustValidator`](crate::TrustValidator) runs the
//! [`PublicKeyTrustLinker`] on every adjacent pair first, then the configured
//! revocation linkers in order until one decides.

use std::time::SystemTime;

use x509_cert::Certificate;

use crate::error::Result;
use crate::policy::AlgorithmPolicy;
use crate::revocation::RevocationData;

pub mod crl;
pub mod ocsp;
pub mod public_key;

pub use crl::CrlTrustLinker;
pub use ocsp::OcspTrustLinker;
pub use public_key::PublicKeyTrustLinker;

/// Positive outcome of a trust linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// The linker positively established its aspect of the trust link.
    Trusted,

    /// The linker could not decide; the next linker should be consulted.
    Undecided,
}

impl LinkStatus {
    /// Returns true for [`LinkStatus::Trusted`].
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Trusted)
    }

    /// Returns true for [`LinkStatus::Undecided`].
    pub fn is_undecided(&self) -> bool {
        matches!(self, Self::Undecided)
    }
}

/// A pluggable predicate over one (child, issuer) certificate pair.
///
/// Linkers are stateless with respect to a validation call: configuration is
/// immutable after construction, and a single linker instance may be invoked
/// concurrently from multiple validations.
pub trait TrustLinker: Send + Sync {
    /// Evaluate the trust link between `child` and `issuer` at
    /// `validation_date`.
    ///
    /// Evidence from successfully consulted revocation sources is appended to
    /// `revocation_data`; linkers that return [`LinkStatus::Undecided`]
    /// because a source was absent must not attach anything.
    fn has_trust_link(
        &self,
        child: &Certificate,
        issuer: &Certificate,
        validation_date: SystemTime,
        revocation_data: &mut RevocationData,
        algorithm_policy: &dyn AlgorithmPolicy,
    ) -> Result<LinkStatus>;
}
