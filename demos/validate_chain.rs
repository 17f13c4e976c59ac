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

//! Certificate Chain Validation Example
//!
//! Validates a PEM certificate chain against a trust anchor, without
//! revocation checking (no OCSP/CRL repositories are wired in).
//!
//! # Usage
//!
//! ```bash
//! cargo run --example validate_chain -- <anchor.pem> <leaf.pem> [<intermediate.pem> ...]
//! ```
//!
//! The chain is given end-entity first; the anchor is appended automatically
//! when the chain does not already end in it.

use std::sync::Arc;

use der::DecodePem;
use x509_trust::{Certificate, MemoryCertificateRepository, TrustValidator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(anchor_path) = args.next() else {
        eprintln!("usage: validate_chain <anchor.pem> <leaf.pem> [<intermediate.pem> ...]");
        std::process::exit(2);
    };

    let anchor = load_certificate(&anchor_path)?;
    let mut chain = Vec::new();
    for path in args {
        chain.push(load_certificate(&path)?);
    }
    if chain.is_empty() {
        eprintln!("usage: validate_chain <anchor.pem> <leaf.pem> [<intermediate.pem> ...]");
        std::process::exit(2);
    }
    if chain.last() != Some(&anchor) {
        chain.push(anchor.clone());
    }

    let mut anchors = MemoryCertificateRepository::new();
    anchors.add_trust_point(&anchor)?;
    let validator = TrustValidator::new(Arc::new(anchors));

    match validator.is_trusted(&chain) {
        Ok(()) => {
            println!("chain is trusted");
            Ok(())
        }
        Err(e) => {
            println!("chain is NOT trusted: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_certificate(path: &str) -> Result<Certificate, Box<dyn std::error::Error>> {
    let pem = std::fs::read(path)?;
    Ok(Certificate::from_pem(&pem)?)
}
