//! Shared helpers for the integration suite: fixture loading and in-memory
//! revocation repositories.
//!
//! Fixtures are generated by `tests/fixtures/generate.sh`. Tests derive their
//! validation dates from the timestamps inside the fixtures, never from the
//! wall clock, so the suite keeps passing after regeneration.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use der::{Decode, DecodePem};
use x509_cert::Certificate;
use x509_ocsp::{BasicOcspResponse, OcspResponse};
use x509_trust::{CrlRepository, OcspRepository, ServerNotAvailable};

pub const ROOT_PEM: &[u8] = include_bytes!("../fixtures/certs/root.pem");
pub const INTERMEDIATE_PEM: &[u8] = include_bytes!("../fixtures/certs/intermediate.pem");
pub const LEAF_PEM: &[u8] = include_bytes!("../fixtures/certs/leaf.pem");
pub const LEAF_SHA1_PEM: &[u8] = include_bytes!("../fixtures/certs/leaf-sha1.pem");

pub const OCSP_LEAF_GOOD: &[u8] = include_bytes!("../fixtures/ocsp/leaf-good.der");
pub const OCSP_LEAF_REVOKED: &[u8] = include_bytes!("../fixtures/ocsp/leaf-revoked.der");
pub const OCSP_LEAF_GOOD_DELEGATED: &[u8] =
    include_bytes!("../fixtures/ocsp/leaf-good-delegated.der");
pub const OCSP_LEAF_GOOD_DELEGATED_NOCHECKLESS: &[u8] =
    include_bytes!("../fixtures/ocsp/leaf-good-delegated-nocheckless.der");
pub const OCSP_INTERMEDIATE_GOOD: &[u8] = include_bytes!("../fixtures/ocsp/intermediate-good.der");

pub const CRL_INTERMEDIATE_EMPTY: &[u8] = include_bytes!("../fixtures/crl/intermediate-empty.der");
pub const CRL_INTERMEDIATE_LEAF_REVOKED: &[u8] =
    include_bytes!("../fixtures/crl/intermediate-leaf-revoked.der");
pub const CRL_ROOT_EMPTY: &[u8] = include_bytes!("../fixtures/crl/root-empty.der");

/// OCSP responder URIs as carried in the fixture certificates' AIA.
pub const LEAF_OCSP_URI: &str = "http://ocsp.example.test/intermediate";
pub const INTERMEDIATE_OCSP_URI: &str = "http://ocsp.example.test/root";

/// CRL distribution point URIs as carried in the fixture certificates.
pub const LEAF_CRL_URI: &str = "http://crl.example.test/intermediate.crl";
pub const INTERMEDIATE_CRL_URI: &str = "http://crl.example.test/root.crl";

pub fn cert(pem: &[u8]) -> Certificate {
    Certificate::from_pem(pem).expect("fixture certificate decodes")
}

/// The standard fixture chain: leaf, intermediate, root.
pub fn chain() -> Vec<Certificate> {
    vec![cert(LEAF_PEM), cert(INTERMEDIATE_PEM), cert(ROOT_PEM)]
}

/// thisUpdate of the first entry of an OCSP response fixture.
pub fn ocsp_this_update(encoded: &[u8]) -> SystemTime {
    UNIX_EPOCH + first_entry_window(encoded).0
}

/// nextUpdate of the first entry of an OCSP response fixture.
pub fn ocsp_next_update(encoded: &[u8]) -> SystemTime {
    UNIX_EPOCH + first_entry_window(encoded).1
}

fn first_entry_window(encoded: &[u8]) -> (Duration, Duration) {
    let response = OcspResponse::from_der(encoded).expect("fixture response decodes");
    let basic = BasicOcspResponse::from_der(
        response
            .response_bytes
            .expect("fixture response has bytes")
            .response
            .as_bytes(),
    )
    .expect("fixture basic response decodes");
    let entry = &basic.tbs_response_data.responses[0];
    let this_update = entry.this_update.0.to_unix_duration();
    let next_update = entry
        .next_update
        .map(|next| next.0.to_unix_duration())
        .unwrap_or(this_update);
    (this_update, next_update)
}

/// OCSP repository serving canned responses by responder URI.
#[derive(Default)]
pub struct MapOcspRepository {
    responses: HashMap<String, Vec<u8>>,
    unavailable: bool,
}

impl MapOcspRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, uri: &str, response: &[u8]) -> Self {
        self.responses.insert(uri.to_string(), response.to_vec());
        self
    }

    /// Make every lookup fail as if the responder were down.
    pub fn unavailable() -> Self {
        Self {
            responses: HashMap::new(),
            unavailable: true,
        }
    }
}

impl OcspRepository for MapOcspRepository {
    fn find_ocsp_response(
        &self,
        uri: Option<&str>,
        _child: &Certificate,
        _issuer: &Certificate,
        _validation_date: SystemTime,
    ) -> Result<Option<Vec<u8>>, ServerNotAvailable> {
        if self.unavailable {
            return Err(ServerNotAvailable("responder down".into()));
        }
        Ok(uri.and_then(|uri| self.responses.get(uri)).cloned())
    }
}

/// CRL repository serving canned CRLs by distribution point URI.
#[derive(Default)]
pub struct MapCrlRepository {
    crls: HashMap<String, Vec<u8>>,
}

impl MapCrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, uri: &str, crl: &[u8]) -> Self {
        self.crls.insert(uri.to_string(), crl.to_vec());
        self
    }
}

impl CrlRepository for MapCrlRepository {
    fn find_crl(
        &self,
        uri: &str,
        _issuer: &Certificate,
        _validation_date: SystemTime,
    ) -> Option<Vec<u8>> {
        self.crls.get(uri).cloned()
    }
}
