//! Shared test utilities for key lookup testing.
//!
//! Builders for descriptors and serialized raw records in both the current
//! and legacy shapes, plus [`StaticKeyLookup`], a [`PublicKeyLookup`] that
//! serves a fixed descriptor list without any fetcher. It is feature-gated
//! behind `testutil` to prevent leaking into production builds.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! pubkey-store = { path = "../pubkey-store", features = ["testutil"] }
//! ```
//!
//! ```no_run
//! // Requires the `testutil` feature to be enabled.
//! use pubkey_store::testutil::{legacy_rsa_record, rsa_descriptor};
//! ```

use async_trait::async_trait;
use serde_json::json;

use crate::{
    descriptor::{KeyDescriptor, KeyId, KeyParams},
    error::Result,
    store::PublicKeyLookup,
};

/// Creates an RSA descriptor with `alg = RS256`, `use = sig` and no expiry.
///
/// The modulus is derived from `kid` so descriptors with different IDs differ
/// in key material too.
#[must_use]
pub fn rsa_descriptor(kid: impl Into<KeyId>) -> KeyDescriptor {
    let kid = kid.into();
    KeyDescriptor {
        params: KeyParams::Rsa { n: format!("some-n-{kid}"), e: "AQAB".into() },
        kid,
        key_use: "sig".into(),
        alg: "RS256".into(),
        exp: None,
    }
}

/// Creates an EC descriptor for `crv` with the given algorithm and no expiry.
#[must_use]
pub fn ec_descriptor(kid: impl Into<KeyId>, crv: &str, alg: &str) -> KeyDescriptor {
    let kid = kid.into();
    KeyDescriptor {
        params: KeyParams::Ec {
            crv: crv.to_owned(),
            x: format!("some-x-{kid}"),
            y: format!("some-y-{kid}"),
        },
        kid,
        key_use: "sig".into(),
        alg: alg.to_owned(),
        exp: None,
    }
}

/// Serializes a legacy-shape record: `n`, `e`, `kid`, `pem`, nothing else.
///
/// Normalizes to [`rsa_descriptor`] with the same `kid`.
#[must_use]
pub fn legacy_rsa_record(kid: &str) -> String {
    json!({
        "n": format!("some-n-{kid}"),
        "e": "AQAB",
        "kid": kid,
        "pem": format!("-----BEGIN PUBLIC KEY-----\n{kid}\n-----END PUBLIC KEY-----"),
    })
    .to_string()
}

/// Serializes a current-shape record from a descriptor.
///
/// # Panics
///
/// Panics if serialization fails (should not happen for descriptors).
#[must_use]
pub fn canonical_record(descriptor: &KeyDescriptor) -> String {
    serde_json::to_string(descriptor).expect("descriptor serialization failed")
}

/// [`PublicKeyLookup`] serving a fixed list, for testing resolution alone.
#[derive(Debug, Clone, Default)]
pub struct StaticKeyLookup {
    keys: Vec<KeyDescriptor>,
}

impl StaticKeyLookup {
    /// Creates a lookup that always returns `keys`.
    #[must_use]
    pub fn new(keys: Vec<KeyDescriptor>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl PublicKeyLookup for StaticKeyLookup {
    async fn lookup_public_keys(&self) -> Result<Vec<KeyDescriptor>> {
        Ok(self.keys.clone())
    }
}
