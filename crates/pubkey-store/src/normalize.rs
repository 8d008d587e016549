//! Normalization of raw key records into [`KeyDescriptor`]s.
//!
//! # Pipeline
//!
//! ```text
//! payload ──► array? ──no──► []
//!               │
//!               ▼ for each element, in order
//!         string? ──no──► reject (NotAString)
//!               │
//!               ▼
//!         deserialize ──err──► reject (Malformed)
//!               │
//!               ▼
//!         kty: declared, or RSA when n + e present
//!         use: declared, or "sig"
//!         alg: declared, or inferred from kty/crv
//!         exp: copied only when declared
//!               │
//!               ▼
//!         KeyDescriptor
//! ```
//!
//! A rejected record never affects the others, and surviving descriptors keep
//! the order of their source records. Rejections are not errors of the lookup
//! API; they are visible only through [`normalize_with_report`].

use serde::Deserialize;
use thiserror::Error;

use crate::{
    algorithm::{DEFAULT_KEY_USE, infer_algorithm},
    descriptor::{KeyDescriptor, KeyId, KeyParams, KeyType},
    fetcher::RawKeyRecords,
};

/// Why a single record was dropped during normalization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RejectReason {
    /// The payload element was not a string.
    #[error("record is not a serialized string")]
    NotAString,

    /// The record could not be deserialized.
    #[error("record could not be deserialized: {0}")]
    Malformed(#[source] serde_json::Error),

    /// No `kty` was declared and the shape does not match a legacy RSA record.
    #[error("key type is missing and cannot be inferred")]
    MissingKeyType,

    /// A `kty` other than `RSA` or `EC` was declared.
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// A field required for the key type is absent.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No `alg` was declared and none can be inferred safely.
    #[error("cannot infer algorithm for kty={kty} crv={}", .crv.as_deref().unwrap_or("-"))]
    UnknownAlgorithm {
        /// Key family of the record.
        kty: KeyType,
        /// Curve of the record, if any.
        crv: Option<String>,
    },
}

/// A record dropped during normalization.
#[derive(Debug)]
pub struct RejectedRecord {
    /// Position of the record in the fetcher payload.
    pub index: usize,
    /// Why it was dropped.
    pub reason: RejectReason,
}

/// Outcome of a normalization pass.
#[derive(Debug, Default)]
pub struct NormalizeReport {
    /// Descriptors for every record that normalized, in payload order.
    pub descriptors: Vec<KeyDescriptor>,
    /// Records that were dropped, in payload order.
    pub rejected: Vec<RejectedRecord>,
    /// `true` if the payload was not an array and was treated as empty.
    pub malformed_collection: bool,
}

/// Record as stored by a backing store, in either the current or legacy shape.
///
/// Unknown fields (e.g. the legacy `pem`) are ignored.
#[derive(Debug, Deserialize)]
struct RawKeyRecord {
    kid: Option<KeyId>,
    kty: Option<String>,
    #[serde(rename = "use")]
    key_use: Option<String>,
    alg: Option<String>,
    exp: Option<serde_json::Number>,
    n: Option<String>,
    e: Option<String>,
    crv: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

impl RawKeyRecord {
    fn into_descriptor(self) -> Result<KeyDescriptor, RejectReason> {
        let kid = self.kid.ok_or(RejectReason::MissingField("kid"))?;

        let kty = match non_empty(self.kty) {
            Some(kty) => KeyType::parse(&kty).ok_or(RejectReason::UnsupportedKeyType(kty))?,
            // Legacy records carry RSA material without declaring it.
            None if self.n.is_some() && self.e.is_some() => KeyType::Rsa,
            None => return Err(RejectReason::MissingKeyType),
        };

        let params = match kty {
            KeyType::Rsa => KeyParams::Rsa { n: required(self.n, "n")?, e: required(self.e, "e")? },
            KeyType::Ec => KeyParams::Ec {
                crv: required(self.crv, "crv")?,
                x: required(self.x, "x")?,
                y: required(self.y, "y")?,
            },
        };

        let alg = match non_empty(self.alg) {
            Some(alg) => alg,
            None => infer_algorithm(kty, params.curve())
                .ok_or_else(|| RejectReason::UnknownAlgorithm {
                    kty,
                    crv: params.curve().map(str::to_owned),
                })?
                .to_owned(),
        };

        Ok(KeyDescriptor {
            kid,
            key_use: non_empty(self.key_use).unwrap_or_else(|| DEFAULT_KEY_USE.to_owned()),
            alg,
            exp: self.exp,
            params,
        })
    }
}

/// Treats an empty string the same as an absent field.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RejectReason> {
    value.ok_or(RejectReason::MissingField(field))
}

/// Normalizes a single serialized record.
///
/// # Errors
///
/// Returns the [`RejectReason`] when the record cannot be turned into a
/// descriptor.
///
/// # Examples
///
/// ```
/// use pubkey_store::normalize::normalize_record;
///
/// let legacy = r#"{"n":"some-n","e":"AQAB","kid":"456","pem":"-----BEGIN..."}"#;
/// let descriptor = normalize_record(legacy).unwrap();
/// assert_eq!(descriptor.alg, "RS256");
/// assert_eq!(descriptor.key_use, "sig");
/// assert!(descriptor.exp.is_none());
/// ```
pub fn normalize_record(raw: &str) -> Result<KeyDescriptor, RejectReason> {
    let record: RawKeyRecord = serde_json::from_str(raw).map_err(RejectReason::Malformed)?;
    record.into_descriptor()
}

/// Normalizes a fetcher payload, keeping track of every dropped record.
pub fn normalize_with_report(records: &RawKeyRecords) -> NormalizeReport {
    let Some(items) = records.as_array() else {
        tracing::debug!("key payload is not an array; treating as empty");
        return NormalizeReport { malformed_collection: true, ..NormalizeReport::default() };
    };

    let mut report = NormalizeReport {
        descriptors: Vec::with_capacity(items.len()),
        ..NormalizeReport::default()
    };

    for (index, item) in items.iter().enumerate() {
        let outcome = match item.as_str() {
            Some(raw) => normalize_record(raw),
            None => Err(RejectReason::NotAString),
        };
        match outcome {
            Ok(descriptor) => report.descriptors.push(descriptor),
            Err(reason) => {
                tracing::trace!(index, reason = %reason, "dropping key record");
                report.rejected.push(RejectedRecord { index, reason });
            },
        }
    }

    tracing::debug!(
        accepted = report.descriptors.len(),
        rejected = report.rejected.len(),
        "normalized key records"
    );

    report
}

/// Normalizes a fetcher payload into descriptors, silently dropping bad records.
///
/// A payload that is not an array yields an empty list.
#[must_use]
pub fn normalize(records: &RawKeyRecords) -> Vec<KeyDescriptor> {
    normalize_with_report(records).descriptors
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::fetcher::raw_key_records;

    fn to_json(descriptors: &[KeyDescriptor]) -> serde_json::Value {
        serde_json::to_value(descriptors).unwrap()
    }

    #[test]
    fn test_mixed_current_and_legacy_records() {
        let records = raw_key_records([
            json!({
                "n": "some-n-1", "e": "some-e-1", "kid": "123", "kty": "RSA",
                "use": "sig", "exp": 123, "alg": "RS256"
            })
            .to_string(),
            json!({ "n": "some-n-2", "e": "some-e-2", "kid": "456", "pem": "some-pem-2" })
                .to_string(),
            json!({
                "x": "some-x-1", "y": "some-y-1", "kid": "789", "kty": "EC",
                "crv": "P-384", "use": "sig", "exp": 456, "alg": "ES384"
            })
            .to_string(),
        ]);

        assert_eq!(
            to_json(&normalize(&records)),
            json!([
                {
                    "n": "some-n-1", "e": "some-e-1", "use": "sig", "kty": "RSA",
                    "kid": "123", "exp": 123, "alg": "RS256"
                },
                {
                    // exp cannot be inferred for legacy records
                    "n": "some-n-2", "e": "some-e-2", "use": "sig", "kty": "RSA",
                    "kid": "456", "alg": "RS256"
                },
                {
                    "x": "some-x-1", "y": "some-y-1", "kid": "789", "use": "sig",
                    "kty": "EC", "crv": "P-384", "exp": 456, "alg": "ES384"
                }
            ])
        );
    }

    #[test]
    fn test_non_array_payload_is_empty() {
        for payload in [json!("foo"), json!({"keys": []}), json!(42), json!(null)] {
            let report = normalize_with_report(&payload);
            assert!(report.descriptors.is_empty());
            assert!(report.rejected.is_empty());
            assert!(report.malformed_collection, "payload {payload} should be malformed");
        }
    }

    #[test]
    fn test_empty_array_is_not_malformed() {
        let report = normalize_with_report(&json!([]));
        assert!(report.descriptors.is_empty());
        assert!(!report.malformed_collection);
    }

    #[test]
    fn test_ec_algorithm_inferred_from_curve() {
        for (crv, alg) in [("P-256", "ES256"), ("P-384", "ES384"), ("P-521", "ES512")] {
            let raw = json!({ "kid": "ec", "kty": "EC", "crv": crv, "x": "x", "y": "y" });
            let descriptor = normalize_record(&raw.to_string()).unwrap();
            assert_eq!(descriptor.alg, alg);
            assert_eq!(descriptor.key_use, "sig");
        }
    }

    #[test]
    fn test_explicit_alg_never_overwritten() {
        let raw = json!({ "kid": "ec", "kty": "EC", "crv": "P-384", "x": "x", "y": "y", "alg": "ES256" });
        assert_eq!(normalize_record(&raw.to_string()).unwrap().alg, "ES256");

        let raw = json!({ "kid": "rsa", "n": "n", "e": "e", "alg": "PS512" });
        assert_eq!(normalize_record(&raw.to_string()).unwrap().alg, "PS512");
    }

    #[test]
    fn test_explicit_alg_kept_for_unknown_curve() {
        let raw = json!({ "kid": "k", "kty": "EC", "crv": "secp256k1", "x": "x", "y": "y", "alg": "ES256K" });
        let descriptor = normalize_record(&raw.to_string()).unwrap();
        assert_eq!(descriptor.alg, "ES256K");
    }

    #[test]
    fn test_unknown_curve_without_alg_is_rejected() {
        let raw = json!({ "kid": "k", "kty": "EC", "crv": "secp256k1", "x": "x", "y": "y" });
        let err = normalize_record(&raw.to_string()).unwrap_err();
        assert!(matches!(
            err,
            RejectReason::UnknownAlgorithm { kty: KeyType::Ec, crv: Some(ref crv) } if crv == "secp256k1"
        ));
    }

    #[test]
    fn test_declared_use_retained() {
        let raw = json!({ "kid": "k", "n": "n", "e": "e", "use": "enc" });
        assert_eq!(normalize_record(&raw.to_string()).unwrap().key_use, "enc");
    }

    #[test]
    fn test_empty_strings_treated_as_absent() {
        let raw = json!({ "kid": "k", "kty": "", "use": "", "alg": "", "n": "n", "e": "e" });
        let descriptor = normalize_record(&raw.to_string()).unwrap();
        assert_eq!(descriptor.kty(), KeyType::Rsa);
        assert_eq!(descriptor.key_use, "sig");
        assert_eq!(descriptor.alg, "RS256");
    }

    #[test]
    fn test_null_fields_treated_as_absent() {
        let raw = json!({ "kid": 5, "n": "n", "e": "e", "alg": null, "exp": null });
        let descriptor = normalize_record(&raw.to_string()).unwrap();
        assert_eq!(descriptor.kid, KeyId::from(5));
        assert_eq!(descriptor.alg, "RS256");
        assert!(descriptor.exp.is_none());
    }

    #[test]
    fn test_incomplete_legacy_shapes_rejected() {
        // EC material without kty is not a supported legacy family.
        let raw = json!({ "kid": "k", "crv": "P-256", "x": "x", "y": "y" });
        assert!(matches!(normalize_record(&raw.to_string()), Err(RejectReason::MissingKeyType)));

        // n without e.
        let raw = json!({ "kid": "k", "n": "n", "pem": "p" });
        assert!(matches!(normalize_record(&raw.to_string()), Err(RejectReason::MissingKeyType)));
    }

    #[test]
    fn test_missing_structural_fields_rejected() {
        let raw = json!({ "n": "n", "e": "e" });
        assert!(matches!(normalize_record(&raw.to_string()), Err(RejectReason::MissingField("kid"))));

        let raw = json!({ "kid": "k", "kty": "RSA", "n": "n" });
        assert!(matches!(normalize_record(&raw.to_string()), Err(RejectReason::MissingField("e"))));

        let raw = json!({ "kid": "k", "kty": "EC", "x": "x", "y": "y", "alg": "ES256" });
        assert!(matches!(normalize_record(&raw.to_string()), Err(RejectReason::MissingField("crv"))));
    }

    #[test]
    fn test_unsupported_key_type_rejected() {
        let raw = json!({ "kid": "k", "kty": "OKP", "crv": "Ed25519", "x": "x", "alg": "EdDSA" });
        assert!(matches!(
            normalize_record(&raw.to_string()),
            Err(RejectReason::UnsupportedKeyType(ref kty)) if kty == "OKP"
        ));
    }

    #[test]
    fn test_malformed_records_dropped_in_place() {
        let valid_a = json!({ "kid": "a", "n": "n", "e": "e" }).to_string();
        let valid_b = json!({ "kid": "b", "kty": "EC", "crv": "P-256", "x": "x", "y": "y" }).to_string();
        let payload = json!([valid_a, "{not json", 17, valid_b, "[1,2,3]", { "kid": "inline" }]);

        let report = normalize_with_report(&payload);

        let kids: Vec<_> = report.descriptors.iter().map(|d| d.kid.to_string()).collect();
        assert_eq!(kids, ["a", "b"]);

        let rejected: Vec<_> = report.rejected.iter().map(|r| r.index).collect();
        assert_eq!(rejected, [1, 2, 4, 5]);
        assert!(matches!(report.rejected[0].reason, RejectReason::Malformed(_)));
        assert!(matches!(report.rejected[1].reason, RejectReason::NotAString));
        assert!(matches!(report.rejected[2].reason, RejectReason::Malformed(_)));
        assert!(matches!(report.rejected[3].reason, RejectReason::NotAString));
    }

    #[test]
    fn test_fractional_exp_copied_unchanged() {
        let record = json!({
            "kid": "k", "kty": "RSA", "use": "sig", "alg": "RS256",
            "n": "n", "e": "AQAB", "exp": 1_700_000_000.5
        });
        let report = normalize_with_report(&json!([record.to_string()]));

        assert!(report.rejected.is_empty());
        assert_eq!(to_json(&report.descriptors), json!([record]));
        assert_eq!(report.descriptors[0].expires_at().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_float_kid_matches_integer_kid() {
        let descriptors = normalize(&json!([r#"{"kid":456.0,"n":"n","e":"AQAB"}"#]));
        assert_eq!(descriptors[0].kid, KeyId::from(456));
    }

    #[test]
    fn test_reject_reason_display() {
        let err = RejectReason::UnknownAlgorithm { kty: KeyType::Ec, crv: None };
        assert_eq!(err.to_string(), "cannot infer algorithm for kty=EC crv=-");
        assert_eq!(RejectReason::MissingField("kid").to_string(), "missing required field: kid");
    }
}
