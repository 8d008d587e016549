//! Canonical key descriptor types.
//!
//! A [`KeyDescriptor`] is the single shape every raw key record is normalized
//! into. It serializes to a flat JWK-style object:
//!
//! ```text
//! RSA: { "kid", "kty": "RSA", "use", "alg", "n", "e", ["exp"] }
//! EC:  { "kid", "kty": "EC",  "use", "alg", "crv", "x", "y", ["exp"] }
//! ```
//!
//! `exp` is omitted entirely when the source record did not carry it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key identifier (`kid`).
///
/// Backing stores use both string and numeric identifiers, so both are
/// representable. Comparison is strict across kinds: `KeyId::from("456")` is
/// not equal to `KeyId::from(456)`. Numeric IDs compare by value, so a stored
/// `456.0` matches a requested `456`.
///
/// # Examples
///
/// ```
/// use pubkey_store::KeyId;
///
/// assert_eq!(KeyId::from(456), KeyId::from(456u64));
/// assert_ne!(KeyId::from("456"), KeyId::from(456));
/// assert_eq!(KeyId::from("key-1").to_string(), "key-1");
///
/// let float: KeyId = serde_json::from_str("456.0").unwrap();
/// assert_eq!(float, KeyId::from(456));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyId {
    /// String key ID, e.g. `"key-2024-001"`.
    Text(String),
    /// Numeric key ID, e.g. `123`.
    Number(serde_json::Number),
}

impl KeyId {
    /// Returns the string form if this is a string key ID.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(kid) => Some(kid),
            Self::Number(_) => None,
        }
    }
}

impl PartialEq for KeyId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            _ => false,
        }
    }
}

impl Eq for KeyId {}

/// Integers compare exactly; anything involving a float compares as `f64`.
fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    if (a.is_i64() || a.is_u64()) && (b.is_i64() || b.is_u64()) {
        // One negative, one above i64::MAX.
        return false;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(kid) => f.write_str(kid),
            Self::Number(kid) => write!(f, "{kid}"),
        }
    }
}

impl From<&str> for KeyId {
    fn from(kid: &str) -> Self {
        Self::Text(kid.to_owned())
    }
}

impl From<String> for KeyId {
    fn from(kid: String) -> Self {
        Self::Text(kid)
    }
}

impl From<i64> for KeyId {
    fn from(kid: i64) -> Self {
        Self::Number(kid.into())
    }
}

impl From<i32> for KeyId {
    fn from(kid: i32) -> Self {
        Self::Number(i64::from(kid).into())
    }
}

impl From<u64> for KeyId {
    fn from(kid: u64) -> Self {
        Self::Number(kid.into())
    }
}

/// Key family (`kty`) of a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// RSA public key (`n`, `e`).
    Rsa,
    /// Elliptic-curve public key (`crv`, `x`, `y`).
    Ec,
}

impl KeyType {
    /// Parses a JWK `kty` value. Only `"RSA"` and `"EC"` are recognized.
    #[must_use]
    pub fn parse(kty: &str) -> Option<Self> {
        match kty {
            "RSA" => Some(Self::Rsa),
            "EC" => Some(Self::Ec),
            _ => None,
        }
    }

    /// Returns the JWK `kty` value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific key material, tagged by `kty` when serialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kty")]
pub enum KeyParams {
    /// RSA modulus and exponent (base64url, as supplied).
    #[serde(rename = "RSA")]
    Rsa {
        /// Modulus.
        n: String,
        /// Public exponent.
        e: String,
    },
    /// EC curve and point coordinates (base64url, as supplied).
    #[serde(rename = "EC")]
    Ec {
        /// Curve name, e.g. `P-256`.
        crv: String,
        /// X coordinate.
        x: String,
        /// Y coordinate.
        y: String,
    },
}

impl KeyParams {
    /// Returns the key family of this material.
    #[must_use]
    pub fn kty(&self) -> KeyType {
        match self {
            Self::Rsa { .. } => KeyType::Rsa,
            Self::Ec { .. } => KeyType::Ec,
        }
    }

    /// Returns the curve name for EC keys.
    #[must_use]
    pub fn curve(&self) -> Option<&str> {
        match self {
            Self::Rsa { .. } => None,
            Self::Ec { crv, .. } => Some(crv),
        }
    }
}

/// Canonical public key descriptor.
///
/// Every descriptor produced by the normalizer has `kid`, `kty`, `use` and
/// `alg` populated; none of them is optional in this type. `exp` is only
/// present when the source record carried an expiry.
///
/// Descriptors are plain values recomputed on every lookup. Nothing in this
/// crate mutates a descriptor after normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Key ID.
    pub kid: KeyId,

    /// Intended key use (`use`), `"sig"` unless the record said otherwise.
    #[serde(rename = "use")]
    pub key_use: String,

    /// Signing algorithm, e.g. `RS256` or `ES384`.
    pub alg: String,

    /// Expiry as seconds since the Unix epoch, when known.
    ///
    /// Kept as the JSON number the record carried, integer or fractional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<serde_json::Number>,

    /// Key family and material.
    #[serde(flatten)]
    pub params: KeyParams,
}

impl KeyDescriptor {
    /// Returns the key family.
    #[must_use]
    pub fn kty(&self) -> KeyType {
        self.params.kty()
    }

    /// Returns the expiry as a timestamp, if the descriptor carries one.
    ///
    /// Integer and fractional `exp` values are both accepted; a fraction
    /// becomes sub-second precision. Returns `None` when `exp` is absent or
    /// outside chrono's range.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.exp.as_ref()?;
        if let Some(secs) = exp.as_i64() {
            return DateTime::from_timestamp(secs, 0);
        }
        let secs = exp.as_f64()?;
        if !secs.is_finite() || secs.abs() >= i64::MAX as f64 {
            return None;
        }
        let whole = secs.floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
        #[allow(clippy::cast_possible_truncation)]
        DateTime::from_timestamp(whole as i64, nanos)
    }

    /// Returns `true` if the descriptor carries an expiry at or before `now`.
    ///
    /// Descriptors without `exp` never report as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }
}
