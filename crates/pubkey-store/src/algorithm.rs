//! Signing algorithm inference for records that omit `alg`.
//!
//! Legacy records predate the explicit-algorithm convention. The signing
//! family is implied by the key shape, so inference is only performed for
//! the pairings below; anything else yields `None` and the record is
//! dropped rather than assigned a guessed algorithm.
//!
//! | `kty` | `crv`   | inferred `alg` |
//! |-------|---------|----------------|
//! | RSA   | -       | RS256          |
//! | EC    | P-256   | ES256          |
//! | EC    | P-384   | ES384          |
//! | EC    | P-521   | ES512          |

use crate::descriptor::KeyType;

/// Key use assigned when a record does not declare one.
pub const DEFAULT_KEY_USE: &str = "sig";

/// Algorithm assigned to RSA records without `alg`.
pub const LEGACY_RSA_ALGORITHM: &str = "RS256";

/// EC curves for which an algorithm can be inferred, with their algorithm.
pub const SUPPORTED_CURVES: &[(&str, &str)] =
    &[("P-256", "ES256"), ("P-384", "ES384"), ("P-521", "ES512")];

/// Infers the signing algorithm from the key family and, for EC keys, the curve.
///
/// # Examples
///
/// ```
/// use pubkey_store::{KeyType, algorithm::infer_algorithm};
///
/// assert_eq!(infer_algorithm(KeyType::Rsa, None), Some("RS256"));
/// assert_eq!(infer_algorithm(KeyType::Ec, Some("P-384")), Some("ES384"));
/// assert_eq!(infer_algorithm(KeyType::Ec, Some("secp256k1")), None);
/// ```
#[must_use]
pub fn infer_algorithm(kty: KeyType, crv: Option<&str>) -> Option<&'static str> {
    match kty {
        KeyType::Rsa => Some(LEGACY_RSA_ALGORITHM),
        KeyType::Ec => {
            let crv = crv?;
            SUPPORTED_CURVES.iter().find(|(curve, _)| *curve == crv).map(|(_, alg)| *alg)
        },
    }
}
