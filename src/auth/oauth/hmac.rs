//! HMAC validation for Shopify OAuth callbacks.
//!
//! Shopify signs every callback with HMAC-SHA256 keyed by the app's API
//! secret. The signature covers the canonical message built by
//! [`CallbackQuery::to_signable_string`] and arrives hex-encoded in the
//! `hmac` parameter.
//!
//! # Security
//!
//! All HMAC comparisons use constant-time comparison to prevent timing attacks.
//! During key rotation the previous secret is tried after the primary one.
//!
//! # Example
//!
//! ```rust
//! use shopify_gateway::auth::oauth::hmac::compute_signature;
//!
//! let message = "code=abc123&shop=example.myshopify.com&state=xyz";
//! let signature = compute_signature(message, "my-api-secret");
//! assert_eq!(signature.len(), 64);
//! assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::CallbackQuery;
use crate::config::ApiSecretKey;

type HmacSha256 = Hmac<Sha256>;

/// Computes an HMAC-SHA256 signature for `message`, returned as lowercase hex.
///
/// ```rust
/// use shopify_gateway::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64); // SHA256 produces 32 bytes = 64 hex chars
/// ```
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    // HMAC accepts keys of any length, so construction never fails.
    HmacSha256::new_from_slice(secret.as_bytes())
        .map(|mut mac| {
            mac.update(message.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        })
        .unwrap_or_default()
}

/// Performs constant-time comparison of two strings.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    // ConstantTimeEq handles different lengths securely
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Validates the `hmac` parameter of an OAuth callback.
///
/// The signature is checked against `secret` first and then against
/// `old_secret`, if one is configured. Returns `false` when the callback has
/// no `hmac` parameter.
///
/// # Example
///
/// ```rust
/// use shopify_gateway::ApiSecretKey;
/// use shopify_gateway::auth::oauth::{validate_hmac, CallbackQuery};
/// use shopify_gateway::auth::oauth::hmac::compute_signature;
///
/// let secret = ApiSecretKey::new("secret").unwrap();
/// let mut query = CallbackQuery::new([("shop", "test-shop.myshopify.com"), ("code", "abc")]);
/// let hmac = compute_signature(&query.to_signable_string(), "secret");
/// query.insert("hmac", hmac);
///
/// assert!(validate_hmac(&query, &secret, None));
/// ```
#[must_use]
pub fn validate_hmac(
    query: &CallbackQuery,
    secret: &ApiSecretKey,
    old_secret: Option<&ApiSecretKey>,
) -> bool {
    let Some(received_hmac) = query.hmac() else {
        return false;
    };
    let signable = query.to_signable_string();

    std::iter::once(secret)
        .chain(old_secret)
        .any(|key| constant_time_compare(&compute_signature(&signable, key.as_ref()), received_hmac))
}
