//! OAuth-specific error types for the install flow.
//!
//! Every step of the authorization-code flow fails with an [`OAuthError`].
//! The HTTP layer maps each variant to a status code; see
//! [`OAuthError::kind`].
//!
//! # Example
//!
//! ```rust
//! use shopify_gateway::auth::oauth::{ErrorKind, OAuthError};
//!
//! let error = OAuthError::InvalidHmac;
//! assert_eq!(error.to_string(), "HMAC signature validation failed");
//! assert_eq!(error.kind(), ErrorKind::BadRequest);
//!
//! let error = OAuthError::StateMismatch {
//!     expected: "shop-a.myshopify.com".to_string(),
//!     received: "shop-b.myshopify.com".to_string(),
//! };
//! assert!(error.to_string().contains("shop-a.myshopify.com"));
//! ```

use crate::error::ConfigError;
use thiserror::Error;

/// Errors that can occur during the OAuth install flow.
///
/// # Thread Safety
///
/// `OAuthError` is `Send + Sync`, making it safe to use across async boundaries.
#[derive(Debug, Error)]
pub enum OAuthError {
    /// The gateway is missing credentials or holds an invalid value.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The callback carried no `hmac` parameter.
    #[error("Missing HMAC parameter")]
    MissingHmac,

    /// HMAC signature validation failed.
    ///
    /// The callback's `hmac` does not match the signature computed with the
    /// API secret key (or the previous key during rotation).
    #[error("HMAC signature validation failed")]
    InvalidHmac,

    /// A required request parameter is missing or empty.
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Name of the missing parameter.
        name: &'static str,
    },

    /// The `shop` parameter is not a valid `*.myshopify.com` domain.
    #[error("Invalid shop parameter: {reason}")]
    InvalidShop {
        /// Why the shop was rejected.
        reason: String,
    },

    /// The callback carried no `state` parameter.
    #[error("Missing state parameter")]
    MissingState,

    /// The `state` does not match any pending install.
    ///
    /// Either it was never issued by this process or it was already used.
    #[error("Unknown or already used state parameter")]
    UnknownState,

    /// The install record for this `state` outlived its TTL.
    #[error("State parameter expired")]
    StateExpired,

    /// The `state` was issued for a different shop.
    #[error("State parameter mismatch: expected '{expected}', received '{received}'")]
    StateMismatch {
        /// The shop the state was issued for.
        expected: String,
        /// The shop named in the callback.
        received: String,
    },

    /// Token exchange request failed.
    ///
    /// `status` is `0` when no HTTP response was received.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// The HTTP status code returned.
        status: u16,
        /// The error message from the response.
        message: String,
    },

    /// The token exchange did not complete within the configured timeout.
    #[error("Token exchange timed out")]
    UpstreamTimeout,

    /// Shopify answered the token exchange without an access token.
    #[error("Token response did not contain an access token")]
    MissingAccessToken,

    /// The install store is full; the install request is refused.
    #[error("Too many pending installs (limit {limit}), try again later")]
    TooManyPendingInstalls {
        /// The configured limit.
        limit: usize,
    },

    /// The token bundle could not be serialized.
    #[error("Failed to encode token bundle: {0}")]
    Encoding(String),
}

/// Coarse classification of an [`OAuthError`], one per HTTP status family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Gateway misconfiguration; maps to `500`.
    Config,
    /// Malformed, unsigned or replayed request; maps to `400`.
    BadRequest,
    /// Shopify's token endpoint failed; maps to `502`.
    Upstream,
    /// Failure inside the gateway after a successful exchange; maps to `500`.
    Internal,
    /// The gateway is temporarily at capacity; maps to `503`.
    Unavailable,
}

impl OAuthError {
    /// Returns the [`ErrorKind`] of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::MissingHmac
            | Self::InvalidHmac
            | Self::MissingParameter { .. }
            | Self::InvalidShop { .. }
            | Self::MissingState
            | Self::UnknownState
            | Self::StateExpired
            | Self::StateMismatch { .. } => ErrorKind::BadRequest,
            Self::TokenExchangeFailed { .. } | Self::UpstreamTimeout | Self::MissingAccessToken => {
                ErrorKind::Upstream
            }
            Self::TooManyPendingInstalls { .. } => ErrorKind::Unavailable,
            Self::Encoding(_) => ErrorKind::Internal,
        }
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};
