//! State parameter handling for OAuth CSRF protection.
//!
//! A fresh [`StateParam`] is generated for every install attempt and
//! recorded in the [`InstallStore`](super::InstallStore). The callback must
//! echo it back before any token exchange is attempted.
//!
//! # Example
//!
//! ```rust
//! use shopify_gateway::auth::oauth::StateParam;
//!
//! let state = StateParam::new();
//! assert_eq!(state.nonce().len(), 15);
//! assert_ne!(state, StateParam::new());
//! ```

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// OAuth state parameter: a random, single-use nonce.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateParam {
    value: String,
}

// Verify StateParam is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
};

impl StateParam {
    /// Length of generated nonces.
    pub const NONCE_LENGTH: usize = 15;

    /// Creates a new state parameter from a cryptographically secure random
    /// 15-character alphanumeric nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::NONCE_LENGTH)
            .map(char::from)
            .collect();

        Self { value: nonce }
    }

    /// Returns the nonce.
    #[must_use]
    pub fn nonce(&self) -> &str {
        &self.value
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
