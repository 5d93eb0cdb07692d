//! Pending-install tracking.
//!
//! [`InstallStore`] remembers which shop each issued state parameter belongs
//! to, from the moment the merchant is redirected to Shopify until the
//! callback arrives. Records are single-use and expire after a TTL, and the
//! store refuses new records once it holds its configured maximum.
//!
//! The store lives in process memory. Running several gateway instances
//! behind a load balancer requires sticky routing so the callback reaches
//! the instance that started the install.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use shopify_gateway::ShopDomain;
//! use shopify_gateway::auth::oauth::{InstallStore, StateParam};
//!
//! let store = InstallStore::new(Duration::from_secs(600), 1_000);
//! let shop = ShopDomain::new("test-shop").unwrap();
//! let state = StateParam::new();
//!
//! store.record(&state, shop.clone()).unwrap();
//! assert!(store.claim(state.nonce(), &shop).is_ok());
//! assert!(store.claim(state.nonce(), &shop).is_err()); // single use
//! ```

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::StateParam;
use crate::config::ShopDomain;

/// Where an install attempt currently is.
///
/// Each transition is logged with the attempt's shop so a stuck install can
/// be traced end to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallPhase {
    /// The merchant hit the install endpoint.
    Started,
    /// The merchant was redirected to Shopify's consent screen.
    RedirectedToProvider,
    /// Shopify redirected back to the callback.
    CallbackReceived,
    /// HMAC and state checks passed.
    Verified,
    /// The authorization code was exchanged for a token.
    TokenExchanged,
    /// The merchant was redirected to the front end with the token bundle.
    Completed,
    /// A request failed validation.
    Rejected,
    /// Shopify or the gateway failed after validation.
    Failed,
}

impl InstallPhase {
    /// Returns `true` for phases that end an install attempt.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Failed)
    }

    /// Returns the phase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::RedirectedToProvider => "redirected_to_provider",
            Self::CallbackReceived => "callback_received",
            Self::Verified => "verified",
            Self::TokenExchanged => "token_exchanged",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state parameter that has been issued and not yet used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingInstall {
    /// The shop the state was issued for.
    pub shop: ShopDomain,
    /// When the state was issued.
    pub created_at: DateTime<Utc>,
    /// When the state stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl PendingInstall {
    /// Returns `true` if the record is no longer valid at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Longest gap, in seconds, between two sweeps of expired records.
const PURGE_INTERVAL_SECS: u64 = 30;

/// Thread-safe store of pending installs keyed by state nonce.
#[derive(Debug)]
pub struct InstallStore {
    pending: DashMap<String, PendingInstall>,
    ttl: chrono::Duration,
    max_pending: usize,
    purge_interval_secs: i64,
    // Unix seconds of the last sweep.
    last_purge: AtomicI64,
}

// Verify InstallStore is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InstallStore>();
};

impl InstallStore {
    /// Creates an empty store whose records live for `ttl` and which holds
    /// at most `max_pending` records.
    #[must_use]
    pub fn new(ttl: Duration, max_pending: usize) -> Self {
        let interval = ttl.as_secs().clamp(1, PURGE_INTERVAL_SECS);
        Self {
            pending: DashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::weeks(52)),
            max_pending,
            purge_interval_secs: i64::try_from(interval).unwrap_or(1),
            last_purge: AtomicI64::new(i64::MIN),
        }
    }

    /// Records that `state` was issued for `shop`.
    ///
    /// Expired records are swept at most once per purge interval (30 seconds,
    /// or the TTL if shorter), so an insert does not scan the whole store.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TooManyPendingInstalls`] if the store already
    /// holds its maximum number of records.
    pub fn record(&self, state: &StateParam, shop: ShopDomain) -> Result<(), OAuthError> {
        self.record_at(state, shop, Utc::now())
    }

    /// Like [`record`](Self::record), with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`record`](Self::record).
    pub fn record_at(
        &self,
        state: &StateParam,
        shop: ShopDomain,
        now: DateTime<Utc>,
    ) -> Result<(), OAuthError> {
        if self.purge_due(now) {
            self.purge_expired(now);
        }

        if self.pending.len() >= self.max_pending {
            return Err(OAuthError::TooManyPendingInstalls {
                limit: self.max_pending,
            });
        }

        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.pending.insert(
            state.nonce().to_string(),
            PendingInstall {
                shop,
                created_at: now,
                expires_at,
            },
        );
        Ok(())
    }

    /// Consumes the record for `nonce` and checks it belongs to `shop`.
    ///
    /// The record is removed whether or not the checks pass, so a state can
    /// be presented at most once.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::UnknownState`]: no record for `nonce`
    /// - [`OAuthError::StateExpired`]: the record outlived its TTL
    /// - [`OAuthError::StateMismatch`]: the record was issued for another shop
    pub fn claim(&self, nonce: &str, shop: &ShopDomain) -> Result<PendingInstall, OAuthError> {
        self.claim_at(nonce, shop, Utc::now())
    }

    /// Like [`claim`](Self::claim), with an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`claim`](Self::claim).
    pub fn claim_at(
        &self,
        nonce: &str,
        shop: &ShopDomain,
        now: DateTime<Utc>,
    ) -> Result<PendingInstall, OAuthError> {
        let (_, pending) = self.pending.remove(nonce).ok_or(OAuthError::UnknownState)?;

        if pending.is_expired_at(now) {
            return Err(OAuthError::StateExpired);
        }

        if &pending.shop != shop {
            return Err(OAuthError::StateMismatch {
                expected: pending.shop.to_string(),
                received: shop.to_string(),
            });
        }

        Ok(pending)
    }

    /// Returns the number of records held, including expired ones not yet
    /// purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Claims the next sweep if the purge interval has elapsed since the
    /// last one. Only one concurrent caller wins.
    fn purge_due(&self, now: DateTime<Utc>) -> bool {
        let now_secs = now.timestamp();
        let last = self.last_purge.load(Ordering::Relaxed);
        now_secs.saturating_sub(last) >= self.purge_interval_secs
            && self
                .last_purge
                .compare_exchange(last, now_secs, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
    }

    fn purge_expired(&self, now: DateTime<Utc>) {
        self.pending.retain(|_, pending| !pending.is_expired_at(now));
    }
}
