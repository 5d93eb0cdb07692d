//! Query parameters of the OAuth callback.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every query parameter Shopify sent to the callback.
///
/// Shopify signs the full parameter set, including parameters this gateway
/// does not otherwise read (such as `host` and `timestamp`), so the whole set
/// is kept for HMAC verification.
///
/// # Example
///
/// ```rust
/// use shopify_gateway::auth::oauth::CallbackQuery;
///
/// let query = CallbackQuery::new([
///     ("shop", "test-shop.myshopify.com"),
///     ("code", "abc"),
///     ("hmac", "deadbeef"),
/// ]);
/// assert_eq!(query.shop(), Some("test-shop.myshopify.com"));
/// assert_eq!(query.to_signable_string(), "code=abc&shop=test-shop.myshopify.com");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackQuery {
    params: BTreeMap<String, String>,
}

impl CallbackQuery {
    /// Parameters excluded from the signed message.
    const UNSIGNED: [&'static str; 2] = ["hmac", "signature"];

    /// Builds a query from key/value pairs. Later duplicates win.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the value of `name`, treating empty values as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Sets `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// The `shop` parameter, before normalization.
    #[must_use]
    pub fn shop(&self) -> Option<&str> {
        self.get("shop")
    }

    /// The authorization code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.get("code")
    }

    /// The state nonce echoed back by Shopify.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get("state")
    }

    /// The `hmac` signature.
    #[must_use]
    pub fn hmac(&self) -> Option<&str> {
        self.get("hmac")
    }

    /// The base64 admin host, present on embedded launches.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get("host")
    }

    /// Builds the message Shopify signed.
    ///
    /// `hmac` and `signature` are dropped, each remaining pair is rendered as
    /// `key=value` with the decoded value, the rendered strings are sorted and
    /// joined with `&`.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        let mut pairs: Vec<String> = self
            .params
            .iter()
            .filter(|(k, _)| !Self::UNSIGNED.contains(&k.as_str()))
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        pairs.sort_unstable();
        pairs.join("&")
    }
}
