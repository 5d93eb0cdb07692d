//! Authorization-code exchange.
//!
//! After the callback is verified, the one-time authorization code is
//! POSTed to `https://{shop}/admin/oauth/access_token` together with the
//! app's credentials:
//!
//! ```text
//! POST /admin/oauth/access_token
//! Content-Type: application/json
//!
//! {"client_id": "...", "client_secret": "...", "code": "..."}
//! ```
//!
//! The exchange sits behind the [`TokenExchanger`] trait so the callback
//! flow can be driven without network access. [`HttpTokenExchanger`] is the
//! production implementation.
//!
//! Authorization codes are single-use, so a failed exchange is never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::oauth::OAuthError;
use crate::config::{ApiKey, ApiSecretKey, ShopDomain};

/// Request body for the code exchange.
#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

/// Body of a successful code exchange.
///
/// Both fields are optional on the wire; a missing `access_token` is
/// reported as [`OAuthError::MissingAccessToken`] when the token bundle is
/// built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AccessTokenResponse {
    /// The access token.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Comma-separated granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Exchanges an authorization code for an access token.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Exchanges `code` for an access token on `shop`.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::UpstreamTimeout`]: no answer within the timeout
    /// - [`OAuthError::TokenExchangeFailed`]: network failure, non-2xx status
    ///   or an unparseable body
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        api_key: &ApiKey,
        secret: &ApiSecretKey,
        code: &str,
    ) -> Result<AccessTokenResponse, OAuthError>;
}

/// [`TokenExchanger`] backed by `reqwest`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use shopify_gateway::auth::oauth::HttpTokenExchanger;
///
/// let exchanger = HttpTokenExchanger::new(Duration::from_secs(30)).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct HttpTokenExchanger {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpTokenExchanger {
    /// Creates an exchanger whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] if the HTTP client cannot
    /// be built.
    pub fn new(timeout: Duration) -> Result<Self, OAuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .use_rustls_tls()
            .build()
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status: 0,
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Sends every exchange to `base_url` instead of the shop's own host.
    ///
    /// Intended for pointing the exchanger at a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn token_url(&self, shop: &ShopDomain) -> String {
        let base = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", shop.as_ref()));
        format!("{base}/admin/oauth/access_token")
    }
}

#[async_trait]
impl TokenExchanger for HttpTokenExchanger {
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        api_key: &ApiKey,
        secret: &ApiSecretKey,
        code: &str,
    ) -> Result<AccessTokenResponse, OAuthError> {
        let request_body = AccessTokenRequest {
            client_id: api_key.as_ref(),
            client_secret: secret.as_ref(),
            code,
        };

        let response = self
            .client
            .post(self.token_url(shop))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OAuthError::UpstreamTimeout
                } else {
                    OAuthError::TokenExchangeFailed {
                        status: 0,
                        message: format!("Network error: {e}"),
                    }
                }
            })?;

        let status = response.status();
        tracing::debug!(shop = %shop, status = status.as_u16(), "token exchange responded");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchangeFailed {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response
            .json::<AccessTokenResponse>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OAuthError::UpstreamTimeout
                } else {
                    OAuthError::TokenExchangeFailed {
                        status: status.as_u16(),
                        message: format!("Failed to parse token response: {e}"),
                    }
                }
            })
    }
}

// Verify HttpTokenExchanger is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpTokenExchanger>();
};
