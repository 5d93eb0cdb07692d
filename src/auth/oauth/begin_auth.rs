//! OAuth authorization URL generation.
//!
//! [`begin_auth`] is the first step of the install flow: it generates a
//! fresh state parameter and the Shopify authorization URL the merchant is
//! redirected to.
//!
//! # Example
//!
//! ```rust
//! use shopify_gateway::{GatewayConfig, ApiKey, ApiSecretKey, ShopDomain, HostUrl};
//! use shopify_gateway::auth::oauth::begin_auth;
//!
//! let config = GatewayConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-secret").unwrap())
//!     .app_url(HostUrl::new("https://your-app.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let shop = ShopDomain::new("example-shop").unwrap();
//! let result = begin_auth(&config, &shop, "/api/shopify/auth/callback").unwrap();
//!
//! assert!(result.auth_url.starts_with("https://example-shop.myshopify.com/admin/oauth/authorize?"));
//! ```

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::state::StateParam;
use crate::config::{GatewayConfig, ShopDomain};

/// Result of initiating OAuth authorization.
///
/// The `state` must be recorded (see
/// [`InstallStore::record`](crate::auth::oauth::InstallStore::record)) before
/// the merchant is redirected to `auth_url`.
#[derive(Clone, Debug)]
pub struct BeginAuthResult {
    /// The full authorization URL to redirect the merchant to.
    pub auth_url: String,

    /// The state parameter generated for this authorization request.
    pub state: StateParam,
}

/// Builds the authorization URL for `shop`.
///
/// The URL carries `client_id`, `scope`, `redirect_uri` and `state`, each
/// percent-encoded. `redirect_uri` is the configured app URL followed by
/// `redirect_path`.
///
/// # Errors
///
/// Returns [`OAuthError::Config`] if `SHOPIFY_API_KEY` is not configured.
pub fn begin_auth(
    config: &GatewayConfig,
    shop: &ShopDomain,
    redirect_path: &str,
) -> Result<BeginAuthResult, OAuthError> {
    let api_key = config.require_api_key()?;

    let state = StateParam::new();
    let redirect_uri = config.app_url().join(redirect_path);

    let params = [
        ("client_id", api_key.as_ref().to_string()),
        ("scope", config.scopes().to_string()),
        ("redirect_uri", redirect_uri),
        ("state", state.to_string()),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!(
        "https://{}/admin/oauth/authorize?{}",
        shop.as_ref(),
        query_string
    );

    Ok(BeginAuthResult { auth_url, state })
}

// Verify BeginAuthResult is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BeginAuthResult>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey, HostUrl};
    use crate::error::ConfigError;

    fn create_test_config() -> GatewayConfig {
        GatewayConfig::builder()
            .api_key(ApiKey::new("test-api-key").unwrap())
            .api_secret_key(ApiSecretKey::new("test-secret").unwrap())
            .app_url(HostUrl::new("https://myapp.example.com").unwrap())
            .scopes("read_products,write_orders".parse().unwrap())
            .build()
            .unwrap()
    }

    fn create_test_shop() -> ShopDomain {
        ShopDomain::new("test-shop").unwrap()
    }

    #[test]
    fn test_begin_auth_generates_correct_url_structure() {
        let result = begin_auth(&create_test_config(), &create_test_shop(), "/auth/callback").unwrap();

        assert!(result
            .auth_url
            .starts_with("https://test-shop.myshopify.com/admin/oauth/authorize?"));
        assert_eq!(result.auth_url.matches("https://").count(), 1);
    }

    #[test]
    fn test_begin_auth_includes_all_required_params() {
        let result = begin_auth(&create_test_config(), &create_test_shop(), "/auth/callback").unwrap();

        assert!(result.auth_url.contains("client_id=test-api-key"));
        assert!(result
            .auth_url
            .contains("scope=read_products%2Cwrite_orders"));
        assert!(result.auth_url.contains("redirect_uri="));
        assert!(result.auth_url.contains("state="));
    }

    #[test]
    fn test_begin_auth_state_in_url_matches_returned_state() {
        let result = begin_auth(&create_test_config(), &create_test_shop(), "/callback").unwrap();

        assert_eq!(result.state.nonce().len(), 15);
        assert!(result
            .auth_url
            .ends_with(&format!("state={}", result.state.as_ref())));
    }

    #[test]
    fn test_begin_auth_redirect_uri_format() {
        let result = begin_auth(&create_test_config(), &create_test_shop(), "/auth/callback").unwrap();

        let expected = urlencoding::encode("https://myapp.example.com/auth/callback");
        assert!(result
            .auth_url
            .contains(&format!("redirect_uri={expected}")));
    }

    #[test]
    fn test_begin_auth_fails_without_api_key() {
        let config = GatewayConfig::builder().build().unwrap();

        let result = begin_auth(&config, &create_test_shop(), "/callback");

        assert!(matches!(
            result,
            Err(OAuthError::Config(ConfigError::MissingEnvVar {
                name: "SHOPIFY_API_KEY"
            }))
        ));
    }

    #[test]
    fn test_begin_auth_unique_states() {
        let config = create_test_config();
        let shop = create_test_shop();

        let result1 = begin_auth(&config, &shop, "/callback").unwrap();
        let result2 = begin_auth(&config, &shop, "/callback").unwrap();

        assert_ne!(result1.state, result2.state);
    }
}
