//! The token bundle handed to the front end after a successful install.
//!
//! The bundle is JSON, base64-encoded (standard alphabet, padded) so it can
//! travel as a single query parameter:
//!
//! ```json
//! {
//!   "access_token": "shpat_...",
//!   "scopes": ["read_products", "write_products"],
//!   "shop": "my-store.myshopify.com",
//!   "metadata": { "shop_name": "my-store.myshopify.com", "api_version": "2024-10" }
//! }
//! ```

use base64::prelude::*;
use serde::{Deserialize, Serialize};

use crate::auth::oauth::{AccessTokenResponse, OAuthError};
use crate::auth::AuthScopes;
use crate::config::{ApiVersion, ShopDomain};

/// Shop details carried alongside the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// The shop's full `*.myshopify.com` domain.
    pub shop_name: String,
    /// The Admin API version the front end should call.
    pub api_version: ApiVersion,
}

/// Credentials for one installed shop.
///
/// # Example
///
/// ```rust
/// use shopify_gateway::{ApiVersion, ShopDomain};
/// use shopify_gateway::auth::TokenBundle;
/// use shopify_gateway::auth::oauth::AccessTokenResponse;
///
/// let response = AccessTokenResponse {
///     access_token: Some("shpat_123".to_string()),
///     scope: Some("read_products,write_products".to_string()),
/// };
/// let shop = ShopDomain::new("my-store").unwrap();
/// let bundle = TokenBundle::from_token_response(shop, &response, ApiVersion::default()).unwrap();
///
/// let encoded = bundle.encode().unwrap();
/// assert_eq!(TokenBundle::decode(&encoded).unwrap(), bundle);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// The shop access token.
    pub access_token: String,
    /// Granted scopes in the order Shopify listed them.
    pub scopes: Vec<String>,
    /// The shop the token belongs to.
    pub shop: ShopDomain,
    /// Shop details.
    pub metadata: TokenMetadata,
}

impl TokenBundle {
    /// Builds a bundle from a token-exchange response.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingAccessToken`] if the response has no
    /// access token or an empty one.
    pub fn from_token_response(
        shop: ShopDomain,
        response: &AccessTokenResponse,
        api_version: ApiVersion,
    ) -> Result<Self, OAuthError> {
        let access_token = response
            .access_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(OAuthError::MissingAccessToken)?
            .to_string();

        let scopes = AuthScopes::from_granted(response.scope.as_deref()).into_vec();

        Ok(Self {
            access_token,
            scopes,
            metadata: TokenMetadata {
                shop_name: shop.to_string(),
                api_version,
            },
            shop,
        })
    }

    /// Serializes the bundle to JSON and base64-encodes it.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Encoding`] if serialization fails.
    pub fn encode(&self) -> Result<String, OAuthError> {
        let json = serde_json::to_vec(self).map_err(|e| OAuthError::Encoding(e.to_string()))?;
        Ok(BASE64_STANDARD.encode(json))
    }

    /// Reverses [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Encoding`] if `encoded` is not a base64-encoded
    /// bundle.
    pub fn decode(encoded: &str) -> Result<Self, OAuthError> {
        let json = BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| OAuthError::Encoding(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| OAuthError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(token: Option<&str>, scope: Option<&str>) -> AccessTokenResponse {
        AccessTokenResponse {
            access_token: token.map(str::to_string),
            scope: scope.map(str::to_string),
        }
    }

    fn shop() -> ShopDomain {
        ShopDomain::new("my-store").unwrap()
    }

    #[test]
    fn test_from_token_response_builds_bundle() {
        let bundle = TokenBundle::from_token_response(
            shop(),
            &response(Some("shpat_abc"), Some("read_products, write_products,,read_products")),
            ApiVersion::default(),
        )
        .unwrap();

        assert_eq!(bundle.access_token, "shpat_abc");
        assert_eq!(bundle.scopes, vec!["read_products", "write_products"]);
        assert_eq!(bundle.shop.as_ref(), "my-store.myshopify.com");
        assert_eq!(bundle.metadata.shop_name, "my-store.myshopify.com");
        assert_eq!(bundle.metadata.api_version.to_string(), "2024-10");
    }

    #[test]
    fn test_missing_scope_yields_empty_list() {
        let bundle =
            TokenBundle::from_token_response(shop(), &response(Some("t"), None), ApiVersion::default())
                .unwrap();
        assert!(bundle.scopes.is_empty());
    }

    #[test]
    fn test_missing_or_empty_token_is_rejected() {
        for token in [None, Some("")] {
            let result = TokenBundle::from_token_response(
                shop(),
                &response(token, Some("read_products")),
                ApiVersion::default(),
            );
            assert!(matches!(result, Err(OAuthError::MissingAccessToken)));
        }
    }

    #[test]
    fn test_encode_produces_expected_json() {
        let bundle = TokenBundle::from_token_response(
            shop(),
            &response(Some("shpat_abc"), Some("read_products")),
            ApiVersion::default(),
        )
        .unwrap();

        let json = BASE64_STANDARD.decode(bundle.encode().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "access_token": "shpat_abc",
                "scopes": ["read_products"],
                "shop": "my-store.myshopify.com",
                "metadata": {
                    "shop_name": "my-store.myshopify.com",
                    "api_version": "2024-10"
                }
            })
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            TokenBundle::decode("not base64!"),
            Err(OAuthError::Encoding(_))
        ));
        let not_json = BASE64_STANDARD.encode("plain text");
        assert!(TokenBundle::decode(&not_json).is_err());
    }
}
