//! # Shopify OAuth Gateway
//!
//! An HTTP service that installs a Shopify app on a merchant's store and
//! hands the resulting access token to a front-end application.
//!
//! ## Overview
//!
//! The gateway provides:
//! - Type-safe configuration via [`GatewayConfig`] and [`GatewayConfigBuilder`],
//!   loaded from the environment with [`GatewayConfig::from_env`]
//! - Validated newtypes for API credentials, shop domains and URLs
//! - The OAuth 2.0 authorization code flow via [`auth::oauth`]: HMAC-verified
//!   callbacks, single-use state bound to the shop, code exchange
//! - A [`TokenBundle`](auth::TokenBundle) handed to the front end as base64 JSON
//! - An axum router via [`server`]
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_gateway::{GatewayConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = GatewayConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .frontend_url(HostUrl::new("https://app.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(config.has_credentials());
//! ```
//!
//! ## Serving
//!
//! ```rust,ignore
//! use shopify_gateway::{server, GatewayConfig};
//!
//! let config = GatewayConfig::from_env()?;
//! server::serve(config).await?;
//! ```
//!
//! ## Install Flow
//!
//! 1. The front end sends the merchant to `GET /api/shopify/auth?shop=my-store`.
//! 2. The gateway records a fresh state for the shop and redirects (302) to
//!    Shopify's authorization screen.
//! 3. Shopify redirects back to `GET /api/shopify/auth/callback` with a signed
//!    query string.
//! 4. The gateway verifies the signature and state, exchanges the code for a
//!    token and redirects (302) to
//!    `{FRONTEND_URL}/integrations?shopify_installed=1&shop=...&token_data=...`.
//!
//! ## Thread Safety
//!
//! All public configuration and error types are `Send + Sync`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;

// Re-export public types at crate root for convenience
pub use auth::{AuthScopes, TokenBundle};
pub use config::{
    ApiKey, ApiSecretKey, ApiVersion, GatewayConfig, GatewayConfigBuilder, HostUrl, ShopDomain,
};
pub use error::ConfigError;

// Re-export OAuth types for convenience
pub use auth::oauth::{
    begin_auth, validate_auth_callback, BeginAuthResult, CallbackQuery, HttpTokenExchanger,
    InstallPhase, InstallStore, OAuthError, StateParam, TokenExchanger,
};
