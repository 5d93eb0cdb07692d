//! OAuth 2.0 authorization code flow for Shopify app installation.
//!
//! 1. **Authorization Initiation** ([`begin_auth`]): generate an
//!    authorization URL and a fresh [`StateParam`], record the state in the
//!    [`InstallStore`] and redirect the merchant to Shopify.
//!
//! 2. **Callback Validation** ([`validate_auth_callback`]): when Shopify
//!    redirects back, verify the HMAC and state, exchange the code through a
//!    [`TokenExchanger`] and build a [`TokenBundle`](crate::auth::TokenBundle).
//!
//! # Security Features
//!
//! - **HMAC Validation**: callbacks are verified using HMAC-SHA256 signatures
//! - **CSRF Protection**: a random, single-use state bound to the shop
//! - **Constant-Time Comparison**: signatures are compared in constant time
//! - **Key Rotation Support**: `SHOPIFY_API_SECRET_OLD` is accepted as a
//!   fallback secret so in-flight installs survive a rotation
//! - **Shop Allow-List**: only `*.myshopify.com` hosts receive the client secret
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_gateway::auth::oauth::{
//!     begin_auth, validate_auth_callback, CallbackQuery, HttpTokenExchanger, InstallStore,
//! };
//!
//! let installs = InstallStore::new(config.state_ttl(), config.max_pending_installs());
//! let exchanger = HttpTokenExchanger::new(config.token_timeout())?;
//!
//! // Install endpoint
//! let shop = ShopDomain::new("example-shop")?;
//! let result = begin_auth(&config, &shop, "/api/shopify/auth/callback")?;
//! installs.record(&result.state, shop)?;
//!
//! // Callback endpoint
//! let bundle = validate_auth_callback(&config, &installs, &exchanger, &query).await?;
//! println!("Installed on {}", bundle.shop);
//! ```

mod begin_auth;
mod callback_query;
mod error;
pub mod hmac;
mod install;
mod state;
mod token_exchange;
mod validate_callback;

pub use begin_auth::{begin_auth, BeginAuthResult};
pub use callback_query::CallbackQuery;
pub use error::{ErrorKind, OAuthError};
pub use hmac::{compute_signature, constant_time_compare, validate_hmac};
pub use install::{InstallPhase, InstallStore, PendingInstall};
pub use state::StateParam;
pub use token_exchange::{AccessTokenResponse, HttpTokenExchanger, TokenExchanger};
pub use validate_callback::validate_auth_callback;
