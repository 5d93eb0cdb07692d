//! Authentication types for the install flow.
//!
//! # Overview
//!
//! - [`AuthScopes`]: an ordered list of OAuth scopes
//! - [`TokenBundle`]: the credentials handed to the front end after install
//! - [`oauth`]: the OAuth 2.0 authorization code flow
//!
//! # OAuth Flow
//!
//! ```rust,ignore
//! use shopify_gateway::auth::oauth::{begin_auth, validate_auth_callback};
//!
//! // 1. Generate authorization URL and remember the state
//! let result = begin_auth(&config, &shop, "/api/shopify/auth/callback")?;
//! installs.record(&result.state, shop)?;
//! // Redirect the merchant to result.auth_url
//!
//! // 2. Handle the callback and get a token bundle
//! let bundle = validate_auth_callback(&config, &installs, &exchanger, &query).await?;
//! ```

pub mod oauth;
mod scopes;
mod token_bundle;

pub use scopes::AuthScopes;
pub use token_bundle::{TokenBundle, TokenMetadata};
