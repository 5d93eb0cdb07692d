//! OAuth callback validation and token exchange.
//!
//! After the merchant approves the install, Shopify redirects to the
//! callback with `shop`, `code`, `state`, `hmac` and a few other signed
//! parameters. [`validate_auth_callback`]:
//!
//! 1. Requires both API credentials to be configured
//! 2. Validates the HMAC signature to ensure the request is from Shopify
//! 3. Checks `shop` and `code`, and consumes the install record for `state`
//! 4. Exchanges the authorization code for an access token
//! 5. Returns a [`TokenBundle`] for the front end
//!
//! No outbound request is made unless steps 1-3 pass.

use crate::auth::oauth::error::OAuthError;
use crate::auth::oauth::hmac::validate_hmac;
use crate::auth::oauth::install::{InstallPhase, InstallStore};
use crate::auth::oauth::token_exchange::TokenExchanger;
use crate::auth::oauth::CallbackQuery;
use crate::auth::TokenBundle;
use crate::config::{GatewayConfig, ShopDomain};

/// Characters of the authorization code kept in logs.
const CODE_LOG_PREFIX: usize = 6;

/// Validates an OAuth callback and exchanges the code for an access token.
///
/// # Errors
///
/// - [`OAuthError::Config`]: API key or secret not configured
/// - [`OAuthError::MissingHmac`], [`OAuthError::InvalidHmac`]: signature check failed
/// - [`OAuthError::MissingParameter`]: `shop` or `code` absent
/// - [`OAuthError::InvalidShop`]: `shop` is not a `*.myshopify.com` domain
/// - [`OAuthError::MissingState`], [`OAuthError::UnknownState`],
///   [`OAuthError::StateExpired`], [`OAuthError::StateMismatch`]: state check failed
/// - [`OAuthError::TokenExchangeFailed`], [`OAuthError::UpstreamTimeout`],
///   [`OAuthError::MissingAccessToken`]: Shopify did not issue a token
///
/// # Example
///
/// ```rust,ignore
/// use shopify_gateway::auth::oauth::{validate_auth_callback, CallbackQuery};
///
/// let bundle = validate_auth_callback(&config, &installs, &exchanger, &query).await?;
/// let token_data = bundle.encode()?;
/// ```
pub async fn validate_auth_callback(
    config: &GatewayConfig,
    installs: &InstallStore,
    exchanger: &dyn TokenExchanger,
    query: &CallbackQuery,
) -> Result<TokenBundle, OAuthError> {
    let api_key = config.require_api_key()?;
    let secret = config.require_api_secret_key()?;

    let raw_shop = query.shop().unwrap_or_default();
    tracing::info!(
        shop = raw_shop,
        phase = %InstallPhase::CallbackReceived,
        has_host = query.host().is_some(),
        "install callback received"
    );

    let shop = verify(config, installs, query).map_err(|e| {
        tracing::warn!(shop = raw_shop, phase = %InstallPhase::Rejected, error = %e, "install callback rejected");
        e
    })?;
    let code = query.code().unwrap_or_default();
    tracing::info!(shop = %shop, phase = %InstallPhase::Verified, "install callback verified");

    tracing::debug!(
        shop = %shop,
        code = %truncate(code, CODE_LOG_PREFIX),
        "exchanging authorization code"
    );
    let bundle = exchanger
        .exchange_code(&shop, api_key, secret, code)
        .await
        .and_then(|response| {
            TokenBundle::from_token_response(shop.clone(), &response, config.api_version())
        })
        .map_err(|e| {
            tracing::error!(shop = %shop, phase = %InstallPhase::Failed, error = %e, "token exchange failed");
            e
        })?;

    tracing::info!(
        shop = %shop,
        phase = %InstallPhase::TokenExchanged,
        scopes = bundle.scopes.len(),
        "token exchanged"
    );

    Ok(bundle)
}

fn verify(
    config: &GatewayConfig,
    installs: &InstallStore,
    query: &CallbackQuery,
) -> Result<ShopDomain, OAuthError> {
    if query.hmac().is_none() {
        return Err(OAuthError::MissingHmac);
    }
    let secret = config.require_api_secret_key()?;
    if !validate_hmac(query, secret, config.old_api_secret_key()) {
        return Err(OAuthError::InvalidHmac);
    }

    let raw_shop = query
        .shop()
        .ok_or(OAuthError::MissingParameter { name: "shop" })?;
    if query.code().is_none() {
        return Err(OAuthError::MissingParameter { name: "code" });
    }
    let shop = ShopDomain::new(raw_shop).map_err(|e| OAuthError::InvalidShop {
        reason: e.to_string(),
    })?;

    let state = query.state().ok_or(OAuthError::MissingState)?;
    installs.claim(state, &shop)?;

    Ok(shop)
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
