//! Shopify install and callback handlers.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use super::error::ApiError;
use super::{AppState, CALLBACK_PATH};
use crate::auth::oauth::{begin_auth, validate_auth_callback, CallbackQuery, InstallPhase, OAuthError};
use crate::auth::TokenBundle;
use crate::config::ShopDomain;

/// Query parameters of the install endpoint.
#[derive(Debug, Deserialize)]
pub struct InstallParams {
    /// The merchant's shop, in any form [`ShopDomain::new`] accepts.
    pub shop: Option<String>,
    /// Base64 admin host Shopify appends for embedded launches. Logged only.
    pub host: Option<String>,
}

/// `GET /api/shopify/auth`: starts an install and redirects to Shopify.
pub async fn shopify_auth(
    State(state): State<AppState>,
    Query(params): Query<InstallParams>,
) -> Result<Response, ApiError> {
    state.config.require_api_key()?;

    let raw_shop = params
        .shop
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(OAuthError::MissingParameter { name: "shop" })?;
    let shop = ShopDomain::new(raw_shop).map_err(|e| OAuthError::InvalidShop {
        reason: e.to_string(),
    })?;

    tracing::info!(
        shop = %shop,
        phase = %InstallPhase::Started,
        host = params.host.as_deref().unwrap_or_default(),
        "install started"
    );

    let result = begin_auth(&state.config, &shop, CALLBACK_PATH)?;
    state.installs.record(&result.state, shop.clone()).map_err(|e| {
        tracing::warn!(shop = %shop, phase = %InstallPhase::Rejected, error = %e, "install refused");
        e
    })?;

    tracing::info!(shop = %shop, phase = %InstallPhase::RedirectedToProvider, "redirecting to Shopify");
    Ok(found(&result.auth_url))
}

/// `GET /api/shopify/auth/callback`: finishes an install and redirects to
/// the front end with the encoded token bundle.
pub async fn shopify_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    let bundle = validate_auth_callback(
        &state.config,
        &state.installs,
        state.exchanger.as_ref(),
        &query,
    )
    .await?;
    let token_data = encode_bundle(&bundle)?;

    let location = format!(
        "{}?shopify_installed=1&shop={}&token_data={}",
        state.config.frontend_url().join("/integrations"),
        urlencoding::encode(bundle.shop.as_ref()),
        urlencoding::encode(&token_data),
    );

    tracing::info!(shop = %bundle.shop, phase = %InstallPhase::Completed, "install completed");
    Ok(found(&location))
}

fn encode_bundle(bundle: &TokenBundle) -> Result<String, OAuthError> {
    bundle.encode().map_err(|e| {
        tracing::error!(shop = %bundle.shop, phase = %InstallPhase::Failed, error = %e, "token bundle encoding failed");
        e
    })
}

/// A `302 Found` redirect. `axum::response::Redirect` only offers 303/307/308.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
