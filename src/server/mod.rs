//! HTTP surface of the gateway.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | service description |
//! | `GET /health` | liveness |
//! | `GET /api/shopify/auth?shop=` | start an install, 302 to Shopify |
//! | `GET /api/shopify/auth/callback` | finish an install, 302 to the front end |

mod error;
mod health;
mod shopify;

pub use error::ApiError;
pub use shopify::InstallParams;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::oauth::{HttpTokenExchanger, InstallStore, TokenExchanger};
use crate::config::GatewayConfig;

/// Path of the install endpoint.
pub const AUTH_PATH: &str = "/api/shopify/auth";
/// Path of the OAuth callback, appended to `APP_URL` to form `redirect_uri`.
pub const CALLBACK_PATH: &str = "/api/shopify/auth/callback";

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Read-only configuration.
    pub config: Arc<GatewayConfig>,
    /// Pending installs keyed by state nonce.
    pub installs: Arc<InstallStore>,
    /// Performs the authorization-code exchange.
    pub exchanger: Arc<dyn TokenExchanger>,
}

impl AppState {
    /// Creates state with an empty install store sized by `config.state_ttl()`
    /// and `config.max_pending_installs()`.
    #[must_use]
    pub fn new(config: GatewayConfig, exchanger: Arc<dyn TokenExchanger>) -> Self {
        let installs = InstallStore::new(config.state_ttl(), config.max_pending_installs());
        Self {
            config: Arc::new(config),
            installs: Arc::new(installs),
            exchanger,
        }
    }
}

/// Builds the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let origin = HeaderValue::from_str(state.config.frontend_url().origin()).ok();
    if origin.is_none() {
        tracing::warn!(
            frontend_url = state.config.frontend_url().as_ref(),
            "FRONTEND_URL is not a valid CORS origin; cross-origin requests will be refused"
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origin))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route(AUTH_PATH, get(shopify::shopify_auth))
        .route(CALLBACK_PATH, get(shopify::shopify_callback))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind_addr()` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the address cannot
/// be bound or the server fails.
pub async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let exchanger = HttpTokenExchanger::new(config.token_timeout())?;
    let addr = config.bind_addr();
    let app = router(AppState::new(config, Arc::new(exchanger)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Shopify OAuth gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for shutdown signal");
            // Without a signal handler, keep serving until the process is killed.
            std::future::pending::<()>().await;
        }
    }
}
