use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shopify_gateway::{server, GatewayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;

    if !config.has_credentials() {
        tracing::warn!(
            "SHOPIFY_API_KEY or SHOPIFY_API_SECRET is not set; install requests will fail until both are configured"
        );
    }
    if config
        .api_version()
        .is_deprecated_on(chrono::Utc::now().date_naive())
    {
        tracing::warn!(
            api_version = %config.api_version(),
            "SHOPIFY_API_VERSION is outside Shopify's support window"
        );
    }
    tracing::info!(
        app_url = config.app_url().as_ref(),
        frontend_url = config.frontend_url().as_ref(),
        scopes = %config.scopes(),
        "configuration loaded"
    );

    server::serve(config).await
}
