//! Gateway configuration.
//!
//! - [`GatewayConfig`]: read-only settings shared by every request
//! - [`GatewayConfigBuilder`]: builder for [`GatewayConfig`]
//! - [`ApiKey`], [`ApiSecretKey`], [`ShopDomain`], [`HostUrl`]: validated newtypes
//! - [`ApiVersion`]: Admin API version reported in token bundles
//!
//! Configuration is normally loaded once at startup with
//! [`GatewayConfig::from_env`]. The Shopify credentials are optional at that
//! point: the server still boots without them and each OAuth request fails
//! with [`ConfigError::MissingEnvVar`] until they are provided.
//!
//! # Example
//!
//! ```rust
//! use shopify_gateway::{GatewayConfig, ApiKey, ApiSecretKey, HostUrl};
//!
//! let config = GatewayConfig::builder()
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("my-secret").unwrap())
//!     .app_url(HostUrl::new("https://gateway.example.com").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.require_api_key().unwrap().as_ref(), "my-api-key");
//! ```

mod newtypes;
mod version;

pub use newtypes::{ApiKey, ApiSecretKey, HostUrl, ShopDomain};
pub use version::ApiVersion;

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::AuthScopes;
use crate::error::ConfigError;

/// Scopes requested when `SHOPIFY_SCOPES` is not set.
pub const DEFAULT_SCOPES: &str =
    "read_products,write_products,read_themes,write_themes,read_orders,read_customers";
/// Public URL of this service when `APP_URL` is not set.
pub const DEFAULT_APP_URL: &str = "http://localhost:8000";
/// Front-end URL when `FRONTEND_URL` is not set.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
/// Listen address when `BIND_ADDR` is not set.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
/// Upper bound on the authorization-code exchange request.
pub const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(30);
/// Lifetime of an install record between redirect and callback.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(600);
/// Most install records held at once when `SHOPIFY_MAX_PENDING_INSTALLS` is
/// not set.
pub const DEFAULT_MAX_PENDING_INSTALLS: usize = 10_000;

/// Read-only configuration for the OAuth gateway.
///
/// `GatewayConfig` is `Clone + Send + Sync` and is shared behind an `Arc`
/// by the HTTP server.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: AuthScopes,
    app_url: HostUrl,
    frontend_url: HostUrl,
    api_version: ApiVersion,
    token_timeout: Duration,
    state_ttl: Duration,
    max_pending_installs: usize,
    bind_addr: SocketAddr,
}

impl GatewayConfig {
    /// Creates a new builder with defaults for every optional field.
    #[must_use]
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::new()
    }

    /// Loads configuration from the process environment.
    ///
    /// See [`GatewayConfig::from_lookup`] for the variables read.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SHOPIFY_API_KEY` | none, required per request |
    /// | `SHOPIFY_API_SECRET` | none, required per request |
    /// | `SHOPIFY_API_SECRET_OLD` | none |
    /// | `SHOPIFY_SCOPES` | [`DEFAULT_SCOPES`] |
    /// | `APP_URL` | [`DEFAULT_APP_URL`] |
    /// | `FRONTEND_URL` | [`DEFAULT_FRONTEND_URL`] |
    /// | `SHOPIFY_API_VERSION` | `2024-10` |
    /// | `SHOPIFY_TOKEN_TIMEOUT_SECS` | 30 |
    /// | `SHOPIFY_STATE_TTL_SECS` | 600 |
    /// | `SHOPIFY_MAX_PENDING_INSTALLS` | [`DEFAULT_MAX_PENDING_INSTALLS`] |
    /// | `BIND_ADDR` | [`DEFAULT_BIND_ADDR`] |
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();

        if let Some(key) = get("SHOPIFY_API_KEY") {
            builder = builder.api_key(ApiKey::new(key)?);
        }
        if let Some(secret) = get("SHOPIFY_API_SECRET") {
            builder = builder.api_secret_key(ApiSecretKey::new(secret)?);
        }
        if let Some(secret) = get("SHOPIFY_API_SECRET_OLD") {
            builder = builder.old_api_secret_key(ApiSecretKey::new(secret)?);
        }
        if let Some(scopes) = get("SHOPIFY_SCOPES") {
            builder = builder.scopes(scopes.parse()?);
        }
        if let Some(url) = get("APP_URL") {
            builder = builder.app_url(HostUrl::new(url)?);
        }
        if let Some(url) = get("FRONTEND_URL") {
            builder = builder.frontend_url(HostUrl::new(url)?);
        }
        if let Some(version) = get("SHOPIFY_API_VERSION") {
            builder = builder.api_version(version.parse()?);
        }
        if let Some(secs) = get("SHOPIFY_TOKEN_TIMEOUT_SECS") {
            builder = builder.token_timeout(parse_seconds("SHOPIFY_TOKEN_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = get("SHOPIFY_STATE_TTL_SECS") {
            builder = builder.state_ttl(parse_seconds("SHOPIFY_STATE_TTL_SECS", &secs)?);
        }
        if let Some(max) = get("SHOPIFY_MAX_PENDING_INSTALLS") {
            builder = builder
                .max_pending_installs(parse_positive("SHOPIFY_MAX_PENDING_INSTALLS", &max)?);
        }
        if let Some(addr) = get("BIND_ADDR") {
            let addr = SocketAddr::from_str(addr.trim()).map_err(|e| ConfigError::InvalidEnvVar {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;
            builder = builder.bind_addr(addr);
        }

        builder.build()
    }

    /// Returns the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `SHOPIFY_API_KEY` is not configured.
    pub fn require_api_key(&self) -> Result<&ApiKey, ConfigError> {
        self.api_key.as_ref().ok_or(ConfigError::MissingEnvVar {
            name: "SHOPIFY_API_KEY",
        })
    }

    /// Returns the API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `SHOPIFY_API_SECRET` is not configured.
    pub fn require_api_secret_key(&self) -> Result<&ApiSecretKey, ConfigError> {
        self.api_secret_key
            .as_ref()
            .ok_or(ConfigError::MissingEnvVar {
                name: "SHOPIFY_API_SECRET",
            })
    }

    /// Returns the previous API secret key, accepted during key rotation.
    #[must_use]
    pub const fn old_api_secret_key(&self) -> Option<&ApiSecretKey> {
        self.old_api_secret_key.as_ref()
    }

    /// Returns `true` when both API credentials are configured.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.api_secret_key.is_some()
    }

    /// Returns the scopes requested during installation.
    #[must_use]
    pub const fn scopes(&self) -> &AuthScopes {
        &self.scopes
    }

    /// Returns the public URL of this service.
    #[must_use]
    pub const fn app_url(&self) -> &HostUrl {
        &self.app_url
    }

    /// Returns the front-end URL that receives the finished installation.
    #[must_use]
    pub const fn frontend_url(&self) -> &HostUrl {
        &self.frontend_url
    }

    /// Returns the Admin API version reported in token bundles.
    #[must_use]
    pub const fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// Returns the timeout applied to the code-exchange request.
    #[must_use]
    pub const fn token_timeout(&self) -> Duration {
        self.token_timeout
    }

    /// Returns how long an install record stays valid.
    #[must_use]
    pub const fn state_ttl(&self) -> Duration {
        self.state_ttl
    }

    /// Returns the most install records held at once.
    #[must_use]
    pub const fn max_pending_installs(&self) -> usize {
        self.max_pending_installs
    }

    /// Returns the address the HTTP server listens on.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

// Verify GatewayConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<GatewayConfig>();
};

fn parse_seconds(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    parse_positive(name, value).map(Duration::from_secs)
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr<Err = std::num::ParseIntError> + PartialEq + Default,
{
    let parsed: T = value.trim().parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::InvalidEnvVar {
            name,
            reason: e.to_string(),
        }
    })?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidEnvVar {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}

/// Builder for [`GatewayConfig`].
///
/// No field is required; unset fields take the defaults listed on
/// [`GatewayConfig::from_lookup`].
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    api_key: Option<ApiKey>,
    api_secret_key: Option<ApiSecretKey>,
    old_api_secret_key: Option<ApiSecretKey>,
    scopes: Option<AuthScopes>,
    app_url: Option<HostUrl>,
    frontend_url: Option<HostUrl>,
    api_version: Option<ApiVersion>,
    token_timeout: Option<Duration>,
    state_ttl: Option<Duration>,
    max_pending_installs: Option<usize>,
    bind_addr: Option<SocketAddr>,
}

impl GatewayConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the API secret key.
    #[must_use]
    pub fn api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.api_secret_key = Some(key);
        self
    }

    /// Sets the previous API secret key for key rotation.
    ///
    /// Callback signatures made with this key are accepted after the primary
    /// key fails, so installs started before a rotation still complete.
    #[must_use]
    pub fn old_api_secret_key(mut self, key: ApiSecretKey) -> Self {
        self.old_api_secret_key = Some(key);
        self
    }

    /// Sets the requested OAuth scopes.
    #[must_use]
    pub fn scopes(mut self, scopes: AuthScopes) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Sets the public URL of this service.
    #[must_use]
    pub fn app_url(mut self, url: HostUrl) -> Self {
        self.app_url = Some(url);
        self
    }

    /// Sets the front-end URL.
    #[must_use]
    pub fn frontend_url(mut self, url: HostUrl) -> Self {
        self.frontend_url = Some(url);
        self
    }

    /// Sets the Admin API version.
    #[must_use]
    pub const fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }

    /// Sets the code-exchange timeout.
    #[must_use]
    pub const fn token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = Some(timeout);
        self
    }

    /// Sets the install record lifetime.
    #[must_use]
    pub const fn state_ttl(mut self, ttl: Duration) -> Self {
        self.state_ttl = Some(ttl);
        self
    }

    /// Sets the most install records held at once.
    ///
    /// Install requests past this limit are refused until records are
    /// claimed or expire.
    #[must_use]
    pub const fn max_pending_installs(mut self, max: usize) -> Self {
        self.max_pending_installs = Some(max);
        self
    }

    /// Sets the listen address.
    #[must_use]
    pub const fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Builds the [`GatewayConfig`], filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a built-in default fails validation.
    pub fn build(self) -> Result<GatewayConfig, ConfigError> {
        let scopes = match self.scopes {
            Some(scopes) => scopes,
            None => DEFAULT_SCOPES.parse()?,
        };
        let app_url = match self.app_url {
            Some(url) => url,
            None => HostUrl::new(DEFAULT_APP_URL)?,
        };
        let frontend_url = match self.frontend_url {
            Some(url) => url,
            None => HostUrl::new(DEFAULT_FRONTEND_URL)?,
        };

        Ok(GatewayConfig {
            api_key: self.api_key,
            api_secret_key: self.api_secret_key,
            old_api_secret_key: self.old_api_secret_key,
            scopes,
            app_url,
            frontend_url,
            api_version: self.api_version.unwrap_or_default(),
            token_timeout: self.token_timeout.unwrap_or(DEFAULT_TOKEN_TIMEOUT),
            state_ttl: self.state_ttl.unwrap_or(DEFAULT_STATE_TTL),
            max_pending_installs: self
                .max_pending_installs
                .unwrap_or(DEFAULT_MAX_PENDING_INSTALLS),
            bind_addr: self
                .bind_addr
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000))),
        })
    }
}
