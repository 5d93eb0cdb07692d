//! Error types for gateway configuration.
//!
//! Every configuration constructor returns `Result<T, ConfigError>` so that
//! invalid values are rejected when they are read, not when a merchant hits
//! the install endpoint.
//!
//! # Example
//!
//! ```rust
//! use shopify_gateway::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building or reading gateway configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Shopify API key.")]
    EmptyApiKey,

    /// API secret key cannot be empty.
    #[error("API secret key cannot be empty. Please provide a valid Shopify API secret key.")]
    EmptyApiSecretKey,

    /// Shop domain is invalid.
    #[error("Invalid shop domain '{domain}'. Expected format: 'shop-name' or 'shop-name.myshopify.com'.")]
    InvalidShopDomain {
        /// The invalid domain that was provided.
        domain: String,
    },

    /// API version is invalid.
    #[error("Invalid API version '{version}'. Expected format: 'YYYY-MM' (e.g., '2024-10') or 'unstable'.")]
    InvalidApiVersion {
        /// The invalid version string that was provided.
        version: String,
    },

    /// Scopes are invalid.
    #[error("Invalid scopes: {reason}")]
    InvalidScopes {
        /// The reason the scopes are invalid.
        reason: String,
    },

    /// URL is invalid.
    #[error("Invalid URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://myapp.example.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required environment variable is not set.
    #[error("Missing env var: {name}")]
    MissingEnvVar {
        /// Name of the environment variable.
        name: &'static str,
    },

    /// An environment variable is set but cannot be parsed.
    #[error("Invalid value for env var {name}: {reason}")]
    InvalidEnvVar {
        /// Name of the environment variable.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_error_message() {
        let message = ConfigError::EmptyApiKey.to_string();
        assert!(message.contains("API key cannot be empty"));
    }

    #[test]
    fn test_invalid_shop_domain_error_message() {
        let error = ConfigError::InvalidShopDomain {
            domain: "bad domain!".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("bad domain!"));
        assert!(message.contains("Expected format"));
    }

    #[test]
    fn test_missing_env_var_names_the_variable() {
        let error = ConfigError::MissingEnvVar {
            name: "SHOPIFY_API_KEY",
        };
        assert_eq!(error.to_string(), "Missing env var: SHOPIFY_API_KEY");
    }

    #[test]
    fn test_invalid_env_var_includes_reason() {
        let error = ConfigError::InvalidEnvVar {
            name: "SHOPIFY_TOKEN_TIMEOUT_SECS",
            reason: "invalid digit found in string".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("SHOPIFY_TOKEN_TIMEOUT_SECS"));
        assert!(message.contains("invalid digit"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyApiKey;
        let _: &dyn std::error::Error = &error;
    }
}
