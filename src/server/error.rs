use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::oauth::{ErrorKind, OAuthError};
use crate::error::ConfigError;

/// Error returned by HTTP handlers.
///
/// Rendered as `{"error": "<message>"}` with a status derived from the
/// wrapped [`OAuthError`]'s [`ErrorKind`].
#[derive(Debug)]
pub struct ApiError(pub OAuthError);

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
            ErrorKind::Config | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        Self(err)
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self(OAuthError::Config(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.0.kind() {
            ErrorKind::Config | ErrorKind::Internal => {
                tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
            }
            ErrorKind::Unavailable => {
                tracing::warn!(status = status.as_u16(), error = %self.0, "request refused");
            }
            ErrorKind::BadRequest | ErrorKind::Upstream => {
                tracing::debug!(status = status.as_u16(), error = %self.0, "request failed");
            }
        }

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(OAuthError::InvalidHmac).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(OAuthError::StateExpired).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(OAuthError::UpstreamTimeout).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(OAuthError::MissingAccessToken).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError(OAuthError::Encoding("x".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(OAuthError::TooManyPendingInstalls { limit: 1 }).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(ConfigError::MissingEnvVar {
                name: "SHOPIFY_API_KEY"
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_renders_json_error_body() {
        let response = ApiError::from(ConfigError::MissingEnvVar {
            name: "SHOPIFY_API_KEY",
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "Missing env var: SHOPIFY_API_KEY" })
        );
    }

    #[tokio::test]
    async fn test_upstream_error_is_bad_gateway() {
        let response = ApiError(OAuthError::TokenExchangeFailed {
            status: 401,
            message: "invalid_client".to_string(),
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("invalid_client"));
    }
}
