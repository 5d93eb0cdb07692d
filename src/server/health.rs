use axum::Json;
use serde_json::{json, Value};

use super::{AUTH_PATH, CALLBACK_PATH};

/// `GET /`: describes the service and its endpoints.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Shopify OAuth gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "shopify_auth": AUTH_PATH,
            "shopify_callback": CALLBACK_PATH,
        }
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
