use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Health check endpoint
///
/// Reports whether the configured store answers a one-row read.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let store_status = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!("Store health check failed: {:?}", e);
            "disconnected"
        }
    };

    let status = if store_status == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(json!({
        "status": status,
        "store": store_status,
        "backend": state.store.backend(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
