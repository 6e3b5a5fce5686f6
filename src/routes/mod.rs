pub mod audit;
pub mod auth;
pub mod health;
pub mod predictions;
pub mod settings;
pub mod users;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub use audit::audit_report;
pub use auth::{login, register_user, session};
pub use health::health_check;
pub use predictions::get_predictions;
pub use settings::{get_settings, update_settings};
pub use users::{list_users, upsert_users};

/// CORS policy for the configured dashboard origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

/// Build the full HTTP surface
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let log_requests = state.config.log_requests;

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/predictions", get(get_predictions))
        .route("/api/admin/users", get(list_users).post(upsert_users))
        .route(
            "/api/admin/settings",
            get(get_settings).post(update_settings),
        )
        .route("/api/auth/register", post(register_user))
        .route("/api/auth/login", post(login))
        .route("/api/auth/session", get(session))
        .route("/api/audit", get(audit_report))
        .layer(cors)
        .with_state(state);

    if log_requests {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}
