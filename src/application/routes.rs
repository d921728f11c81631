use axum::{middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::application::handlers::{auth_handler, report_handler};
use crate::application::state::AppState;
use crate::auth::{require_auth, ApiKeys};

/// Build the HTTP router.
///
/// Report endpoints sit behind the bearer key check; health and the OAuth
/// flow stay public so Google can reach the callback.
pub fn build_router(state: AppState, api_keys: ApiKeys) -> Router {
    let protected = Router::new()
        .route("/api/google-ads/test/", get(report_handler::google_ads_spend))
        .route(
            "/api/google-ads/manager-check/",
            get(report_handler::manager_check),
        )
        .route("/api/report/generate/", get(report_handler::generate_report))
        .route("/api/combined-report/", get(report_handler::combined_report))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    let public = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/google/", get(auth_handler::google_auth_url))
        .route(
            "/api/auth/google/callback/",
            get(auth_handler::google_auth_callback),
        );

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "running" }))
}
