//! Health check endpoint, mounted at the root (not under `/api/v1`).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Routes mounted at `/`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health
///
/// Liveness plus a database round-trip. Always returns 200 so load
/// balancers can distinguish "up but degraded" from "down".
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = tagalong_db::health_check(&state.pool).await.is_ok();

    Json(json!({
        "status": if db_healthy { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "db_healthy": db_healthy,
    }))
}
