//! Common routes: service info and health.

use crate::db;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

/// Public routes advertised by `GET /`.
pub const ROUTES: [&str; 14] = [
    "/",
    "/healthz",
    "/contact",
    "/about",
    "/banners",
    "/partners",
    "/tuning",
    "/service_offerings",
    "/privacy_sections",
    "/api/consultations",
    "/portfolio_items",
    "/work_post",
    "/admin/*",
    "/admin/storage/*",
];

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    db: bool,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
    if db::ping(&state.pool).await {
        (StatusCode::OK, Json(HealthBody { status: "ok", db: true }))
    } else {
        tracing::warn!("health check: database unavailable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthBody {
                status: "database unavailable",
                db: false,
            }),
        )
    }
}

async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "routes": ROUTES,
    }))
}

/// GET / and GET /healthz.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/healthz", get(health))
        .with_state(state)
}
