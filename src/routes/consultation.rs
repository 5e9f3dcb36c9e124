//! Consultation lead routes.

use crate::handlers::consultation;
use crate::routes::JSON_BODY_LIMIT;
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn consultation_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/consultations",
            get(consultation::list).post(consultation::create),
        )
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT))
        .with_state(state)
}
