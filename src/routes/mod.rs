//! Routers per concern, merged with the shared layers by [`app`].

pub mod admin;
pub mod common;
pub mod consultation;
pub mod content;
pub mod storage;

pub use admin::admin_routes;
pub use common::common_routes;
pub use consultation::consultation_routes;
pub use content::content_routes;
pub use storage::storage_routes;

use crate::state::AppState;
use axum::http::{header, HeaderName, Method};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Limit for JSON request bodies.
pub const JSON_BODY_LIMIT: usize = 1 << 20;
/// Limit for multipart uploads.
pub const UPLOAD_BODY_LIMIT: usize = 25 << 20;

/// Browser clients may call from any origin; admin calls carry the token header.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-admin-token"),
        ])
}

/// Every route of the service on one router, with request tracing and CORS.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(content_routes(state.clone()))
        .merge(consultation_routes(state.clone()))
        .merge(storage_routes(state.clone()))
        .merge(admin_routes(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
}
