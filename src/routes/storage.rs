//! Admin storage proxy routes.

use crate::handlers::storage::{delete_file, list_files, upload};
use crate::routes::UPLOAD_BODY_LIMIT;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::limit::RequestBodyLimitLayer;

pub fn storage_routes(state: AppState) -> Router {
    let upload_routes: Router<AppState> = Router::new()
        .route("/admin/storage/upload", post(upload))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(UPLOAD_BODY_LIMIT));

    Router::new()
        .route("/admin/storage/files", get(list_files))
        .route("/admin/storage/file", delete(delete_file))
        .merge(upload_routes)
        .with_state(state)
}
