//! Public content routes (GET only).

use crate::handlers::content;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn content_routes(state: AppState) -> Router {
    Router::new()
        .route("/banners", get(content::banners))
        .route("/contact", get(content::contact))
        .route("/about", get(content::about))
        .route("/partners", get(content::partners))
        .route("/tuning", get(content::tuning))
        .route("/service_offerings", get(content::service_offerings))
        .route("/privacy_sections", get(content::privacy_sections))
        .route("/portfolio_items", get(content::portfolio_items))
        .route("/work_post", get(content::work_posts))
        .with_state(state)
}
