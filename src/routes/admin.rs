//! Admin CRUD routes, one pair per registered table: the base path for
//! collection requests (with or without a trailing slash) and `<base>/*rest`
//! for single rows.

use crate::handlers::admin::{dispatch, not_registered, ID_SUFFIX};
use crate::routes::JSON_BODY_LIMIT;
use crate::state::AppState;
use axum::{routing::any, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub fn admin_routes(state: AppState) -> Router {
    let mut router = Router::new();
    for descriptor in state.registry.iter() {
        let base = descriptor.path.trim_end_matches('/');
        router = router
            .route(base, any(dispatch))
            .route(&format!("{}/", base), any(dispatch))
            .route(&format!("{}{}", base, ID_SUFFIX), any(dispatch));
    }
    router
        .fallback(not_registered)
        .layer(RequestBodyLimitLayer::new(JSON_BODY_LIMIT))
        .with_state(state)
}
