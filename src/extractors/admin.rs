//! Admin access check: shared token via `X-Admin-Token` or `Authorization: Bearer`.

use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Proof that the request carried the admin token. When no token is
/// configured every request passes.
#[derive(Clone, Copy, Debug)]
pub struct AdminAccess;

fn provided_token(parts: &Parts) -> String {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
            .map(str::trim)
            .unwrap_or_default()
    };
    let direct = header(ADMIN_TOKEN_HEADER);
    if !direct.is_empty() {
        return direct.to_string();
    }
    let auth = header(axum::http::header::AUTHORIZATION.as_str());
    match auth.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer ") => auth[7..].trim().to_string(),
        _ => String::new(),
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.settings.admin_token.as_deref() else {
            return Ok(AdminAccess);
        };
        if constant_time_eq(provided_token(parts).as_bytes(), expected.as_bytes()) {
            Ok(AdminAccess)
        } else {
            tracing::warn!(path = %parts.uri.path(), "admin token rejected");
            Err(AppError::Unauthorized)
        }
    }
}
