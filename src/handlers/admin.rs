//! Generic admin CRUD dispatcher: one handler serves every registered table.

use crate::db::DbContext;
use crate::error::AppError;
use crate::extractors::AdminAccess;
use crate::response::{success_created, success_ok};
use crate::service::{CrudService, ResourcePayload};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{MatchedPath, Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::collections::HashMap;

/// Wildcard suffix the admin router mounts under each resource path.
pub const ID_SUFFIX: &str = "/*rest";

/// Resolve the row id of an admin request. A non-blank `?id=` wins over the
/// path; otherwise the single segment after `base` is used. `None` means a
/// collection request.
pub fn parse_resource_id(path: &str, query_id: Option<&str>, base: &str) -> Result<Option<i64>, AppError> {
    if let Some(raw) = query_id.map(str::trim).filter(|s| !s.is_empty()) {
        return raw.parse().map(Some).map_err(|_| AppError::InvalidIdentifier);
    }
    let base = base.trim_end_matches('/');
    let path = path.trim().trim_end_matches('/');
    let rest = match path.strip_prefix(base) {
        Some("") | None => return Ok(None),
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) => rest,
            None => return Ok(None),
        },
    };
    if rest.is_empty() {
        return Ok(None);
    }
    if rest.contains('/') {
        return Err(AppError::InvalidIdentifier);
    }
    rest.parse().map(Some).map_err(|_| AppError::InvalidIdentifier)
}

/// Decode a request body holding exactly one JSON object. `null` is treated
/// as an empty object.
pub fn parse_payload(body: &[u8]) -> Result<ResourcePayload, AppError> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();
    let payload = match values.next() {
        Some(Ok(Value::Object(map))) => map,
        Some(Ok(Value::Null)) => ResourcePayload::new(),
        Some(Ok(_)) => return Err(AppError::InvalidBody("expected a JSON object".into())),
        Some(Err(e)) => return Err(AppError::InvalidBody(e.to_string())),
        None => return Err(AppError::InvalidBody("body is empty".into())),
    };
    if values.next().is_some() {
        return Err(AppError::InvalidBody("expected a single JSON object".into()));
    }
    Ok(payload)
}

pub async fn dispatch(
    _admin: AdminAccess,
    State(state): State<AppState>,
    matched: MatchedPath,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let base = matched.as_str().trim_end_matches(ID_SUFFIX);
    let descriptor = state.registry.lookup(base)?;
    let id = parse_resource_id(uri.path(), query.get("id").map(String::as_str), &descriptor.path)?;

    let response = match (method, id) {
        (Method::GET, None) => {
            let ctx = DbContext::read(&state.pool);
            success_ok(CrudService::list(&ctx, descriptor).await?).into_response()
        }
        (Method::GET, Some(id)) => {
            let ctx = DbContext::read(&state.pool);
            success_ok(CrudService::fetch_one(&ctx, descriptor, id).await?).into_response()
        }
        (Method::POST, _) => {
            let payload = parse_payload(&body)?;
            let ctx = DbContext::write(&state.pool);
            let row = CrudService::create(&ctx, descriptor, &payload).await?;
            tracing::info!(table = %descriptor.table, "admin record created");
            success_created(row).into_response()
        }
        (Method::PUT | Method::PATCH, Some(id)) => {
            let payload = parse_payload(&body)?;
            let ctx = DbContext::write(&state.pool);
            let row = CrudService::update(&ctx, descriptor, id, &payload).await?;
            tracing::info!(table = %descriptor.table, id, "admin record updated");
            success_ok(row).into_response()
        }
        (Method::DELETE, Some(id)) => {
            let ctx = DbContext::write(&state.pool);
            let row = CrudService::delete(&ctx, descriptor, id).await?;
            tracing::info!(table = %descriptor.table, id, "admin record deleted");
            success_ok(row).into_response()
        }
        (Method::PUT | Method::PATCH | Method::DELETE, None) => return Err(AppError::MissingIdentifier),
        _ => return Err(AppError::MethodNotAllowed),
    };
    Ok(response)
}

/// Fallback for paths no router claims.
pub async fn not_registered(uri: Uri) -> AppError {
    AppError::NotRegistered(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "/admin/banners";

    #[test]
    fn collection_paths_have_no_id() {
        assert_eq!(parse_resource_id("/admin/banners", None, BASE).unwrap(), None);
        assert_eq!(parse_resource_id("/admin/banners/", None, BASE).unwrap(), None);
        assert_eq!(parse_resource_id("/admin/banners", Some("  "), BASE).unwrap(), None);
    }

    #[test]
    fn id_from_path_or_query() {
        assert_eq!(parse_resource_id("/admin/banners/42", None, BASE).unwrap(), Some(42));
        assert_eq!(parse_resource_id("/admin/banners/42/", None, BASE).unwrap(), Some(42));
        assert_eq!(parse_resource_id("/admin/banners/1", Some(" 7 "), BASE).unwrap(), Some(7));
    }

    #[test]
    fn bad_ids_rejected() {
        assert!(matches!(
            parse_resource_id("/admin/banners/abc", None, BASE),
            Err(AppError::InvalidIdentifier)
        ));
        assert!(matches!(
            parse_resource_id("/admin/banners/1/2", None, BASE),
            Err(AppError::InvalidIdentifier)
        ));
        assert!(matches!(
            parse_resource_id("/admin/banners", Some("x1"), BASE),
            Err(AppError::InvalidIdentifier)
        ));
    }

    #[test]
    fn other_prefixes_are_not_ids() {
        assert_eq!(parse_resource_id("/admin/banners_old/3", None, BASE).unwrap(), None);
    }

    #[test]
    fn payload_must_be_one_object() {
        assert_eq!(parse_payload(br#"{"title":"x"}"#).unwrap()["title"], "x");
        assert!(parse_payload(b"null").unwrap().is_empty());
        assert!(matches!(parse_payload(b"[1]"), Err(AppError::InvalidBody(_))));
        assert!(matches!(parse_payload(b"{} {}"), Err(AppError::InvalidBody(m)) if m == "expected a single JSON object"));
        assert!(matches!(parse_payload(b"{"), Err(AppError::InvalidBody(_))));
        assert!(matches!(parse_payload(b""), Err(AppError::InvalidBody(_))));
    }
}
