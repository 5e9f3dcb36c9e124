//! Admin storage proxy: upload, list and delete objects in the storage service.

use crate::error::AppError;
use crate::extractors::AdminAccess;
use crate::response::{success_created, success_ok, success_with_meta};
use crate::state::AppState;
use crate::storage::{
    clean_bucket, clean_optional_path, clean_path, is_truthy, sanitize_filename, ListOptions, StorageClient,
    StorageConfig, StorageError,
};
use axum::{
    body::Bytes,
    extract::{Multipart, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn storage_client(state: &AppState) -> Result<StorageClient<'_>, AppError> {
    let config = StorageConfig::from_settings(&state.settings.storage)?;
    Ok(StorageClient::new(&state.http, config))
}

/// Map a failed upstream call: non-2xx replies carry the upstream body,
/// transport failures carry nothing.
fn upstream(failed: &'static str, unreachable: &'static str, err: StorageError) -> AppError {
    tracing::warn!(error = %err, "{}", failed);
    match err {
        StorageError::Status { body, .. } => AppError::Upstream {
            message: failed,
            details: body,
        },
        _ => AppError::Upstream {
            message: unreachable,
            details: String::new(),
        },
    }
}

/// Empty string counts as "not given", matching how HTML forms submit.
fn first_non_empty(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[derive(Default)]
struct UploadForm {
    file: Option<(Bytes, Option<String>, Option<String>)>,
    bucket: Option<String>,
    folder: Option<String>,
    filename: Option<String>,
    upsert: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let bad_form = |_| AppError::BadRequest("invalid multipart form".into());
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(bad_form)?;
                form.file = Some((bytes, file_name, content_type));
            }
            "bucket" | "folder" | "filename" | "upsert" => {
                let text = field.text().await.map_err(bad_form)?;
                let slot = match name.as_str() {
                    "bucket" => &mut form.bucket,
                    "folder" => &mut form.folder,
                    "filename" => &mut form.filename,
                    _ => &mut form.upsert,
                };
                *slot = Some(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Upsert defaults to on; only an explicit value other than 1/true/yes turns it off.
fn upsert_flag(raw: Option<&str>) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => true,
        Some(v) => matches!(v.as_str(), "" | "1" | "true" | "yes"),
    }
}

pub async fn upload(
    _admin: AdminAccess,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let client = storage_client(&state)?;
    let form = read_upload_form(multipart).await?;
    let (content, original_name, content_type) = form
        .file
        .ok_or_else(|| AppError::BadRequest("file is required (form-data key: file)".into()))?;

    let bucket = clean_bucket(&first_non_empty(form.bucket.as_deref(), &client.config().default_bucket))?;
    let mut filename = sanitize_filename(&first_non_empty(
        form.filename.as_deref(),
        original_name.as_deref().unwrap_or_default(),
    ));
    if filename.is_empty() {
        filename = format!("upload_{}.bin", uuid::Uuid::new_v4().simple());
    }
    let folder = clean_optional_path(form.folder.as_deref().unwrap_or_default())?;
    let path = if folder.is_empty() {
        filename
    } else {
        format!("{}/{}", folder, filename)
    };
    let content_type = first_non_empty(content_type.as_deref(), DEFAULT_CONTENT_TYPE);
    let upsert = upsert_flag(form.upsert.as_deref());
    let size = content.len();

    let reply = client
        .upload(&bucket, &path, content, &content_type, upsert)
        .await
        .map_err(|e| upstream("storage upload failed", "storage upload request failed", e))?;
    tracing::info!(bucket = %bucket, path = %path, size, "object uploaded");

    Ok(success_created(json!({
        "bucket": bucket,
        "path": path,
        "mime_type": content_type,
        "size": size,
        "upsert": upsert,
        "storage_url": client.config().object_url(&bucket, &path).as_str(),
        "public_url": client.config().public_url(&bucket, &path).as_str(),
        "storage_reply": reply,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub sort_column: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub all: Option<String>,
}

pub async fn list_files(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(q): Query<FilesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let client = storage_client(&state)?;
    let opts = ListOptions::parse(
        q.prefix.as_deref(),
        q.limit.as_deref(),
        q.offset.as_deref(),
        q.sort_column.as_deref(),
        q.sort_order.as_deref(),
        q.search.as_deref(),
    )?;

    if q.all.as_deref().is_some_and(is_truthy) {
        let buckets = client.list_buckets().await.map_err(|e| AppError::Upstream {
            message: "failed to fetch buckets",
            details: e.to_string(),
        })?;
        let mut items = Map::new();
        for bucket in &buckets {
            let entry = match client.list_files(bucket, &opts).await {
                Ok(data) => data,
                Err(e) => json!({"status": "error", "message": e.to_string()}),
            };
            items.insert(bucket.clone(), entry);
        }
        let meta = json!({
            "all": true,
            "bucket_count": buckets.len(),
            "per_bucket_max": opts.limit,
            "prefix": opts.prefix,
        });
        return Ok(success_with_meta(Value::Object(items), meta));
    }

    let bucket = clean_bucket(&first_non_empty(q.bucket.as_deref(), &client.config().default_bucket))?;
    let data = client
        .list_files(&bucket, &opts)
        .await
        .map_err(|e| AppError::Upstream {
            message: "storage list failed",
            details: e.to_string(),
        })?;
    let meta = json!({
        "bucket": bucket,
        "prefix": opts.prefix,
        "limit": opts.limit,
        "offset": opts.offset,
    });
    Ok(success_with_meta(data, meta))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub bucket: Option<String>,
    pub path: Option<String>,
}

pub async fn delete_file(
    _admin: AdminAccess,
    State(state): State<AppState>,
    Query(q): Query<DeleteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let client = storage_client(&state)?;
    let bucket = clean_bucket(&first_non_empty(q.bucket.as_deref(), &client.config().default_bucket))?;
    let path = clean_path(q.path.as_deref().unwrap_or_default())
        .map_err(|_| AppError::BadRequest("query param path is required".into()))?;

    client
        .delete(&bucket, &path)
        .await
        .map_err(|e| upstream("storage delete failed", "storage delete request failed", e))?;
    tracing::info!(bucket = %bucket, path = %path, "object deleted");
    Ok(success_ok(json!({"bucket": bucket, "path": path})))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_defaults_on() {
        assert!(upsert_flag(None));
        assert!(upsert_flag(Some("")));
        assert!(upsert_flag(Some(" YES ")));
        assert!(!upsert_flag(Some("false")));
        assert!(!upsert_flag(Some("0")));
    }

    #[test]
    fn upstream_status_keeps_reply() {
        let err = upstream(
            "storage delete failed",
            "storage delete request failed",
            StorageError::Status {
                status: 404,
                body: "Object not found".into(),
            },
        );
        assert!(matches!(err, AppError::Upstream { message: "storage delete failed", details } if details == "Object not found"));
    }

    #[test]
    fn blank_form_values_use_fallback() {
        assert_eq!(first_non_empty(Some("  "), "cars"), "cars");
        assert_eq!(first_non_empty(None, "cars"), "cars");
        assert_eq!(first_non_empty(Some(" media "), "cars"), "media");
    }
}
