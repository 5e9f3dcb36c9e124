//! Client for the Supabase-compatible object storage API, plus the bucket and
//! path sanitisers applied to every admin storage request.

use crate::error::{AppError, ConfigError};
use crate::settings::StorageSettings;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
pub const LIST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DELETE_TIMEOUT: Duration = Duration::from_secs(12);

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;

/// Upstream bodies are echoed back to admins; cap what we keep.
const MAX_REPLY_BYTES: usize = 1 << 20;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode response: {0}")]
    Decode(String),
}

impl StorageError {
    /// Upstream reply text for non-2xx answers; empty otherwise.
    pub fn reply(&self) -> String {
        match self {
            StorageError::Status { body, .. } => body.clone(),
            _ => String::new(),
        }
    }
}

/// Resolved storage endpoint. Built per request so configuration problems are
/// reported to the caller instead of failing start-up.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    base: Url,
    service_role_key: String,
    pub default_bucket: String,
}

impl StorageConfig {
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, ConfigError> {
        let base = settings
            .base_url
            .as_deref()
            .ok_or_else(|| ConfigError::Storage("SUPABASE_URL is not set".into()))?;
        let service_role_key = settings
            .service_role_key
            .clone()
            .ok_or_else(|| ConfigError::Storage("SUPABASE_SERVICE_ROLE_KEY is not set".into()))?;
        let base = Url::parse(base)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| ConfigError::Storage("SUPABASE_URL is not a valid URL".into()))?;
        Ok(StorageConfig {
            base,
            service_role_key,
            default_bucket: settings.default_bucket.clone(),
        })
    }

    fn endpoint<'a>(&self, parts: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(parts);
        }
        url
    }

    /// Authenticated object URL: `<base>/storage/v1/object/<bucket>/<path>`.
    pub fn object_url(&self, bucket: &str, path: &str) -> Url {
        self.endpoint(["storage", "v1", "object", bucket].into_iter().chain(path.split('/')))
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> Url {
        self.endpoint(
            ["storage", "v1", "object", "public", bucket]
                .into_iter()
                .chain(path.split('/')),
        )
    }

    fn buckets_url(&self) -> Url {
        self.endpoint(["storage", "v1", "bucket"])
    }

    fn list_url(&self, bucket: &str) -> Url {
        self.endpoint(["storage", "v1", "object", "list", bucket])
    }
}

/// Listing parameters forwarded to the storage list endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ListOptions {
    pub prefix: String,
    pub limit: i64,
    pub offset: i64,
    pub sort_column: String,
    pub sort_order: &'static str,
    pub search: String,
}

impl ListOptions {
    /// Parse raw query values. `limit` is clamped to 1..=500; `offset` must be
    /// a non-negative integer; sort order is `asc` unless `desc` is asked for.
    pub fn parse(
        prefix: Option<&str>,
        limit: Option<&str>,
        offset: Option<&str>,
        sort_column: Option<&str>,
        sort_order: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, AppError> {
        let prefix = clean_optional_path(prefix.unwrap_or_default())?;
        let limit = parse_int_or(limit, DEFAULT_LIST_LIMIT)
            .ok_or_else(|| AppError::BadRequest("limit must be an integer".into()))?
            .clamp(1, MAX_LIST_LIMIT);
        let offset = parse_int_or(offset, 0)
            .filter(|o| *o >= 0)
            .ok_or_else(|| AppError::BadRequest("offset must be a non-negative integer".into()))?;
        let sort_column = sort_column
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("name")
            .to_string();
        let sort_order = match sort_order.map(|s| s.trim().to_ascii_lowercase()) {
            Some(o) if o == "desc" => "desc",
            _ => "asc",
        };
        Ok(ListOptions {
            prefix,
            limit,
            offset,
            sort_column,
            sort_order,
            search: search.map(str::trim).unwrap_or_default().to_string(),
        })
    }

    fn body(&self) -> Value {
        let mut body = json!({
            "prefix": self.prefix,
            "limit": self.limit,
            "offset": self.offset,
            "sortBy": {"column": self.sort_column, "order": self.sort_order},
        });
        if !self.search.is_empty() {
            body["search"] = Value::String(self.search.clone());
        }
        body
    }
}

fn parse_int_or(raw: Option<&str>, default: i64) -> Option<i64> {
    match raw.map(str::trim) {
        None | Some("") => Some(default),
        Some(v) => v.parse().ok(),
    }
}

/// `1`, `true`, `yes`, `on` in any case.
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

pub fn clean_bucket(value: &str) -> Result<String, AppError> {
    let bucket = value.trim();
    if bucket.is_empty() {
        return Err(AppError::BadRequest("bucket is required".into()));
    }
    if bucket.contains(['/', '\\']) || bucket.contains("..") {
        return Err(AppError::BadRequest("invalid bucket".into()));
    }
    Ok(bucket.to_string())
}

/// Normalise an object path: backslashes become slashes, empty segments are
/// dropped, `.` and `..` segments are rejected.
pub fn clean_path(value: &str) -> Result<String, AppError> {
    let candidate = value.trim().replace('\\', "/");
    let mut parts = Vec::new();
    for part in candidate.split('/').map(str::trim).filter(|p| !p.is_empty()) {
        if part == "." || part == ".." {
            return Err(AppError::BadRequest("invalid path".into()));
        }
        parts.push(part);
    }
    if parts.is_empty() {
        return Err(AppError::BadRequest("path is required".into()));
    }
    Ok(parts.join("/"))
}

/// Like [`clean_path`], but blank input is allowed and yields an empty path.
pub fn clean_optional_path(value: &str) -> Result<String, AppError> {
    if value.trim().is_empty() {
        Ok(String::new())
    } else {
        clean_path(value)
    }
}

/// Base name of an uploaded file with surrounding dots removed. Empty when
/// nothing usable remains.
pub fn sanitize_filename(value: &str) -> String {
    let name = value.trim().replace('\\', "/");
    let base = name.rsplit('/').next().unwrap_or_default().trim();
    base.trim_matches('.').to_string()
}

/// Storage API calls authenticated with the service-role key.
pub struct StorageClient<'a> {
    http: &'a reqwest::Client,
    config: StorageConfig,
}

/// Reply body, reading at most `limit` bytes off the connection.
async fn read_capped(mut resp: reqwest::Response, limit: usize) -> Result<String, StorageError> {
    let mut buf = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        let room = limit - buf.len();
        if chunk.len() >= room {
            buf.extend_from_slice(&chunk[..room]);
            break;
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

impl<'a> StorageClient<'a> {
    pub fn new(http: &'a reqwest::Client, config: StorageConfig) -> Self {
        StorageClient { http, config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.config.service_role_key)
            .header("apikey", &self.config.service_role_key)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String, StorageError> {
        let resp = self.authed(req).send().await?;
        let status = resp.status();
        let body = read_capped(resp, MAX_REPLY_BYTES).await?;
        let body = body.trim().to_string();
        if !status.is_success() {
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Store an object; returns the storage service's reply text.
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content: axum::body::Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<String, StorageError> {
        let req = self
            .http
            .post(self.config.object_url(bucket, path))
            .timeout(UPLOAD_TIMEOUT)
            .header("x-upsert", upsert.to_string())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content);
        self.send(req).await
    }

    /// Names of every bucket, sorted.
    pub async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let req = self.http.get(self.config.buckets_url()).timeout(LIST_TIMEOUT);
        let raw = self.send(req).await?;
        let entries: Vec<Value> = serde_json::from_str(&raw).map_err(|e| StorageError::Decode(e.to_string()))?;
        let mut names: Vec<String> = entries
            .iter()
            .filter_map(|b| b.get("name").and_then(Value::as_str))
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Object listing for one bucket, passed through as returned.
    pub async fn list_files(&self, bucket: &str, opts: &ListOptions) -> Result<Value, StorageError> {
        let req = self
            .http
            .post(self.config.list_url(bucket))
            .timeout(LIST_TIMEOUT)
            .json(&opts.body());
        let raw = self.send(req).await?;
        if raw.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Decode(e.to_string()))
    }

    pub async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let req = self
            .http
            .delete(self.config.object_url(bucket, path))
            .timeout(DELETE_TIMEOUT);
        self.send(req).await.map(|_| ())
    }
}
