//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("query candidate list is empty: {0}")]
    EmptyCandidates(&'static str),
    #[error("descriptor {path}: required column '{column}' is not mutable")]
    RequiredNotMutable { path: String, column: String },
    #[error("descriptor {path}: json column '{column}' is not mutable")]
    JsonNotMutable { path: String, column: String },
    #[error("duplicate resource path: {0}")]
    DuplicatePath(String),
    #[error("{0} must be set")]
    MissingEnv(&'static str),
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("storage: {0}")]
    Storage(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid id")]
    InvalidIdentifier,
    #[error("id is required")]
    MissingIdentifier,
    #[error("resource not registered: {0}")]
    NotRegistered(String),
    #[error("validation failed: {0:?}")]
    ValidationFailed(BTreeMap<String, String>),
    #[error("invalid JSON body: {0}")]
    InvalidBody(String),
    #[error("empty payload")]
    EmptyPayload,
    #[error("record not found")]
    NotFound,
    #[error("invalid JSON value for {column}")]
    InvalidValue { column: String },
    #[error("all query candidates failed for {0}")]
    QueryFailed(&'static str),
    #[error("no compatible table among {0:?}")]
    NoCompatibleTable(Vec<String>),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("upstream: {message}: {details}")]
    Upstream { message: &'static str, details: String },
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::QueryFailed(_) | AppError::NoCompatibleTable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::InvalidIdentifier
            | AppError::MissingIdentifier
            | AppError::EmptyPayload
            | AppError::InvalidBody(_)
            | AppError::InvalidValue { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotRegistered(_) | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show to clients. Never carries SQL or schema details.
    fn public_message(&self) -> String {
        match self {
            AppError::Config(ConfigError::Storage(msg)) => msg.clone(),
            AppError::Config(_) => "internal configuration error".into(),
            AppError::NotRegistered(_) => "resource not found".into(),
            AppError::ValidationFailed(_) => "validation error".into(),
            AppError::InvalidBody(_) => "invalid JSON body".into(),
            AppError::Db(sqlx::Error::RowNotFound) => "record not found".into(),
            AppError::QueryFailed(what) => format!("failed to fetch {}", what),
            AppError::NoCompatibleTable(_) | AppError::Db(_) => "database error".into(),
            AppError::DeadlineExceeded => "request timed out".into(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Upstream { message, .. } => (*message).to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        }
        let errors = match &self {
            AppError::ValidationFailed(errors) => Some(errors.clone()),
            AppError::InvalidBody(detail) => Some(BTreeMap::from([("body".to_string(), detail.clone())])),
            _ => None,
        };
        let details = match &self {
            AppError::Upstream { details, .. } if !details.is_empty() => Some(details.clone()),
            _ => None,
        };
        let body = ErrorBody {
            status: "error",
            message: self.public_message(),
            errors,
            details,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::Db(sqlx::Error::Protocol("relation \"secret\" does not exist".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "database error");
    }

    #[test]
    fn validation_maps_to_unprocessable() {
        let mut errors = BTreeMap::new();
        errors.insert("title".to_string(), "field is required".to_string());
        let err = AppError::ValidationFailed(errors);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.public_message(), "validation error");
    }

    #[test]
    fn invalid_body_is_bad_request() {
        let err = AppError::InvalidBody("expected a single JSON object".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "invalid JSON body");
    }

    #[test]
    fn query_failed_names_resource_only() {
        let err = AppError::QueryFailed("tuning");
        assert_eq!(err.public_message(), "failed to fetch tuning");
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidIdentifier.public_message(), "invalid id");
    }
}
