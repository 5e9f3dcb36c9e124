//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T> Success<T> {
    fn new(data: T) -> Self {
        Success {
            status: "success",
            data,
            message: None,
            meta: None,
        }
    }
}

pub fn success_ok<T: Serialize>(data: T) -> (StatusCode, Json<Success<T>>) {
    (StatusCode::OK, Json(Success::new(data)))
}

pub fn success_created<T: Serialize>(data: T) -> (StatusCode, Json<Success<T>>) {
    (StatusCode::CREATED, Json(Success::new(data)))
}

pub fn success_created_with_message<T: Serialize>(
    data: T,
    message: impl Into<String>,
) -> (StatusCode, Json<Success<T>>) {
    let mut body = Success::new(data);
    body.message = Some(message.into());
    (StatusCode::CREATED, Json(body))
}

pub fn success_with_meta<T: Serialize>(data: T, meta: serde_json::Value) -> (StatusCode, Json<Success<T>>) {
    let mut body = Success::new(data);
    body.meta = Some(meta);
    (StatusCode::OK, Json(body))
}
