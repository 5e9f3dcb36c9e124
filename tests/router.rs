//! Router-level tests for requests rejected before any database access. The
//! pool is created lazily and never connects.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use carbon_api::{app, AppState, Settings, TableRegistry};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use tower::ServiceExt;

fn router_with(vars: &[(&str, &str)]) -> Router {
    let mut map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    map.entry("DATABASE_URL".into())
        .or_insert_with(|| "postgres://carbon@127.0.0.1:1/unused".into());
    let settings = Settings::from_lookup(|name| map.get(name).cloned()).unwrap();
    let pool = PgPoolOptions::new().connect_lazy("postgres://carbon@127.0.0.1:1/unused").unwrap();
    app(AppState::new(pool, TableRegistry::builtin().unwrap(), settings))
}

fn router() -> Router {
    router_with(&[])
}

async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn root_lists_routes() {
    let (status, body) = send(router(), request(Method::GET, "/", "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert!(body["routes"].as_array().unwrap().iter().any(|r| r == "/work_post"));
}

#[tokio::test]
async fn non_integer_id_is_bad_request() {
    let (status, body) = send(router(), request(Method::GET, "/admin/banners/abc", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({"status": "error", "message": "invalid id"}));

    let (status, _) = send(router(), request(Method::GET, "/admin/banners/1/2", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(router(), request(Method::GET, "/admin/banners?id=x", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_admin_resource_is_not_found() {
    let (status, body) = send(router(), request(Method::GET, "/admin/unknown", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "resource not found");
}

#[tokio::test]
async fn update_without_id_requires_one() {
    let (status, body) = send(router(), request(Method::PATCH, "/admin/banners", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "id is required");

    let (status, _) = send(router(), request(Method::DELETE, "/admin/partners/", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_method_not_allowed() {
    let (status, body) = send(router(), request(Method::TRACE, "/admin/banners", "")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], "method not allowed");
}

#[tokio::test]
async fn read_only_column_rejected_with_field_errors() {
    let (status, body) = send(
        router(),
        request(Method::PUT, "/admin/portfolio_items/3", r#"{"id": 9, "title": "x"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "validation error");
    assert_eq!(body["errors"]["id"], "field is not editable");
    assert!(body["errors"].get("title").is_none());
}

#[tokio::test]
async fn create_missing_required_field() {
    let (status, body) = send(
        router(),
        request(Method::POST, "/admin/portfolio_items", r#"{"title": "M5"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["image_url"], "field is required");
}

#[tokio::test]
async fn malformed_admin_body_is_bad_request() {
    let (status, body) = send(router(), request(Method::POST, "/admin/banners", "[1, 2]")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid JSON body");
}

#[tokio::test]
async fn admin_token_enforced() {
    let app = router_with(&[("ADMIN_TOKEN", "s3cret")]);
    let (status, body) = send(app.clone(), request(Method::GET, "/admin/banners", "")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "unauthorized");

    let req = Request::builder()
        .uri("/admin/banners/abc")
        .header("Authorization", "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .uri("/admin/storage/files")
        .header("X-Admin-Token", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_storage_reports_missing_setting() {
    let (status, body) = send(router(), request(Method::GET, "/admin/storage/files", "")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "SUPABASE_URL is not set");
}

#[tokio::test]
async fn storage_rejects_bad_bucket_before_upstream() {
    let app = router_with(&[
        ("SUPABASE_URL", "http://127.0.0.1:1"),
        ("SUPABASE_SERVICE_ROLE_KEY", "key"),
    ]);
    let (status, body) = send(
        app.clone(),
        request(Method::DELETE, "/admin/storage/file?bucket=a/b&path=x.jpg", ""),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid bucket");

    let (status, body) = send(app, request(Method::DELETE, "/admin/storage/file?path=../x", "")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "query param path is required");
}

fn upload_request(size: usize) -> Request<Body> {
    let mut body = b"--XBOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"big.bin\"\r\n\
Content-Type: application/octet-stream\r\n\r\n"
        .to_vec();
    body.extend(std::iter::repeat(b'x').take(size));
    body.extend_from_slice(b"\r\n--XBOUNDARY--\r\n");
    Request::builder()
        .method(Method::POST)
        .uri("/admin/storage/upload")
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_accepts_bodies_above_default_limit() {
    let app = router_with(&[
        ("SUPABASE_URL", "http://127.0.0.1:1"),
        ("SUPABASE_SERVICE_ROLE_KEY", "key"),
    ]);
    let (status, body) = send(app.clone(), upload_request(3 << 20)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "storage upload request failed");

    let resp = app.oneshot(upload_request(26 << 20)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn consultation_body_is_strict() {
    let (status, body) = send(
        router(),
        request(Method::POST, "/api/consultations", r#"{"first_name": "Ivan", "extra": 1}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["body"].as_str().unwrap().contains("unknown field"));
}

#[tokio::test]
async fn consultation_validation_errors() {
    let payload = r#"{"first_name": "Ivan", "last_name": "Petrov", "phone": "12-34", "service_type": ""}"#;
    let (status, body) = send(router(), request(Method::POST, "/api/consultations", payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["phone"], "invalid phone number");
    assert_eq!(body["errors"]["service_type"], "field is required");
    assert!(body["errors"].get("first_name").is_none());
}

#[tokio::test]
async fn consultation_null_field_is_a_field_error() {
    let payload = r#"{"first_name": null, "last_name": "Petrov", "phone": "+79991234567", "service_type": "tuning"}"#;
    let (status, body) = send(router(), request(Method::POST, "/api/consultations", payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "validation error");
    assert_eq!(body["errors"]["first_name"], "field is required");
    assert!(body["errors"].get("body").is_none());
}

#[tokio::test]
async fn unknown_path_is_json_not_found() {
    let (status, body) = send(router(), request(Method::GET, "/nothing/here", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}
