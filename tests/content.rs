//! Public content and admin endpoints served from legacy table layouts. They run
//! only when TEST_DATABASE_URL points at a disposable PostgreSQL database; each
//! test owns the tables it creates and drops them again.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use carbon_api::{app, AppState, Settings, TableRegistry};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

async fn test_pool() -> Option<(PgPool, String)> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect TEST_DATABASE_URL");
    Some((pool, url))
}

fn router(pool: &PgPool, url: &str) -> Router {
    let url = url.to_string();
    let settings = Settings::from_lookup(|name| (name == "DATABASE_URL").then(|| url.clone())).unwrap();
    app(AppState::new(pool.clone(), TableRegistry::builtin().unwrap(), settings))
}

async fn exec(pool: &PgPool, statements: &[&str]) {
    for sql in statements {
        sqlx::query(sql).execute(pool).await.expect(sql);
    }
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn about_reads_present_parts_and_tolerates_numeric_values() {
    let Some((pool, url)) = test_pool().await else { return };
    let router = router(&pool, &url);
    exec(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.about_page",
            "DROP TABLE IF EXISTS public.about_metrics",
            "DROP TABLE IF EXISTS public.about_sections",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/about", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"page": null, "metrics": [], "sections": []}));

    exec(
        &pool,
        &[
            "CREATE TABLE public.about_page (id serial PRIMARY KEY, banner_title text, banner_image_url text, \
             history_description text, mission_description text, video_url text, mission_image_url text)",
            "INSERT INTO public.about_page (id, banner_title) VALUES (7, 'Carbon')",
            "CREATE TABLE public.about_metrics (id serial PRIMARY KEY, about_id integer, metric_key text, \
             metric_value integer, metric_label text, position integer)",
            "INSERT INTO public.about_metrics (about_id, metric_key, metric_value, metric_label, position) \
             VALUES (7, 'years', 15, 'Years', 2), (7, 'cars', 900, 'Cars', 1), (1, 'other', 1, 'Other', 1)",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/about", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"]["id"], 7);
    assert_eq!(body["page"]["title"], "Carbon");
    assert_eq!(body["page"]["video_url"], Value::Null);
    let values: Vec<&str> = body["metrics"].as_array().unwrap().iter().map(|m| m["value"].as_str().unwrap()).collect();
    assert_eq!(values, vec!["900", "15"]);
    assert_eq!(body["sections"], json!([]));

    exec(
        &pool,
        &[
            "DROP TABLE public.about_page",
            "DROP TABLE public.about_metrics",
        ],
    )
    .await;
}

#[tokio::test]
async fn tuning_served_from_misspelled_table() {
    let Some((pool, url)) = test_pool().await else { return };
    let router = router(&pool, &url);
    exec(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.tuning",
            "DROP TABLE IF EXISTS public.tunning",
            "CREATE TABLE public.tunning (id serial PRIMARY KEY, brand text, title text, card_image_url text, \
             full_image_url jsonb, card_description text, full_description text, video_image_url text, \
             video_link text, created_at timestamptz NOT NULL DEFAULT NOW(), updated_at timestamptz NOT NULL DEFAULT NOW())",
            "INSERT INTO public.tunning (brand, title, full_image_url) \
             VALUES ('BMW', 'Stage 1', '[\"a.jpg\", \"a.jpg\", \" \"]')",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/tuning", None).await;
    assert_eq!(status, StatusCode::OK);
    let item = &body[0];
    assert_eq!(item["brand"], "BMW");
    assert_eq!(item["title"], "Stage 1");
    assert_eq!(item["description"], "Stage 1");
    assert_eq!(item["full_image_url"], json!(["a.jpg"]));
    assert_eq!(item["price"], Value::Null);

    exec(&pool, &["DROP TABLE public.tunning"]).await;
}

#[tokio::test]
async fn work_posts_fall_back_to_blog_posts_and_probe_gallery() {
    let Some((pool, url)) = test_pool().await else { return };
    let router = router(&pool, &url);
    exec(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.work_post",
            "DROP TABLE IF EXISTS public.blog_posts",
            "CREATE TABLE public.blog_posts (id serial PRIMARY KEY, title_model text, card_image_url text, \
             full_image_url text, card_description text, work_list jsonb, full_description text, \
             video_image_url text, video_link text, created_at timestamptz NOT NULL DEFAULT NOW())",
            "INSERT INTO public.blog_posts (title_model, card_image_url, full_image_url, work_list) \
             VALUES ('M5', '', 'full.jpg', '[{\"step\": \"Wrap\"}, \"Tint\", {\"title\": \"Wrap\"}]')",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/work_post", None).await;
    assert_eq!(status, StatusCode::OK);
    let post = &body[0];
    assert_eq!(post["title"], "M5");
    assert_eq!(post["description"], "");
    assert_eq!(post["imageUrl"], "full.jpg");
    assert_eq!(post["performedWorks"], json!(["Wrap", "Tint"]));
    assert_eq!(post["galleryImages"], json!(["full.jpg"]));

    exec(
        &pool,
        &[
            "ALTER TABLE public.blog_posts ADD COLUMN gallery_images jsonb",
            "UPDATE public.blog_posts SET gallery_images = '[\"g1.jpg\", \"g2.jpg\"]'",
        ],
    )
    .await;
    let (status, body) = call(&router, Method::GET, "/work_post", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["galleryImages"], json!(["g1.jpg", "g2.jpg"]));

    exec(&pool, &["DROP TABLE public.blog_posts"]).await;
    let (status, body) = call(&router, Method::GET, "/work_post", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "database error");
}

#[tokio::test]
async fn service_offerings_without_timestamps() {
    let Some((pool, url)) = test_pool().await else { return };
    let router = router(&pool, &url);
    exec(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.service_offerings",
            "CREATE TABLE public.service_offerings (id serial PRIMARY KEY, service_type text, title text, \
             detailed_description text, gallery_images jsonb, price_text text, position numeric)",
            "INSERT INTO public.service_offerings (service_type, title, gallery_images, position) \
             VALUES ('wrap', 'Second', '\"[\\\"x.jpg\\\"]\"', 2), ('wrap', 'First', NULL, 1)",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/service_offerings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "First");
    assert_eq!(body[0]["gallery_images"], json!([]));
    assert_eq!(body[1]["gallery_images"], json!(["x.jpg"]));
    assert_eq!(body[1]["position"], 2);
    assert!(body[1]["created_at"].is_string());

    exec(&pool, &["DROP TABLE public.service_offerings"]).await;
}

#[tokio::test]
async fn banners_read_legacy_image_column() {
    let Some((pool, url)) = test_pool().await else { return };
    let router = router(&pool, &url);
    exec(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.banners",
            "CREATE TABLE public.banners (id serial PRIMARY KEY, section text, title text, image text, priority integer)",
            "INSERT INTO public.banners (section, title, image, priority) VALUES ('hero', 'Main', 'hero.jpg', 1)",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/banners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": 1, "section": "hero", "title": "Main", "image_url": "hero.jpg", "priority": 1}])
    );

    exec(&pool, &["DROP TABLE public.banners"]).await;
}

#[tokio::test]
async fn admin_partners_round_trip_over_http() {
    let Some((pool, url)) = test_pool().await else { return };
    let router = router(&pool, &url);
    exec(
        &pool,
        &[
            "DROP TABLE IF EXISTS public.partners",
            "CREATE TABLE public.partners (id serial PRIMARY KEY, name text, logo_url text, position integer NOT NULL DEFAULT 0)",
        ],
    )
    .await;

    let (status, body) = call(&router, Method::GET, "/admin/partners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "data": []}));

    let (status, body) = call(
        &router,
        Method::POST,
        "/admin/partners",
        Some(json!({"name": "Liqui Moly", "logo_url": "lm.png", "position": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["position"], 3);

    let (status, body) = call(&router, Method::GET, &format!("/admin/partners?id={}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Liqui Moly");

    let (status, body) = call(
        &router,
        Method::PATCH,
        &format!("/admin/partners/{}", id),
        Some(json!({"position": 2.5})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["position"], "must be an integer");

    let (status, body) = call(
        &router,
        Method::PATCH,
        &format!("/admin/partners/{}", id),
        Some(json!({"position": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["position"], 5);

    let (status, body) = call(&router, Method::GET, "/partners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": id, "logo_url": "lm.png"}]));

    let (status, body) = call(&router, Method::DELETE, &format!("/admin/partners/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["logo_url"], "lm.png");

    let (status, _) = call(&router, Method::GET, &format!("/admin/partners/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    exec(&pool, &["DROP TABLE public.partners"]).await;
}
