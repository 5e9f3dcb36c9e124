//! Public read-only content endpoints for the website. Responses are bare JSON
//! arrays (or the `/about` object) rather than the admin envelope.
//!
//! Column types differ between deployments, so every statement casts ids and
//! positions to `bigint`, timestamps to `timestamptz` and JSON columns to
//! `text` before decoding.

use crate::cascade::QueryCandidates;
use crate::db::DbContext;
use crate::error::AppError;
use crate::probe::SchemaProber;
use crate::projection::{first_non_blank, gallery_images, parse_performed_works, parse_string_array, text_or_empty};
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

pub const BANNERS: QueryCandidates = QueryCandidates::new(
    "banners",
    &[
        "SELECT id::bigint AS id, section::text AS section, title::text AS title, \
         COALESCE(to_jsonb(b)->>'image_url', to_jsonb(b)->>'image') AS image_url, priority::bigint AS priority \
         FROM public.banners b ORDER BY priority ASC, id ASC",
        "SELECT id::bigint AS id, section::text AS section, title::text AS title, \
         COALESCE(to_jsonb(b)->>'image_url', to_jsonb(b)->>'image') AS image_url, priority::bigint AS priority \
         FROM banners b ORDER BY priority ASC, id ASC",
    ],
);

pub const CONTACT: QueryCandidates = QueryCandidates::new(
    "contact",
    &[
        "SELECT id::bigint AS id, phone_number, address, description, email, work_schedule \
         FROM public.contact ORDER BY id ASC",
        "SELECT id::bigint AS id, phone_number, address, description, NULL::text AS email, NULL::text AS work_schedule \
         FROM public.contact_page ORDER BY id ASC",
    ],
);

pub const PARTNERS: QueryCandidates = QueryCandidates::new(
    "partners",
    &["SELECT id::bigint AS id, logo_url FROM public.partners ORDER BY id ASC"],
);

/// Title/description drift, optional `full_image_url`, tables without id or
/// timestamps, and the misspelled `tunning` table.
// TODO: drop the `tunning` candidates once every deployment has renamed the table.
pub const TUNING: QueryCandidates = QueryCandidates::new(
    "tuning",
    &[
        "SELECT id::bigint AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, NULL::text AS title, \
         card_image_url, full_image_url::text AS full_image_url, description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, \
         created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.tuning t ORDER BY created_at DESC, id DESC",
        "SELECT id::bigint AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, title, \
         card_image_url, full_image_url::text AS full_image_url, title AS description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, \
         created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.tuning t ORDER BY created_at DESC, id DESC",
        "SELECT id::bigint AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, NULL::text AS title, \
         card_image_url, NULL::text AS full_image_url, description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, \
         created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.tuning t ORDER BY created_at DESC, id DESC",
        "SELECT id::bigint AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, title, \
         card_image_url, NULL::text AS full_image_url, title AS description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, \
         created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.tuning t ORDER BY created_at DESC, id DESC",
        "SELECT row_number() OVER () AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, NULL::text AS title, \
         card_image_url, NULL::text AS full_image_url, description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, NOW() AS created_at, NOW() AS updated_at \
         FROM public.tuning t",
        "SELECT row_number() OVER () AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, title, \
         card_image_url, NULL::text AS full_image_url, title AS description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, NOW() AS created_at, NOW() AS updated_at \
         FROM public.tuning t",
        "SELECT id::bigint AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, NULL::text AS title, \
         card_image_url, full_image_url::text AS full_image_url, description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, \
         created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.tunning t ORDER BY created_at DESC, id DESC",
        "SELECT id::bigint AS id, to_jsonb(t)->>'brand' AS brand, to_jsonb(t)->>'model' AS model, title, \
         card_image_url, full_image_url::text AS full_image_url, title AS description, card_description, full_description, \
         video_image_url, video_link, to_jsonb(t)->>'price' AS price, \
         created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.tunning t ORDER BY created_at DESC, id DESC",
    ],
);

pub const SERVICE_OFFERINGS: QueryCandidates = QueryCandidates::new(
    "service offerings",
    &[
        "SELECT id::bigint AS id, service_type, title, detailed_description, gallery_images::text AS gallery_images, \
         price_text, position::bigint AS position, created_at::timestamptz AS created_at, updated_at::timestamptz AS updated_at \
         FROM public.service_offerings ORDER BY position ASC, id ASC",
        "SELECT id::bigint AS id, service_type, title, detailed_description, gallery_images::text AS gallery_images, \
         price_text, position::bigint AS position, NOW() AS created_at, NOW() AS updated_at \
         FROM public.service_offerings ORDER BY position ASC, id ASC",
        "SELECT id::bigint AS id, service_type, title, detailed_description, NULL::text AS gallery_images, \
         price_text, position::bigint AS position, NOW() AS created_at, NOW() AS updated_at \
         FROM public.service_offerings ORDER BY position ASC, id ASC",
    ],
);

pub const PRIVACY_SECTIONS: QueryCandidates = QueryCandidates::new(
    "privacy sections",
    &["SELECT id::bigint AS id, title, description, position::bigint AS position \
       FROM public.privacy_sections ORDER BY position ASC, id ASC"],
);

pub const PORTFOLIO_ITEMS: QueryCandidates = QueryCandidates::new(
    "portfolio items",
    &["SELECT id::bigint AS id, brand, title, image_url, description, youtube_link, \
       created_at::timestamptz AS created_at \
       FROM public.portfolio_items ORDER BY created_at DESC, id DESC"],
);

/// Preferred table first; `blog_posts` is the legacy name.
pub const WORK_POST_TABLES: [&str; 2] = ["public.work_post", "public.blog_posts"];

const ABOUT_PAGE_SQL: &str = "SELECT id::bigint AS id, banner_title::text AS title, banner_image_url::text AS banner_image_url, \
     history_description::text AS intro_description, mission_description::text AS mission_description, \
     video_url::text AS video_url, mission_image_url::text AS mission_image_url \
     FROM public.about_page ORDER BY id ASC LIMIT 1";
const ABOUT_METRICS_SQL: &str = "SELECT id::bigint AS id, metric_key::text AS key, metric_value::text AS value, \
     metric_label::text AS label, position::bigint AS position \
     FROM public.about_metrics WHERE about_id = $1 ORDER BY position ASC, id ASC";
const ABOUT_SECTIONS_SQL: &str = "SELECT id::bigint AS id, section_key::text AS key, title::text AS title, \
     description::text AS description, position::bigint AS position \
     FROM public.about_sections WHERE about_id = $1 ORDER BY position ASC, id ASC";

/// Page id used for metrics and sections when no about page row exists.
const DEFAULT_ABOUT_ID: i64 = 1;

fn work_post_sql(table: &str, has_gallery: bool) -> String {
    let gallery = if has_gallery {
        "gallery_images::text"
    } else {
        "NULL::text"
    };
    format!(
        "SELECT id::bigint AS id, title_model::text AS title_model, card_image_url::text AS card_image_url, \
         full_image_url::text AS full_image_url, card_description::text AS card_description, \
         work_list::text AS work_list, full_description::text AS full_description, \
         video_image_url::text AS video_image_url, video_link::text AS video_link, {} AS gallery_images \
         FROM {} ORDER BY created_at DESC, id DESC",
        gallery, table
    )
}

#[derive(Debug, FromRow, Serialize)]
pub struct Banner {
    pub id: i64,
    pub section: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub priority: Option<i64>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Contact {
    pub id: i64,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub work_schedule: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct Partner {
    pub id: i64,
    pub logo_url: Option<String>,
}

#[derive(Debug, FromRow)]
struct TuningRow {
    id: i64,
    brand: Option<String>,
    model: Option<String>,
    title: Option<String>,
    card_image_url: Option<String>,
    full_image_url: Option<String>,
    description: Option<String>,
    card_description: Option<String>,
    full_description: Option<String>,
    video_image_url: Option<String>,
    video_link: Option<String>,
    price: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TuningItem {
    pub id: i64,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub title: Option<String>,
    pub card_image_url: Option<String>,
    pub full_image_url: Vec<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub card_description: Option<String>,
    pub full_description: Option<String>,
    pub video_image_url: Option<String>,
    pub video_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<TuningRow> for TuningItem {
    fn from(r: TuningRow) -> Self {
        TuningItem {
            id: r.id,
            brand: r.brand,
            model: r.model,
            title: r.title,
            card_image_url: r.card_image_url,
            full_image_url: parse_string_array(r.full_image_url.as_deref()),
            price: r.price,
            description: r.description,
            card_description: r.card_description,
            full_description: r.full_description,
            video_image_url: r.video_image_url,
            video_link: r.video_link,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ServiceOfferingRow {
    id: i64,
    service_type: Option<String>,
    title: Option<String>,
    detailed_description: Option<String>,
    gallery_images: Option<String>,
    price_text: Option<String>,
    position: Option<i64>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ServiceOffering {
    pub id: i64,
    pub service_type: Option<String>,
    pub title: Option<String>,
    pub detailed_description: Option<String>,
    pub gallery_images: Vec<String>,
    pub price_text: Option<String>,
    pub position: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<ServiceOfferingRow> for ServiceOffering {
    fn from(r: ServiceOfferingRow) -> Self {
        ServiceOffering {
            id: r.id,
            service_type: r.service_type,
            title: r.title,
            detailed_description: r.detailed_description,
            gallery_images: parse_string_array(r.gallery_images.as_deref()),
            price_text: r.price_text,
            position: r.position,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, FromRow, Serialize)]
pub struct PrivacySection {
    pub id: i64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct PortfolioItem {
    pub id: i64,
    pub brand: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub youtube_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct WorkPostRow {
    id: i64,
    title_model: Option<String>,
    card_image_url: Option<String>,
    full_image_url: Option<String>,
    card_description: Option<String>,
    work_list: Option<String>,
    full_description: Option<String>,
    video_image_url: Option<String>,
    video_link: Option<String>,
    gallery_images: Option<String>,
}

/// Work post in the camelCase shape the site's gallery component expects.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkPost {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub image_url: String,
    pub video_url: String,
    pub performed_works: Vec<String>,
    pub gallery_images: Vec<String>,
}

impl From<WorkPostRow> for WorkPost {
    fn from(r: WorkPostRow) -> Self {
        let card = text_or_empty(r.card_image_url.as_deref());
        let full = text_or_empty(r.full_image_url.as_deref());
        let video_image = text_or_empty(r.video_image_url.as_deref());
        let images = [card.as_str(), full.as_str(), video_image.as_str()];
        WorkPost {
            id: r.id,
            title: text_or_empty(r.title_model.as_deref()),
            description: text_or_empty(r.card_description.as_deref()),
            full_description: text_or_empty(r.full_description.as_deref()),
            image_url: first_non_blank(images),
            video_url: text_or_empty(r.video_link.as_deref()),
            performed_works: parse_performed_works(r.work_list.as_deref()),
            gallery_images: gallery_images(r.gallery_images.as_deref(), &images),
        }
    }
}

#[derive(Debug, FromRow, Serialize)]
pub struct AboutPage {
    pub id: i64,
    pub title: Option<String>,
    pub banner_image_url: Option<String>,
    pub intro_description: Option<String>,
    pub mission_description: Option<String>,
    pub video_url: Option<String>,
    pub mission_image_url: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct AboutMetric {
    pub id: i64,
    pub key: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct AboutSection {
    pub id: i64,
    pub key: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct About {
    pub page: Option<AboutPage>,
    pub metrics: Vec<AboutMetric>,
    pub sections: Vec<AboutSection>,
}

pub async fn banners(State(state): State<AppState>) -> Result<Json<Vec<Banner>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    Ok(Json(BANNERS.fetch_all(&ctx).await?))
}

pub async fn contact(State(state): State<AppState>) -> Result<Json<Vec<Contact>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    Ok(Json(CONTACT.fetch_all(&ctx).await?))
}

pub async fn partners(State(state): State<AppState>) -> Result<Json<Vec<Partner>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    Ok(Json(PARTNERS.fetch_all(&ctx).await?))
}

pub async fn tuning(State(state): State<AppState>) -> Result<Json<Vec<TuningItem>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    let rows: Vec<TuningRow> = TUNING.fetch_all(&ctx).await?;
    Ok(Json(rows.into_iter().map(TuningItem::from).collect()))
}

pub async fn service_offerings(State(state): State<AppState>) -> Result<Json<Vec<ServiceOffering>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    let rows: Vec<ServiceOfferingRow> = SERVICE_OFFERINGS.fetch_all(&ctx).await?;
    Ok(Json(rows.into_iter().map(ServiceOffering::from).collect()))
}

pub async fn privacy_sections(State(state): State<AppState>) -> Result<Json<Vec<PrivacySection>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    Ok(Json(PRIVACY_SECTIONS.fetch_all(&ctx).await?))
}

pub async fn portfolio_items(State(state): State<AppState>) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    Ok(Json(PORTFOLIO_ITEMS.fetch_all(&ctx).await?))
}

pub async fn work_posts(State(state): State<AppState>) -> Result<Json<Vec<WorkPost>>, AppError> {
    let ctx = DbContext::read(&state.pool);
    let prober = SchemaProber::new(&ctx);
    let table = prober.resolve_preferred_table(&WORK_POST_TABLES).await?;
    let has_gallery = prober.column_exists(table, "gallery_images").await?;
    let sql = work_post_sql(table, has_gallery);
    tracing::debug!(sql = %sql, "query");
    let rows = ctx
        .run(sqlx::query_as::<_, WorkPostRow>(&sql).fetch_all(ctx.pool()))
        .await
        .map_err(|e| match e {
            AppError::DeadlineExceeded => e,
            other => {
                tracing::error!(table, error = %other, "work posts query failed");
                AppError::QueryFailed("work posts")
            }
        })?;
    Ok(Json(rows.into_iter().map(WorkPost::from).collect()))
}

/// About page with its metrics and sections. Each part is read only when its
/// table exists.
pub async fn about(State(state): State<AppState>) -> Result<Json<About>, AppError> {
    let ctx = DbContext::read(&state.pool);
    let prober = SchemaProber::new(&ctx);

    let page = if prober.table_exists("about_page").await? {
        ctx.run(sqlx::query_as::<_, AboutPage>(ABOUT_PAGE_SQL).fetch_optional(ctx.pool()))
            .await?
    } else {
        None
    };
    let about_id = page.as_ref().map_or(DEFAULT_ABOUT_ID, |p| p.id);

    let metrics = if prober.table_exists("about_metrics").await? {
        ctx.run(
            sqlx::query_as::<_, AboutMetric>(ABOUT_METRICS_SQL)
                .bind(about_id)
                .fetch_all(ctx.pool()),
        )
        .await?
    } else {
        Vec::new()
    };

    let sections = if prober.table_exists("about_sections").await? {
        ctx.run(
            sqlx::query_as::<_, AboutSection>(ABOUT_SECTIONS_SQL)
                .bind(about_id)
                .fetch_all(ctx.pool()),
        )
        .await?
    } else {
        Vec::new()
    };

    Ok(Json(About { page, metrics, sections }))
}
