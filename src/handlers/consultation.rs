//! Consultation leads: public submission and admin listing.

use crate::db::DbContext;
use crate::error::AppError;
use crate::notify::{spawn_consultation_notice, ConsultationNotification};
use crate::response::{success_created_with_message, success_ok};
use crate::service::validation::{consultation_errors, ConsultationFields};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use sqlx::FromRow;

pub const NEW_STATUS: &str = "new";

const INSERT_SQL: &str = "INSERT INTO public.consultations \
     (first_name, last_name, phone, service_type, car_model, preferred_call_time, comments, status) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, 'new') \
     RETURNING id::bigint, created_at::timestamptz";

const LIST_SQL: &str = "SELECT id::bigint AS id, first_name, last_name, phone, service_type, car_model, \
     preferred_call_time, comments, status, created_at::timestamptz AS created_at \
     FROM public.consultations";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsultationRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub service_type: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub car_model: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub preferred_call_time: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub comments: String,
}

/// `null` reads as an empty string so it reaches field validation.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConsultationRequest {
    /// Strict decode: one JSON object, no unknown fields, nothing after it.
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        let mut de = serde_json::Deserializer::from_slice(body);
        let req = ConsultationRequest::deserialize(&mut de).map_err(|e| AppError::InvalidBody(e.to_string()))?;
        de.end()
            .map_err(|_| AppError::InvalidBody("expected a single JSON object".into()))?;
        Ok(req)
    }

    fn fields(&self) -> ConsultationFields<'_> {
        ConsultationFields {
            first_name: self.first_name.trim(),
            last_name: self.last_name.trim(),
            phone: self.phone.trim(),
            service_type: self.service_type.trim(),
            car_model: self.car_model.trim(),
            preferred_call_time: self.preferred_call_time.trim(),
            comments: self.comments.trim(),
        }
    }
}

/// Blank optional fields are stored as NULL.
fn optional(value: &str) -> Option<String> {
    Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

#[derive(Debug, FromRow, Serialize)]
pub struct Consultation {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub service_type: Option<String>,
    pub car_model: Option<String>,
    pub preferred_call_time: Option<String>,
    pub comments: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsultationFilter {
    pub status: Option<String>,
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, AppError> {
    let req = ConsultationRequest::from_slice(&body)?;
    let fields = req.fields();
    let errors = consultation_errors(&fields);
    if !errors.is_empty() {
        return Err(AppError::ValidationFailed(errors));
    }

    let car_model = optional(fields.car_model);
    let preferred_call_time = optional(fields.preferred_call_time);
    let comments = optional(fields.comments);

    let ctx = DbContext::write(&state.pool);
    let (id, created_at) = ctx
        .run(
            sqlx::query_as::<_, (i64, DateTime<Utc>)>(INSERT_SQL)
                .bind(fields.first_name)
                .bind(fields.last_name)
                .bind(fields.phone)
                .bind(fields.service_type)
                .bind(car_model.as_deref())
                .bind(preferred_call_time.as_deref())
                .bind(comments.as_deref())
                .fetch_one(ctx.pool()),
        )
        .await?;
    tracing::info!(consultation_id = id, service_type = fields.service_type, "consultation created");

    spawn_consultation_notice(
        state.http.clone(),
        state.settings.notify_webhook_url.clone(),
        ConsultationNotification {
            id,
            first_name: fields.first_name.to_string(),
            last_name: fields.last_name.to_string(),
            phone: fields.phone.to_string(),
            service_type: fields.service_type.to_string(),
            car_model,
            preferred_call_time,
            comments,
            status: NEW_STATUS,
            created_at,
        },
    );

    Ok(success_created_with_message(
        json!({
            "id": id,
            "created_at": created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }),
        "consultation request submitted",
    ))
}

/// Newest first, optionally filtered by status.
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ConsultationFilter>,
) -> Result<impl IntoResponse, AppError> {
    let status = filter.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let ctx = DbContext::write(&state.pool);
    let rows = match status {
        Some(status) => {
            let sql = format!("{} WHERE status = $1 ORDER BY created_at DESC, id DESC", LIST_SQL);
            ctx.run(
                sqlx::query_as::<_, Consultation>(&sql)
                    .bind(status)
                    .fetch_all(ctx.pool()),
            )
            .await?
        }
        None => {
            let sql = format!("{} ORDER BY created_at DESC, id DESC", LIST_SQL);
            ctx.run(sqlx::query_as::<_, Consultation>(&sql).fetch_all(ctx.pool()))
                .await?
        }
    };
    Ok(success_ok(rows))
}
