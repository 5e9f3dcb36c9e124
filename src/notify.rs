//! Admin notification for new consultation leads. Fire-and-forget: failures are
//! logged and never reach the client.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, Serialize)]
pub struct ConsultationNotification {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub service_type: String,
    pub car_model: Option<String>,
    pub preferred_call_time: Option<String>,
    pub comments: Option<String>,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

/// Post the lead to the webhook in a background task. No-op without a URL.
pub fn spawn_consultation_notice(http: reqwest::Client, webhook_url: Option<String>, notice: ConsultationNotification) {
    let Some(url) = webhook_url else {
        return;
    };
    tokio::spawn(async move {
        let id = notice.id;
        match http.post(&url).timeout(NOTIFY_TIMEOUT).json(&notice).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(consultation_id = id, "admin notified");
            }
            Ok(resp) => {
                tracing::warn!(consultation_id = id, status = %resp.status(), "consultation notify non-2xx status");
            }
            Err(e) => {
                tracing::warn!(consultation_id = id, error = %e, "consultation notify send failed");
            }
        }
    });
}
