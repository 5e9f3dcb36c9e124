//! Shared application state for all routes. Read-only after start-up.

use crate::config::TableRegistry;
use crate::settings::Settings;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub registry: Arc<TableRegistry>,
    pub settings: Arc<Settings>,
    /// Outbound client for object storage and webhooks.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, registry: TableRegistry, settings: Settings) -> Self {
        AppState {
            pool,
            registry: Arc::new(registry),
            settings: Arc::new(settings),
            http: reqwest::Client::new(),
        }
    }
}
