//! Process settings read from the environment (and `.env`, loaded by the binary).
//!
//! Supported variables:
//! - DATABASE_URL or POSTGRES_DSN: connection string (required)
//! - PORT: listen port, default 8080
//! - ADMIN_TOKEN: shared secret for `/admin/*`; unset disables the check
//! - SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY: object storage endpoint and key
//! - STORAGE_BUCKET: default bucket, `cars` when unset
//! - ADMIN_NOTIFY_WEBHOOK_URL: receives new consultation leads
//! - DB_MAX_CONNECTIONS: pool size, default 15

use crate::error::ConfigError;
use url::Url;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BUCKET: &str = "cars";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 15;

#[derive(Clone, Debug, Default)]
pub struct StorageSettings {
    pub base_url: Option<String>,
    pub service_role_key: Option<String>,
    pub default_bucket: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub port: u16,
    pub admin_token: Option<String>,
    pub storage: StorageSettings,
    pub notify_webhook_url: Option<String>,
    pub db_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let dsn = get("DATABASE_URL")
            .or_else(|| get("POSTGRES_DSN"))
            .ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or(ConfigError::InvalidEnv { name: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidEnv { name: "DB_MAX_CONNECTIONS", value: raw })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Settings {
            database_url: normalize_dsn(&dsn),
            port,
            admin_token: get("ADMIN_TOKEN"),
            storage: StorageSettings {
                base_url: get("SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
                service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
                default_bucket: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
            notify_webhook_url: get("ADMIN_NOTIFY_WEBHOOK_URL"),
            db_max_connections,
        })
    }
}

/// Fill in connection parameters the hosted database needs: TLS required and no
/// server-side statement cache (the endpoint sits behind a transaction pooler).
/// Values already present are kept. Strings that are not URLs pass through.
pub fn normalize_dsn(dsn: &str) -> String {
    let mut url = match Url::parse(dsn) {
        Ok(u) => u,
        Err(_) => return dsn.to_string(),
    };
    let present: Vec<String> = url
        .query_pairs()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, _)| k.into_owned())
        .collect();
    let defaults = [("sslmode", "require"), ("statement-cache-capacity", "0")];
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in defaults {
            if !present.iter().any(|k| k == key) {
                pairs.append_pair(key, value);
            }
        }
    }
    url.to_string()
}
