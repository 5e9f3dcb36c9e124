//! Carbon content API: website content reads, consultation leads, a storage
//! proxy and a schema-tolerant admin CRUD layer over PostgreSQL.

pub mod cascade;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod notify;
pub mod probe;
pub mod projection;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod storage;

pub use cascade::{first_success, QueryCandidates};
pub use config::{builtin_descriptors, TableAccessDescriptor, TableRegistry};
pub use db::DbContext;
pub use error::{AppError, ConfigError};
pub use probe::SchemaProber;
pub use routes::{admin_routes, app, common_routes, consultation_routes, content_routes, storage_routes};
pub use service::CrudService;
pub use settings::Settings;
pub use state::AppState;
