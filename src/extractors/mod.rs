//! Request extractors.

pub mod admin;
pub use admin::{AdminAccess, ADMIN_TOKEN_HEADER};
