//! HTTP handlers: public content, consultations, admin CRUD and storage.

pub mod admin;
pub mod consultation;
pub mod content;
pub mod storage;
