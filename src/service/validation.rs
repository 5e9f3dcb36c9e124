//! Request validation: admin payloads against descriptors, and consultation leads.

use crate::config::TableAccessDescriptor;
use crate::error::AppError;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const NOT_EDITABLE: &str = "field is not editable";
pub const REQUIRED: &str = "field is required";

/// Body of an admin create/update request.
pub type ResourcePayload = Map<String, Value>;

pub type FieldErrors = BTreeMap<String, String>;

/// Null, or a string that is blank after trimming.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Field errors for a create payload: unknown or read-only keys, and missing
    /// or empty required columns.
    pub fn create_errors(descriptor: &TableAccessDescriptor, payload: &ResourcePayload) -> FieldErrors {
        let mut errors = Self::update_errors(descriptor, payload);
        for column in &descriptor.required_on_create {
            if payload.get(column).map_or(true, is_empty_value) {
                errors.insert(column.clone(), REQUIRED.to_string());
            }
        }
        errors
    }

    /// Field errors for a partial update: only the editable check applies.
    pub fn update_errors(descriptor: &TableAccessDescriptor, payload: &ResourcePayload) -> FieldErrors {
        payload
            .keys()
            .filter(|k| !descriptor.is_column_mutable(k))
            .map(|k| (k.clone(), NOT_EDITABLE.to_string()))
            .collect()
    }

    pub fn validate_create(descriptor: &TableAccessDescriptor, payload: &ResourcePayload) -> Result<(), AppError> {
        into_result(Self::create_errors(descriptor, payload))
    }

    pub fn validate_update(descriptor: &TableAccessDescriptor, payload: &ResourcePayload) -> Result<(), AppError> {
        into_result(Self::update_errors(descriptor, payload))
    }
}

fn into_result(errors: FieldErrors) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationFailed(errors))
    }
}

fn phone_pattern() -> Option<&'static Regex> {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE
        .get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").ok())
        .as_ref()
}

fn too_long(value: &str, max: usize) -> bool {
    value.chars().count() > max
}

/// Consultation lead as submitted by the site form. Fields are trimmed by the caller.
pub struct ConsultationFields<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub service_type: &'a str,
    pub car_model: &'a str,
    pub preferred_call_time: &'a str,
    pub comments: &'a str,
}

pub fn consultation_errors(f: &ConsultationFields<'_>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let mut check = |field: &str, value: &str, required: bool, max: usize| {
        if required && value.is_empty() {
            errors.insert(field.to_string(), REQUIRED.to_string());
        } else if too_long(value, max) {
            errors.insert(field.to_string(), format!("at most {} characters", max));
        }
    };
    check("first_name", f.first_name, true, 100);
    check("last_name", f.last_name, true, 100);
    check("service_type", f.service_type, true, 80);
    check("car_model", f.car_model, false, 120);
    check("preferred_call_time", f.preferred_call_time, false, 120);
    check("comments", f.comments, false, 2000);

    if f.phone.is_empty() {
        errors.insert("phone".into(), REQUIRED.into());
    } else if !phone_pattern().is_some_and(|re| re.is_match(f.phone)) {
        errors.insert("phone".into(), "invalid phone number".into());
    }
    errors
}
