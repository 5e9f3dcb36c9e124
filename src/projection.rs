//! Projection helpers for public responses: nullable text, derived image fields,
//! and lists stored as loosely shaped JSON.
//!
//! Every list produced here is de-duplicated (first occurrence wins) with blank
//! entries dropped.

use serde_json::Value;
use std::collections::HashSet;

/// Object keys consulted, in order, for a performed-work entry.
pub const PERFORMED_WORK_KEYS: [&str; 5] = ["step", "title", "name", "text", "description"];

/// Trimmed text, or empty for NULL.
pub fn text_or_empty(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// First value that is not blank, trimmed; empty when all are blank.
pub fn first_non_blank<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Trimmed, non-blank values in input order without repeats.
pub fn unique_non_blank<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let clean = value.as_ref().trim();
        if clean.is_empty() || !seen.insert(clean.to_string()) {
            continue;
        }
        out.push(clean.to_string());
    }
    out
}

/// Parse a JSON array of strings. A JSON string holding an encoded array is
/// unwrapped once. Anything else yields an empty list.
pub fn parse_string_array(raw: Option<&str>) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };
    if let Ok(items) = serde_json::from_str::<Vec<String>>(raw) {
        return unique_non_blank(items);
    }
    if let Ok(encoded) = serde_json::from_str::<String>(raw) {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(&encoded) {
            return unique_non_blank(items);
        }
    }
    Vec::new()
}

/// Parse a work list: either an array of strings, or an array of objects each
/// contributing its first non-blank value among [`PERFORMED_WORK_KEYS`].
/// Malformed input yields an empty list.
pub fn parse_performed_works(raw: Option<&str>) -> Vec<String> {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };
    let items = match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(items) => items,
        Err(_) => return Vec::new(),
    };
    let works = items.iter().filter_map(|item| match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => PERFORMED_WORK_KEYS
            .iter()
            .filter_map(|k| obj.get(*k).and_then(Value::as_str))
            .find(|s| !s.trim().is_empty()),
        _ => None,
    });
    unique_non_blank(works)
}

/// Gallery from the JSON column, or the distinct image candidates when the
/// column has no usable entries.
pub fn gallery_images(raw: Option<&str>, image_candidates: &[&str]) -> Vec<String> {
    let parsed = parse_string_array(raw);
    if parsed.is_empty() {
        unique_non_blank(image_candidates)
    } else {
        parsed
    }
}
