//! Descriptor validation: column-set consistency and path uniqueness.

use crate::config::TableAccessDescriptor;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(descriptors: &[TableAccessDescriptor]) -> Result<(), ConfigError> {
    let mut paths = HashSet::new();
    for d in descriptors {
        if let Some(column) = d.required_on_create.difference(&d.mutable_columns).next() {
            return Err(ConfigError::RequiredNotMutable {
                path: d.path.clone(),
                column: column.clone(),
            });
        }
        if let Some(column) = d.json_columns.difference(&d.mutable_columns).next() {
            return Err(ConfigError::JsonNotMutable {
                path: d.path.clone(),
                column: column.clone(),
            });
        }
        let path = d.path.trim_end_matches('/');
        if !paths.insert(path) {
            return Err(ConfigError::DuplicatePath(path.to_string()));
        }
    }
    Ok(())
}
