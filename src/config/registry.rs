//! Registry of admin resources keyed by base path. Read-only after start-up.

use crate::config::{builtin_descriptors, validate, TableAccessDescriptor};
use crate::error::{AppError, ConfigError};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct TableRegistry {
    descriptors: Vec<TableAccessDescriptor>,
    by_path: HashMap<String, usize>,
}

impl TableRegistry {
    pub fn new(descriptors: Vec<TableAccessDescriptor>) -> Result<Self, ConfigError> {
        validate(&descriptors)?;
        let by_path = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.path.trim_end_matches('/').to_string(), i))
            .collect();
        Ok(TableRegistry { descriptors, by_path })
    }

    /// Registry with the site's built-in admin resources.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_descriptors())
    }

    pub fn lookup(&self, path: &str) -> Result<&TableAccessDescriptor, AppError> {
        let key = path.trim_end_matches('/');
        self.by_path
            .get(key)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| AppError::NotRegistered(key.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableAccessDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
