//! Table access descriptors: which columns of a table the admin API may touch.

use std::collections::BTreeSet;

/// Ordering used when a descriptor has none, and as the fallback when the
/// configured ordering fails against the live schema.
pub const FALLBACK_ORDER_BY: &str = "t.id ASC";

/// Static description of one admin resource. Built once at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableAccessDescriptor {
    /// Base URL path, e.g. `/admin/banners`.
    pub path: String,
    /// Physical table, optionally schema-qualified (`public.banners`).
    pub table: String,
    /// ORDER BY expression over the table aliased as `t`.
    pub order_by: String,
    pub mutable_columns: BTreeSet<String>,
    /// Must be a subset of `mutable_columns`.
    pub required_on_create: BTreeSet<String>,
    /// Values for these columns are stored as JSON text.
    pub json_columns: BTreeSet<String>,
    /// Refresh `updated_at` on every update.
    pub touch_updated_at: bool,
}

fn column_set(columns: &[&str]) -> BTreeSet<String> {
    columns.iter().map(|c| (*c).to_string()).collect()
}

impl TableAccessDescriptor {
    pub fn new(path: impl Into<String>, table: impl Into<String>) -> Self {
        TableAccessDescriptor {
            path: path.into(),
            table: table.into(),
            order_by: String::new(),
            mutable_columns: BTreeSet::new(),
            required_on_create: BTreeSet::new(),
            json_columns: BTreeSet::new(),
            touch_updated_at: false,
        }
    }

    pub fn order_by(mut self, expr: &str) -> Self {
        self.order_by = expr.to_string();
        self
    }

    pub fn mutable(mut self, columns: &[&str]) -> Self {
        self.mutable_columns = column_set(columns);
        self
    }

    pub fn required(mut self, columns: &[&str]) -> Self {
        self.required_on_create = column_set(columns);
        self
    }

    pub fn json(mut self, columns: &[&str]) -> Self {
        self.json_columns = column_set(columns);
        self
    }

    pub fn touch_updated_at(mut self) -> Self {
        self.touch_updated_at = true;
        self
    }

    pub fn is_column_mutable(&self, column: &str) -> bool {
        self.mutable_columns.contains(column)
    }

    pub fn is_json_column(&self, column: &str) -> bool {
        self.json_columns.contains(column)
    }

    /// Configured ORDER BY, or `t.id ASC` when blank.
    pub fn effective_order_by(&self) -> &str {
        let trimmed = self.order_by.trim();
        if trimmed.is_empty() {
            FALLBACK_ORDER_BY
        } else {
            trimmed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_column_sets() {
        let d = TableAccessDescriptor::new("/admin/partners", "public.partners")
            .order_by("t.position ASC, t.id ASC")
            .mutable(&["name", "logo_url", "position"])
            .required(&["logo_url"]);
        assert!(d.is_column_mutable("logo_url"));
        assert!(!d.is_column_mutable("id"));
        assert!(!d.is_json_column("logo_url"));
        assert!(!d.touch_updated_at);
        assert_eq!(d.effective_order_by(), "t.position ASC, t.id ASC");
    }

    #[test]
    fn blank_order_falls_back_to_id() {
        let d = TableAccessDescriptor::new("/admin/x", "public.x").order_by("   ");
        assert_eq!(d.effective_order_by(), FALLBACK_ORDER_BY);
    }
}
