//! Schema compatibility checks against the PostgreSQL catalog.
//!
//! Table names may be schema-qualified (`public.work_post`); unqualified names are
//! looked up in `public`.

use crate::db::DbContext;
use crate::error::AppError;
use std::collections::HashMap;

const DEFAULT_SCHEMA: &str = "public";

fn split_table(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((schema, table)) => (schema.trim(), table.trim()),
        None => (DEFAULT_SCHEMA, name.trim()),
    }
}

pub struct SchemaProber<'c, 'p> {
    ctx: &'c DbContext<'p>,
}

impl<'c, 'p> SchemaProber<'c, 'p> {
    pub fn new(ctx: &'c DbContext<'p>) -> Self {
        SchemaProber { ctx }
    }

    pub async fn table_exists(&self, name: &str) -> Result<bool, AppError> {
        let (schema, table) = split_table(name);
        let q = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = $1 AND table_name = $2)",
        )
        .bind(schema)
        .bind(table);
        self.ctx.run(q.fetch_one(self.ctx.pool())).await
    }

    pub async fn column_exists(&self, table: &str, column: &str) -> Result<bool, AppError> {
        let (schema, table) = split_table(table);
        let q = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
             WHERE table_schema = $1 AND table_name = $2 AND column_name = $3)",
        )
        .bind(schema)
        .bind(table)
        .bind(column);
        self.ctx.run(q.fetch_one(self.ctx.pool())).await
    }

    /// First candidate that exists, in the given order.
    pub async fn resolve_preferred_table<'n>(&self, candidates: &[&'n str]) -> Result<&'n str, AppError> {
        for &name in candidates {
            if self.table_exists(name).await? {
                return Ok(name);
            }
        }
        Err(AppError::NoCompatibleTable(candidates.iter().map(|s| s.to_string()).collect()))
    }

    /// Declared SQL type of every live column, e.g. `integer`, `jsonb`,
    /// `timestamp with time zone`. Empty when the table does not exist.
    pub async fn column_types(&self, table: &str) -> Result<HashMap<String, String>, AppError> {
        let (schema, table) = split_table(table);
        let q = sqlx::query_as::<_, (String, String)>(
            "SELECT a.attname::text, format_type(a.atttypid, a.atttypmod) \
             FROM pg_catalog.pg_attribute a \
             JOIN pg_catalog.pg_class c ON c.oid = a.attrelid \
             JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE n.nspname = $1 AND c.relname = $2 AND a.attnum > 0 AND NOT a.attisdropped",
        )
        .bind(schema)
        .bind(table);
        let rows = self.ctx.run(q.fetch_all(self.ctx.pool())).await?;
        Ok(rows.into_iter().collect())
    }
}
