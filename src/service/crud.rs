//! Generic CRUD execution for any registered table.
//!
//! Every mutation is one statement with a `to_jsonb` projection of the affected
//! row, so a response always reflects exactly what was written.

use crate::cascade::first_success;
use crate::config::{TableAccessDescriptor, FALLBACK_ORDER_BY};
use crate::db::DbContext;
use crate::error::AppError;
use crate::probe::SchemaProber;
use crate::service::validation::{FieldErrors, RequestValidator, ResourcePayload};
use crate::sql::{self, coerce_value, BindValue, QueryBuf};
use serde_json::Value;
use std::collections::HashMap;

pub struct CrudService;

impl CrudService {
    /// All rows as a JSON array in the descriptor's order. If that order does not
    /// match the live schema, retries once ordered by id.
    pub async fn list(ctx: &DbContext<'_>, descriptor: &TableAccessDescriptor) -> Result<Value, AppError> {
        let preferred = descriptor.effective_order_by();
        let mut orders = vec![preferred];
        if preferred != FALLBACK_ORDER_BY {
            orders.push(FALLBACK_ORDER_BY);
        }
        let table = descriptor.table.as_str();
        let data = first_success("data", &orders, |order| {
            let sql = sql::select_list(table, order);
            async move {
                tracing::debug!(sql = %sql, "query");
                ctx.run(sqlx::query_scalar::<_, Option<Value>>(&sql).fetch_one(ctx.pool())).await
            }
        })
        .await?;
        Ok(match data {
            Some(v @ Value::Array(_)) => v,
            _ => Value::Array(Vec::new()),
        })
    }

    pub async fn fetch_one(ctx: &DbContext<'_>, descriptor: &TableAccessDescriptor, id: i64) -> Result<Value, AppError> {
        let sql = sql::select_by_id(&descriptor.table);
        tracing::debug!(sql = %sql, id, "query");
        let row = ctx
            .run(sqlx::query_scalar::<_, Value>(&sql).bind(id).fetch_optional(ctx.pool()))
            .await?;
        row.ok_or(AppError::NotFound)
    }

    /// Insert exactly the supplied columns and return the stored row.
    pub async fn create(
        ctx: &DbContext<'_>,
        descriptor: &TableAccessDescriptor,
        payload: &ResourcePayload,
    ) -> Result<Value, AppError> {
        RequestValidator::validate_create(descriptor, payload)?;
        let values = coerce_payload(descriptor, payload)?;
        let column_types = Self::column_types(ctx, descriptor, &values).await?;
        check_integer_columns(&values, &column_types)?;
        let q = sql::insert(&descriptor.table, values, &column_types);
        Self::execute_returning_one(ctx, q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Update the supplied columns of one row. Last write wins.
    pub async fn update(
        ctx: &DbContext<'_>,
        descriptor: &TableAccessDescriptor,
        id: i64,
        payload: &ResourcePayload,
    ) -> Result<Value, AppError> {
        RequestValidator::validate_update(descriptor, payload)?;
        if payload.is_empty() && !descriptor.touch_updated_at {
            return Err(AppError::EmptyPayload);
        }
        let values = coerce_payload(descriptor, payload)?;
        let column_types = Self::column_types(ctx, descriptor, &values).await?;
        check_integer_columns(&values, &column_types)?;
        let q = sql::update(&descriptor.table, id, values, descriptor.touch_updated_at, &column_types);
        Self::execute_returning_one(ctx, q).await?.ok_or(AppError::NotFound)
    }

    /// Delete one row and return its prior contents.
    pub async fn delete(ctx: &DbContext<'_>, descriptor: &TableAccessDescriptor, id: i64) -> Result<Value, AppError> {
        let q = QueryBuf {
            sql: sql::delete(&descriptor.table),
            params: vec![BindValue::Int(id)],
        };
        Self::execute_returning_one(ctx, q).await?.ok_or(AppError::NotFound)
    }

    async fn column_types(
        ctx: &DbContext<'_>,
        descriptor: &TableAccessDescriptor,
        values: &[(String, BindValue)],
    ) -> Result<HashMap<String, String>, AppError> {
        if values.is_empty() {
            return Ok(HashMap::new());
        }
        SchemaProber::new(ctx).column_types(&descriptor.table).await
    }

    async fn execute_returning_one(ctx: &DbContext<'_>, q: QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_scalar::<_, Value>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        ctx.run(query.fetch_optional(ctx.pool())).await
    }
}

/// Coerce every payload field, in key order.
fn coerce_payload(
    descriptor: &TableAccessDescriptor,
    payload: &ResourcePayload,
) -> Result<Vec<(String, BindValue)>, AppError> {
    payload
        .iter()
        .map(|(column, value)| Ok((column.clone(), coerce_value(descriptor, column, value)?)))
        .collect()
}

const INTEGER_TYPES: [&str; 3] = ["smallint", "integer", "bigint"];

/// A fractional number would be rounded by the `::integer` cast; reject it instead.
fn check_integer_columns(
    values: &[(String, BindValue)],
    column_types: &HashMap<String, String>,
) -> Result<(), AppError> {
    let errors: FieldErrors = values
        .iter()
        .filter(|(column, value)| {
            matches!(value, BindValue::Float(_))
                && column_types
                    .get(column)
                    .is_some_and(|ty| INTEGER_TYPES.contains(&ty.as_str()))
        })
        .map(|(column, _)| (column.clone(), "must be an integer".to_string()))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationFailed(errors))
    }
}
