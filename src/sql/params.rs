//! Convert serde_json::Value payload fields to values sqlx can bind.

use crate::config::TableAccessDescriptor;
use crate::error::AppError;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, Postgres};
use sqlx::Type;

/// A value that can be bound to a PostgreSQL query. Each variant reports its own
/// wire type; the statement casts the placeholder to the column type.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Serialized JSON, bound as text.
    JsonText(String),
}

/// Coerce one payload field for `column` of `descriptor`.
///
/// JSON columns always get the serialized value; integral numbers bind as integers;
/// everything else binds as-is.
pub fn coerce_value(descriptor: &TableAccessDescriptor, column: &str, value: &Value) -> Result<BindValue, AppError> {
    if descriptor.is_json_column(column) {
        let raw = serde_json::to_string(value).map_err(|_| AppError::InvalidValue {
            column: column.to_string(),
        })?;
        return Ok(BindValue::JsonText(raw));
    }
    Ok(match value {
        Value::Null => BindValue::Null,
        Value::Bool(b) => BindValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                BindValue::Int(i)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    BindValue::Int(f as i64)
                } else {
                    BindValue::Float(f)
                }
            }
        }
        Value::String(s) => BindValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => BindValue::JsonText(value.to_string()),
    })
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        match self {
            BindValue::Null => Ok(IsNull::Yes),
            BindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf),
            BindValue::Int(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Float(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Text(s) | BindValue::JsonText(s) => <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf),
        }
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            BindValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
            BindValue::Int(_) => <i64 as Type<Postgres>>::type_info(),
            BindValue::Float(_) => <f64 as Type<Postgres>>::type_info(),
            BindValue::Null | BindValue::Text(_) | BindValue::JsonText(_) => <String as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        <String as Type<Postgres>>::type_info()
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
