//! Builds the admin CRUD statements for a table access descriptor.
//! Every statement aliases the table as `t` and returns rows as JSON via `to_jsonb`.

use crate::sql::BindValue;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL.
pub fn quote_identifier(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified table name part by part.
pub fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(|part| quote_identifier(part.trim()))
        .collect::<Vec<_>>()
        .join(".")
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: BindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// `$n`, cast to the column's declared type when the catalog knows it.
fn placeholder(n: usize, column: &str, column_types: &HashMap<String, String>) -> String {
    column_types
        .get(column)
        .map(|t| format!("${}::{}", n, t))
        .unwrap_or_else(|| format!("${}", n))
}

/// All rows as one JSON array; `[]` for an empty table.
pub fn select_list(table: &str, order_by: &str) -> String {
    format!(
        "SELECT COALESCE(json_agg(to_jsonb(t) ORDER BY {}), '[]'::json) FROM {} t",
        order_by,
        quote_table_name(table)
    )
}

/// One row by id. Caller binds the id as `$1`.
pub fn select_by_id(table: &str) -> String {
    format!("SELECT to_jsonb(t) FROM {} t WHERE t.id = $1", quote_table_name(table))
}

/// INSERT of exactly the given columns; `DEFAULT VALUES` when there are none.
pub fn insert(table: &str, values: Vec<(String, BindValue)>, column_types: &HashMap<String, String>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quote_table_name(table);
    if values.is_empty() {
        q.sql = format!(
            "WITH ins AS (INSERT INTO {} DEFAULT VALUES RETURNING *) SELECT to_jsonb(ins) FROM ins",
            table
        );
        return q;
    }
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (column, value) in values {
        let n = q.push_param(value);
        placeholders.push(placeholder(n, &column, column_types));
        cols.push(quote_identifier(&column));
    }
    q.sql = format!(
        "WITH ins AS (INSERT INTO {} ({}) VALUES ({}) RETURNING *) SELECT to_jsonb(ins) FROM ins",
        table,
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET exactly the given columns, plus `updated_at = NOW()` when asked.
/// The id is bound last.
pub fn update(
    table: &str,
    id: i64,
    values: Vec<(String, BindValue)>,
    touch_updated_at: bool,
    column_types: &HashMap<String, String>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(values.len() + 1);
    for (column, value) in values {
        let n = q.push_param(value);
        sets.push(format!("{} = {}", quote_identifier(&column), placeholder(n, &column, column_types)));
    }
    if touch_updated_at {
        sets.push(format!("{} = NOW()", quote_identifier("updated_at")));
    }
    let id_param = q.push_param(BindValue::Int(id));
    q.sql = format!(
        "WITH upd AS (UPDATE {} SET {} WHERE id = ${} RETURNING *) SELECT to_jsonb(upd) FROM upd",
        quote_table_name(table),
        sets.join(", "),
        id_param
    );
    q
}

/// DELETE by id, returning the removed row. Caller binds the id as `$1`.
pub fn delete(table: &str) -> String {
    format!(
        "WITH del AS (DELETE FROM {} WHERE id = $1 RETURNING *) SELECT to_jsonb(del) FROM del",
        quote_table_name(table)
    )
}
