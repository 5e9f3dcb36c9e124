//! Cascading read queries: try equivalent statements in order until one runs.
//!
//! Deployments of the site drifted apart (renamed columns, missing timestamps, a
//! misspelled `tunning` table). Public reads therefore carry a fixed list of
//! query shapes and use the first one the live schema accepts. Only read-only
//! statements go through here.

use crate::db::DbContext;
use crate::error::{AppError, ConfigError};
use sqlx::postgres::PgRow;
use sqlx::FromRow;
use std::future::Future;

/// Ordered candidate statements for one read.
#[derive(Clone, Copy, Debug)]
pub struct QueryCandidates {
    /// Resource name used in logs and the client error message.
    pub label: &'static str,
    pub queries: &'static [&'static str],
}

impl QueryCandidates {
    pub const fn new(label: &'static str, queries: &'static [&'static str]) -> Self {
        QueryCandidates { label, queries }
    }

    /// Run the candidates against the database and decode rows as `T`.
    pub async fn fetch_all<T>(&self, ctx: &DbContext<'_>) -> Result<Vec<T>, AppError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        first_success(self.label, self.queries, |sql| {
            let sql = *sql;
            async move { ctx.run(sqlx::query_as::<_, T>(sql).fetch_all(ctx.pool())).await }
        })
        .await
    }
}

/// Run `attempt` on each candidate in order and return the first success.
/// Later candidates are never attempted once one succeeds. Deadline expiry
/// stops the cascade immediately.
pub async fn first_success<Q, T, F, Fut>(label: &'static str, candidates: &[Q], mut attempt: F) -> Result<T, AppError>
where
    F: FnMut(&Q) -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if candidates.is_empty() {
        return Err(ConfigError::EmptyCandidates(label).into());
    }
    let mut last_err = None;
    for (i, candidate) in candidates.iter().enumerate() {
        match attempt(candidate).await {
            Ok(out) => {
                if i > 0 {
                    tracing::debug!(resource = label, candidate = i, "fallback query succeeded");
                }
                return Ok(out);
            }
            Err(AppError::DeadlineExceeded) => return Err(AppError::DeadlineExceeded),
            Err(e) => {
                tracing::debug!(resource = label, candidate = i, error = %e, "query candidate failed");
                last_err = Some(e);
            }
        }
    }
    if let Some(e) = last_err {
        tracing::error!(resource = label, error = %e, "all query candidates failed");
    }
    Err(AppError::QueryFailed(label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn first_success_wins_and_stops() {
        let executed = RefCell::new(Vec::new());
        let out = first_success("demo", &["q1", "q2", "q3"], |q| {
            executed.borrow_mut().push(*q);
            let q = *q;
            async move {
                match q {
                    "q1" => Err(AppError::BadRequest("column does not exist".into())),
                    other => Ok(format!("rows from {}", other)),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, "rows from q2");
        assert_eq!(*executed.borrow(), vec!["q1", "q2"]);
    }

    #[tokio::test]
    async fn all_failing_is_query_failed() {
        let res: Result<(), _> = first_success("tuning", &[1, 2], |_| async {
            Err(AppError::BadRequest("relation does not exist".into()))
        })
        .await;
        assert!(matches!(res, Err(AppError::QueryFailed("tuning"))));
    }

    #[tokio::test]
    async fn empty_candidates_is_configuration_error() {
        let none: [&str; 0] = [];
        let res: Result<(), _> = first_success("banners", &none, |_| async { Ok(()) }).await;
        assert!(matches!(res, Err(AppError::Config(ConfigError::EmptyCandidates("banners")))));
    }

    #[tokio::test]
    async fn deadline_stops_cascade() {
        let calls = RefCell::new(0);
        let res: Result<(), _> = first_success("x", &[1, 2, 3], |_| {
            *calls.borrow_mut() += 1;
            async { Err(AppError::DeadlineExceeded) }
        })
        .await;
        assert!(matches!(res, Err(AppError::DeadlineExceeded)));
        assert_eq!(*calls.borrow(), 1);
    }
}
