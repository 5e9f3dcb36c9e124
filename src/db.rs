//! Pool setup and per-request database deadlines.

use crate::error::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(12);

const PING_ATTEMPTS: u32 = 3;
const PING_TIMEOUT: Duration = Duration::from_secs(20);
const PING_RETRY_PAUSE: Duration = Duration::from_secs(2);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pool handle bound to a request deadline. Every statement run through it
/// is aborted once the deadline passes.
#[derive(Clone, Copy)]
pub struct DbContext<'a> {
    pool: &'a PgPool,
    deadline: Instant,
}

impl<'a> DbContext<'a> {
    pub fn with_timeout(pool: &'a PgPool, timeout: Duration) -> Self {
        DbContext {
            pool,
            deadline: Instant::now() + timeout,
        }
    }

    pub fn read(pool: &'a PgPool) -> Self {
        Self::with_timeout(pool, READ_TIMEOUT)
    }

    pub fn write(pool: &'a PgPool) -> Self {
        Self::with_timeout(pool, WRITE_TIMEOUT)
    }

    pub fn pool(&self) -> &'a PgPool {
        self.pool
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Run a driver future under the deadline.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(res) => res.map_err(AppError::from),
            Err(_) => Err(AppError::DeadlineExceeded),
        }
    }
}

/// Open the pool and make sure the database answers, retrying the first ping.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .max_lifetime(Duration::from_secs(3600))
        .connect_lazy(database_url)?;

    let mut last_err = None;
    for attempt in 1..=PING_ATTEMPTS {
        let ctx = DbContext::with_timeout(&pool, PING_TIMEOUT);
        match ctx.run(sqlx::query("SELECT 1").execute(ctx.pool())).await {
            Ok(_) => return Ok(pool),
            Err(e) => {
                tracing::warn!(attempt, max = PING_ATTEMPTS, error = %e, "database ping failed");
                last_err = Some(e);
            }
        }
        if attempt < PING_ATTEMPTS {
            tokio::time::sleep(PING_RETRY_PAUSE).await;
        }
    }
    pool.close().await;
    Err(last_err.unwrap_or(AppError::DeadlineExceeded))
}

/// True when the database answers within the health deadline.
pub async fn ping(pool: &PgPool) -> bool {
    let ctx = DbContext::with_timeout(pool, HEALTH_TIMEOUT);
    ctx.run(sqlx::query("SELECT 1").execute(ctx.pool())).await.is_ok()
}
