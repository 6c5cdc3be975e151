use crate::config::{env_or, Settings};
use crate::domain::record::Record;
use crate::error::StoreError;
use anyhow::Context;
use std::time::Duration;

pub mod memory;
pub mod postgres;

const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_CONNECT_RETRY_DELAY_SECS: u64 = 5;

/// Persistent set of rating-action records, keyed by ticker.
#[async_trait::async_trait]
pub trait CatalogAccess: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Record>, StoreError>;

    /// Inserts `record` unless its ticker is already present. Returns whether a row was written.
    async fn upsert(&self, record: &Record) -> Result<bool, StoreError>;
}

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}

/// Connects to `DATABASE_URL`, retrying while the database is still coming up.
pub async fn connect_with_retry(settings: &Settings) -> anyhow::Result<sqlx::PgPool> {
    let db_url = settings.require_database_url()?;
    let attempts = env_or("DB_CONNECT_ATTEMPTS", DEFAULT_CONNECT_ATTEMPTS).max(1);
    let delay = Duration::from_secs(env_or(
        "DB_CONNECT_RETRY_DELAY_SECS",
        DEFAULT_CONNECT_RETRY_DELAY_SECS,
    ));

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let res = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await;
        match res {
            Ok(pool) => {
                tracing::info!(attempt, "connected to database");
                return Ok(pool);
            }
            Err(err) => {
                if attempt >= attempts {
                    return Err(err).with_context(|| {
                        format!("connect DATABASE_URL failed after {attempts} attempts")
                    });
                }
                tracing::warn!(attempt, ?delay, error = %err, "database connect failed; retrying");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
