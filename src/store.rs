use crate::config;
use crate::errors::AppResult;
use axum::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::env;

/// The key-value store holding the counter record. Object safe so tests can
/// swap in fakes; the real handle lives for the whole process and is shared
/// through an `Extension<Arc<dyn CounterStore>>`.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Current value of the counter, `None` when no record exists yet.
    async fn current(&self, id: &str) -> AppResult<Option<i64>>;

    /// Upsert-and-increment in a single statement, returning the new value.
    /// The first call against an absent record yields 1. Concurrent callers
    /// cannot lose updates; the increment happens inside the store.
    async fn increment(&self, id: &str) -> AppResult<i64>;
}

pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    /// Connects using `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`, with the
    /// table name from `COUNTER_TABLE` (default `visitors`).
    pub async fn connect() -> Self {
        dotenvy::dotenv().ok();
        crate::app::logger();
        let database_url =
            env::var("DATABASE_URL").expect("DATABASE_URL environment variable not set");
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&database_url)
            .await
            .unwrap();
        Self::with_pool(pool, &config::table_from_env())
            .await
            .unwrap()
    }

    /// Wraps an existing pool and bootstraps the counter table.
    pub async fn with_pool(pool: SqlitePool, table: &str) -> AppResult<Self> {
        let store = Self {
            pool,
            table: table.to_string(),
        };
        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (id TEXT PRIMARY KEY, count INTEGER NOT NULL)"#,
            store.table
        ))
        .execute(&store.pool)
        .await?;
        Ok(store)
    }
}

#[async_trait]
impl CounterStore for SqliteStore {
    async fn current(&self, id: &str) -> AppResult<Option<i64>> {
        let row = sqlx::query(&format!(
            r#"SELECT count FROM "{}" WHERE id = ?"#,
            self.table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(match row {
            Some(row) => Some(row.try_get("count")?),
            None => None,
        })
    }

    async fn increment(&self, id: &str) -> AppResult<i64> {
        let row = sqlx::query(&format!(
            r#"INSERT INTO "{}" (id, count) VALUES (?, 1)
               ON CONFLICT(id) DO UPDATE SET count = count + 1
               RETURNING count"#,
            self.table
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("count")?)
    }
}
