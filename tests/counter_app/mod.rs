#![allow(dead_code)]
use axum::async_trait;
use hitcount::prelude::*;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub async fn memory_pool() -> SqlitePool {
    // Single connection, or every checkout would see its own :memory: db.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

pub async fn sqlite_store() -> AppResult<Arc<SqliteStore>> {
    Ok(Arc::new(
        SqliteStore::with_pool(memory_pool().await, "visitors").await?,
    ))
}

pub fn app(store: Arc<dyn CounterStore>) -> App {
    App::new()
        .router(router())
        .inject(store)
        .inject(CounterConfig::default())
}

/// Stand-in for a store that is down or misbehaving.
pub struct FailingStore;

#[async_trait]
impl CounterStore for FailingStore {
    async fn current(&self, _id: &str) -> AppResult<Option<i64>> {
        Err(anyhow::anyhow!("store unavailable").into())
    }

    async fn increment(&self, _id: &str) -> AppResult<i64> {
        Err(anyhow::anyhow!("store unavailable").into())
    }
}
