mod app;
mod config;
mod errors;
mod metrics;
mod routes;
mod store;

pub mod prelude {
    pub use super::app::App;
    pub use super::config::{table_from_env, CounterConfig};
    pub use super::errors::{AppError, AppResult};
    pub use super::metrics::metric_counter;
    pub use super::routes::{router, CORS_HEADERS};
    pub use super::store::{CounterStore, SqliteStore};
    pub use axum::response::IntoResponse;
    pub use axum::routing::get;
    pub use axum::{Extension, Json, Router};
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}
