use crate::config::CounterConfig;
use crate::errors::AppResult;
use crate::metrics::metric_counter;
use crate::store::CounterStore;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Fixed CORS set carried by every response, success or failure, so browser
/// callers on other origins can read the count.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "Content-Type"),
    ("Access-Control-Allow-Methods", "GET,OPTIONS"),
];

#[derive(Serialize)]
struct CountBody {
    count: i64,
}

pub fn router() -> Router {
    Router::new().route("/count", get(hit).options(preflight))
}

/// One hit, one increment. Request payload is ignored entirely.
async fn hit(
    Extension(store): Extension<Arc<dyn CounterStore>>,
    Extension(config): Extension<CounterConfig>,
) -> AppResult<impl IntoResponse> {
    let count = store.increment(&config.counter_id).await?;
    metric_counter("visits_total").increment(1);
    debug!("counter {} is now {count}", config.counter_id);
    Ok((CORS_HEADERS, Json(CountBody { count })))
}

async fn preflight() -> impl IntoResponse {
    CORS_HEADERS.into_response()
}
