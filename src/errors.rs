use crate::routes::CORS_HEADERS;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Catch-all for anything that goes wrong while touching the store.
/// Connectivity, permissions, malformed rows: all of it surfaces as a 500
/// with a JSON error body, never a raw protocol failure. Nothing is retried.
#[derive(Debug)]
pub struct AppError(anyhow::Error);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self(value.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self(value)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            CORS_HEADERS,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
