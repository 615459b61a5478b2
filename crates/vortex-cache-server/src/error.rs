use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use vortex_cache_core::CacheError;

#[derive(Debug)]
pub enum AppError {
    /// Entrada no encontrada
    NotFound { key: String },

    /// Error del cache
    Cache(CacheError),
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound { key } => (
                StatusCode::NOT_FOUND,
                "Not Found",
                format!("No cache entry for key '{}'", key),
            ),
            AppError::Cache(err @ CacheError::Unavailable { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                err.to_string(),
            ),
            AppError::Cache(err @ CacheError::Timeout { .. }) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Gateway Timeout",
                err.to_string(),
            ),
            AppError::Cache(err) => {
                tracing::error!(error = %err, "Cache operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    err.to_string(),
                )
            },
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
