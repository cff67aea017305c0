use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Invalid date format. Use ISO format (YYYY-MM-DD)")]
    BadDateFormat,

    #[error("Task not found")]
    NotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) | AppError::EmptyTitle | AppError::BadDateFormat => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound | AppError::RouteNotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::MalformedRequest(detail) => {
                debug!("rejected request body: {}", detail);
                "Invalid input, JSON required".to_string()
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                format!("Internal Server Error: {}", e)
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(AppError::EmptyTitle.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::BadDateFormat.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::MalformedRequest("eof".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_records_and_routes_are_not_found() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::RouteNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_failures_are_internal_errors() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
