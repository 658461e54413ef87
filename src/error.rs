use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use thiserror::Error;

use crate::domain::PlanType;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{plan_type} period overlaps an existing one ending {due_date}")]
    Overlap {
        plan_type: PlanType,
        due_date: DateTime<Utc>,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Database(ref msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error occurred" }),
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            // The conflicting due date rides along so the caller can pick a
            // valid start date without a second round trip.
            AppError::Overlap {
                ref plan_type,
                due_date,
            } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": format!(
                        "{} period overlaps an existing one ending {}",
                        plan_type,
                        due_date.to_rfc3339(),
                    ),
                    "conflicting_due_date": due_date.to_rfc3339(),
                }),
            ),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
