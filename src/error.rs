use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::db::{CollectiveSlot, DatabaseError};
use crate::scheduling::calendar::CalendarError;

/// One collective slot blocking an availability change, in the shape shown
/// to the end user.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictDetail {
    pub slot_id: uuid::Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl From<&CollectiveSlot> for ConflictDetail {
    fn from(slot: &CollectiveSlot) -> Self {
        Self {
            slot_id: slot.id,
            date: crate::scheduling::calendar::format_date(slot.date),
            start_time: format!("{:02}:{:02}", slot.start_time.hour(), slot.start_time.minute()),
            end_time: format!("{:02}:{:02}", slot.end_time.hour(), slot.end_time.minute()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Access denied: {0}")]
    Unauthorized(String),

    #[error("Not the owner of this resource: {0}")]
    Ownership(String),

    #[error("Requested availability overlaps {} scheduled group session(s)", conflicts.len())]
    CollectiveSlotConflict { conflicts: Vec<ConflictDetail> },

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Date range spans {days} days, maximum is {max}")]
    RangeTooLarge { days: i64, max: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::Sqlx(err))
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::RangeTooLarge { days, max } => AppError::RangeTooLarge { days, max },
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "Authentication failed"),
            AppError::Unauthorized(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::Ownership(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::CollectiveSlotConflict { .. } => (
                StatusCode::CONFLICT,
                "Availability conflicts with scheduled group sessions",
            ),
            AppError::InvalidRange(_) => (StatusCode::BAD_REQUEST, "Invalid date range"),
            AppError::RangeTooLarge { .. } => (StatusCode::BAD_REQUEST, "Date range too large"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
        };

        let mut error = json!({
            "message": error_message,
            "details": self.to_string(),
        });

        // Conflicts are user-facing: the caller must be able to name which
        // slot blocks which date and time.
        if let AppError::CollectiveSlotConflict { ref conflicts } = self {
            error["conflicts"] = json!(conflicts);
        }

        let body = Json(json!({ "error": error }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
