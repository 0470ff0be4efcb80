//! Error type shared by every handler.
//!
//! Bodies follow two shapes: `{"detail": "..."}` for request-level failures
//! and a field map such as `{"row": ["..."]}` for validation failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};

pub const UNIQUE_VIOLATION: &str = "23505";
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

pub const NON_FIELD_ERRORS: &str = "non_field_errors";
pub const TICKET_UNIQUE_MESSAGE: &str =
    "The fields performance, row, seat must make a unique set.";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,

    #[error("Invalid token.")]
    InvalidToken,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Not found.")]
    NotFound,

    #[error("Invalid page.")]
    InvalidPage,

    /// Field-keyed error map, returned to the client as is.
    #[error("Validation failed: {0}")]
    Validation(Value),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Single message attached to a single field.
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(name.to_string(), json!([message.into()]));
        AppError::Validation(Value::Object(map))
    }

    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field(NON_FIELD_ERRORS, message)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound | AppError::InvalidPage => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(err) => classify_sqlx_error(err).0,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, errors),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "detail": msg })),
            AppError::Database(err) => classify_sqlx_error(&err),
            other => (other.status(), json!({ "detail": other.to_string() })),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut map = Map::new();
        for (field, errs) in errors.field_errors() {
            let messages: Vec<Value> = errs
                .iter()
                .map(|e| {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({}).", e.code));
                    Value::String(msg)
                })
                .collect();
            map.insert(field.to_string(), Value::Array(messages));
        }
        AppError::Validation(Value::Object(map))
    }
}

/// Maps a sqlx error onto a status and body.
///
/// Named unique constraints become validation errors on the field they guard;
/// foreign key violations mean the payload referenced a missing row.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, Value) {
    match err {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
        sqlx::Error::Database(db_err) => {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => match db_err.constraint() {
                    Some("uq_genres_name") => {
                        return (
                            StatusCode::BAD_REQUEST,
                            json!({ "name": ["genre with this name already exists."] }),
                        )
                    }
                    Some("uq_tickets_performance_row_seat") => {
                        return (
                            StatusCode::BAD_REQUEST,
                            json!({ NON_FIELD_ERRORS: [TICKET_UNIQUE_MESSAGE] }),
                        )
                    }
                    _ => {}
                },
                Some(FOREIGN_KEY_VIOLATION) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        json!({ "detail": "Referenced object does not exist." }),
                    )
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "A server error occurred." }),
            )
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "A server error occurred." }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn auth_errors_use_detail_body() {
        let (status, body) = body_of(AppError::NotAuthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Authentication credentials were not provided.");

        let (status, body) = body_of(AppError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["detail"], "You do not have permission to perform this action.");
    }

    #[tokio::test]
    async fn field_error_is_returned_verbatim() {
        let (status, body) = body_of(AppError::field("row", "out of range")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "row": ["out of range"] }));
    }

    #[tokio::test]
    async fn row_not_found_is_404() {
        let (status, body) = body_of(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not found.");
    }

    #[tokio::test]
    async fn unexpected_database_error_is_not_leaked() {
        let (status, body) = body_of(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "A server error occurred.");
    }

    #[test]
    fn invalid_page_is_not_found() {
        assert_eq!(AppError::InvalidPage.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidPage.to_string(), "Invalid page.");
    }
}
