use crate::models::ValidationErrorResponse;
use crate::storage::PersistenceError;
use crate::validation::ValidationError;
use axum::{Json, http::StatusCode};
use tracing::error;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub code: Option<&'static str>,
}

impl AppError {
    /// Logs the underlying failure and keeps only a generic message for the client.
    pub fn persistence(message: &str, err: PersistenceError) -> Self {
        error!("{message}: {err}");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            code: None,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
            code: Some(err.code()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self.code {
            Some(code) => (
                self.status,
                Json(ValidationErrorResponse {
                    field: "value",
                    code,
                    message: self.message,
                }),
            )
                .into_response(),
            None => (self.status, self.message).into_response(),
        }
    }
}
