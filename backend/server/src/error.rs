use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Name is required")]
    MissingName,

    #[error("Malformed payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("SMTP relay not configured")]
    NotConfigured,

    #[error("SMTP connection verification failed")]
    Verification,

    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Email(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl IntoResponse for AppError {
    /// Internal detail stays in the logs; callers only get a generic,
    /// actionable message.
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingName => (StatusCode::BAD_REQUEST, "Name is required"),
            AppError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SMTP not configured. Check server logs.",
            ),
            AppError::Parse { .. }
            | AppError::Verification { .. }
            | AppError::Address { .. }
            | AppError::Email { .. }
            | AppError::Smtp { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to send email. Submission logged to server.",
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::MissingName.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotConfigured.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Verification.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
