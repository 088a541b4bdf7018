use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Request body failed the per-endpoint field checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: to, subject, and text/html are required")]
    MissingSendFields,

    #[error("emails array is required and must not be empty")]
    MissingRecipients,

    #[error("subject and text/html are required")]
    MissingBulkFields,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{context}: {details}")]
    Delivery {
        context: &'static str,
        details: String,
    },
}

impl AppError {
    pub fn delivery(context: &'static str, details: impl ToString) -> Self {
        AppError::Delivery {
            context,
            details: details.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": err.to_string() }),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Delivery { context, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": context, "details": details }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
