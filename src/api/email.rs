use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::models::{
    BulkSendRequest, BulkSendResponse, SendEmailResponse, SendRequest, TestConfigResponse,
};
use crate::state::AppState;
use crate::validation::{validate_bulk, validate_send};

/// Email routes
pub fn email_routes() -> Router<AppState> {
    Router::new()
        .route("/send-email", post(send_email))
        .route("/send-bulk", post(send_bulk))
        .route("/test-config", post(test_config))
}

/// POST /send-email - Send one email
async fn send_email(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendEmailResponse>> {
    let Json(request) = payload?;
    let send = validate_send(request)?;

    let result = state.email.send_one(&send.to, &send.content).await;

    match (result.message_id, result.error) {
        (Some(message_id), _) => Ok(Json(SendEmailResponse {
            success: true,
            message_id,
            message: "Email sent successfully",
        })),
        (None, error) => {
            let details = error.unwrap_or_default();
            tracing::error!(recipient = %send.to, error = %details, "Error sending email");
            Err(AppError::delivery("Failed to send email", details))
        }
    }
}

/// POST /send-bulk - Send the same email to each address
///
/// Per-recipient failures stay in `results`; the request itself still succeeds.
async fn send_bulk(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BulkSendRequest>, JsonRejection>,
) -> Result<Json<BulkSendResponse>> {
    let Json(request) = payload?;
    let bulk = validate_bulk(request)?;

    tracing::info!(recipients = bulk.recipients.len(), "Bulk send requested");

    let results = state.email.send_many(&bulk.recipients, &bulk.content).await;

    Ok(Json(BulkSendResponse {
        success: true,
        message: "Bulk email processing completed",
        results,
    }))
}

/// POST /test-config - Verify SMTP connectivity and credentials
async fn test_config(State(state): State<AppState>) -> Result<Json<TestConfigResponse>> {
    state.email.verify().await.map_err(|e| {
        tracing::error!(error = %e, "SMTP configuration error");
        AppError::delivery("SMTP configuration is invalid", e)
    })?;

    Ok(Json(TestConfigResponse {
        success: true,
        message: "SMTP configuration is valid and ready to send emails",
    }))
}
