use crate::{AppState, Result};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::models::{SubmitFailure, SubmitResponse, SubmittedRecord};

/// Save an intake form, reset the analysis slot and trigger the analyzer.
///
/// The body is read as JSON whatever its content type. A body that cannot be
/// read (for example one over the size limit) fails like malformed JSON. A
/// webhook failure still counts as a saved submission and answers 202.
pub async fn submit_intake(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    tracing::info!("Received intake submission");

    let record = match persist_submission(&state, body).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Failed to save data: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SubmitFailure {
                    success: false,
                    error: "Failed to process submission".to_string(),
                    details: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    match state.relay.notify(&record).await {
        Ok(()) => {
            tracing::info!("Successfully triggered analysis webhook");
            (
                StatusCode::OK,
                Json(SubmitResponse {
                    success: true,
                    message: "Data saved and AI analysis triggered".to_string(),
                    user_id: Some(record.user_id().to_string()),
                    error: None,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Webhook error for user {}: {}", record.user_id(), e);
            (
                StatusCode::ACCEPTED,
                Json(SubmitResponse {
                    success: true,
                    message: "Data saved but AI analysis failed to trigger".to_string(),
                    user_id: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

async fn persist_submission(
    state: &AppState,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<SubmittedRecord> {
    let payload: Value = serde_json::from_slice(&body?)?;
    let record = SubmittedRecord::from_submission(payload)?;
    tracing::debug!("Submission carries {} fields", record.fields().len());

    let count = state.intake.append(record.clone()).await?;
    tracing::info!(
        "User data saved with ID: {} ({} records stored)",
        record.user_id(),
        count
    );

    // A new submission invalidates whatever the analyzer sent last.
    state.results.clear().await?;

    Ok(record)
}
