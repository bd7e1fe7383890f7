use crate::{AppError, AppState};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::SaveResponse;

/// Latest analysis in the shape the frontend renders, or `{}` while pending.
///
/// Also served as `/get_recommendations` for older frontends.
pub async fn get_ai_response(State(state): State<Arc<AppState>>) -> Response {
    match state.results.get_formatted().await {
        Ok(Some(result)) => Json(result).into_response(),
        Ok(None) => Json(json!({})).into_response(),
        Err(e) => {
            tracing::error!("Error retrieving AI response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Could not load AI response" })),
            )
                .into_response()
        }
    }
}

/// Callback for the analyzer. Any JSON value is stored as-is.
pub async fn save_ai_response(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    match store_result(&state, body).await {
        Ok(()) => {
            tracing::info!("AI response saved successfully");
            Json(SaveResponse {
                success: true,
                message: Some("AI response saved".to_string()),
                error: None,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to save AI response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SaveResponse {
                    success: false,
                    message: None,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

async fn store_result(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<(), AppError> {
    let result: Value = serde_json::from_slice(&body?)?;
    state.results.set(result).await
}
