//! Read-only views of the raw stores, for checking what the analyzer saw.

use crate::{AppState, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn latest_user(State(state): State<Arc<AppState>>) -> Result<Response> {
    let response = match state.intake.latest().await? {
        Some(record) => Json(record).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "No user data found" })),
        )
            .into_response(),
    };
    Ok(response)
}

pub async fn ai_response(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.results.get().await?))
}
