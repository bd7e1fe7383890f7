pub mod analysis;
pub mod debug;
pub mod submit;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;

use crate::models::{iso_now, HealthResponse};
use crate::AppError;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Server is up!".to_string(),
        timestamp: iso_now(),
    })
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

/// Replace empty 404s from file services with the JSON fallback body.
pub async fn json_not_found(response: Response) -> Response {
    if response.status() == StatusCode::NOT_FOUND {
        not_found().await.into_response()
    } else {
        response
    }
}

/// Turn a handler panic into the generic JSON 500.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
