use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, get_service, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::{handlers, AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Intake form
        .route(
            "/",
            get_service(ServeFile::new(&state.config.index_file))
                .layer(middleware::map_response(handlers::json_not_found)),
        )
        .route("/health", get(handlers::health_check))
        .route("/submit", post(handlers::submit::submit_intake))
        // Analysis results (frontend polls, analyzer posts back)
        .route("/get-ai-response", get(handlers::analysis::get_ai_response))
        .route(
            "/get_recommendations",
            get(handlers::analysis::get_ai_response),
        )
        .route(
            "/save-ai-response",
            post(handlers::analysis::save_ai_response),
        )
        // Debug views
        .route("/debug/latest-user", get(handlers::debug::latest_user))
        .route("/debug/ai-response", get(handlers::debug::ai_response))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.config.max_request_body_bytes()))
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
