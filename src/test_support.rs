//! Shared helpers for tests that need a stand-in analysis webhook.

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Received = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

/// Start a local analyzer that records every POST and answers with `status`.
pub async fn spawn_analyzer(status: StatusCode) -> (String, Received) {
    spawn_delayed_analyzer(status, Duration::ZERO).await
}

/// Like [`spawn_analyzer`], but waits `delay` before answering.
pub async fn spawn_delayed_analyzer(status: StatusCode, delay: Duration) -> (String, Received) {
    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let app = Router::new().route(
        "/webhook",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let sink = sink.clone();
            async move {
                sink.lock().unwrap().push((headers, body));
                tokio::time::sleep(delay).await;
                (status, "accepted")
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/webhook", addr), received)
}

/// URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/webhook", addr)
}
