//! Outbound relay to the n8n analysis workflow.
//!
//! One POST per submission, no retries. The analyzer answers later by calling
//! `/save-ai-response`, so a failed trigger only degrades the submit response.

use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Webhook returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Clone)]
pub struct WebhookRelay {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookRelay {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.webhook_url.clone(), config.webhook_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward a submitted record to the analyzer.
    ///
    /// Blocks until the webhook answers or the timeout elapses.
    pub async fn notify<T: Serialize + ?Sized>(&self, record: &T) -> Result<(), RelayError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header("Content-Type", "application/json")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(RelayError::Status { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_analyzer, spawn_delayed_analyzer, unreachable_url};
    use serde_json::json;

    #[tokio::test]
    async fn test_notify_posts_record_as_json() {
        let (url, received) = spawn_analyzer(StatusCode::OK).await;
        let relay = WebhookRelay::new(url, Duration::from_secs(5));

        relay
            .notify(&json!({"user_id": "abc", "medications": []}))
            .await
            .unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        let (headers, body) = &received[0];
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(body["user_id"], "abc");
    }

    #[tokio::test]
    async fn test_notify_reports_error_status() {
        let (url, _received) = spawn_analyzer(StatusCode::NOT_FOUND).await;
        let relay = WebhookRelay::new(url, Duration::from_secs(5));

        let err = relay.notify(&json!({})).await.unwrap_err();
        match err {
            RelayError::Status { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "accepted");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_notify_reports_transport_failure() {
        let relay = WebhookRelay::new(unreachable_url(), Duration::from_secs(2));
        let err = relay.notify(&json!({})).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
    }

    #[tokio::test]
    async fn test_notify_times_out_on_slow_analyzer() {
        let (url, received) = spawn_delayed_analyzer(StatusCode::OK, Duration::from_secs(5)).await;
        let relay = WebhookRelay::new(url, Duration::from_millis(200));

        let started = std::time::Instant::now();
        let err = relay.notify(&json!({"user_id": "slow"})).await.unwrap_err();

        match err {
            RelayError::Transport(e) => assert!(e.is_timeout(), "expected timeout, got {}", e),
            other => panic!("unexpected error: {}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(received.lock().unwrap().len(), 1);
    }
}
