use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{AppError, Result};

pub type JsonMap = Map<String, Value>;

pub const PENDING_CONDITION: &str = "Analysis pending...";

/// Local ISO-8601 timestamp with microseconds, e.g. `2026-10-19T14:03:11.402113`.
pub fn iso_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// An intake form submission as stored in the intake log.
///
/// The client's fields are kept untouched and in their original order; the
/// server only adds `user_id`, `timestamp`, `server_received_at` and, when the
/// client left it out, an empty `medications` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmittedRecord(JsonMap);

impl SubmittedRecord {
    pub fn from_submission(body: Value) -> Result<Self> {
        let Value::Object(mut fields) = body else {
            return Err(AppError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_type_name(&body)
            )));
        };

        let now = iso_now();
        fields.insert(
            "user_id".to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
        fields.insert("timestamp".to_string(), Value::String(now.clone()));
        fields.insert("server_received_at".to_string(), Value::String(now));

        if !fields.contains_key("medications") {
            fields.insert("medications".to_string(), Value::Array(Vec::new()));
        }

        Ok(Self(fields))
    }

    pub fn user_id(&self) -> &str {
        self.0
            .get("user_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &JsonMap {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// The analysis shape the frontend renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub predicted_condition: Value,
    pub medication_alerts: Value,
    pub home_remedies: Value,
    pub diet_plan: Value,
    pub youtube_videos: Value,
}

impl AnalysisResult {
    /// Normalize whatever the analyzer posted back.
    ///
    /// A non-empty list resolves to its last entry. Anything that is not a
    /// mapping after that yields `None`. Unknown fields are dropped.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        if is_blank(raw) {
            return None;
        }

        let latest = match raw {
            Value::Array(items) => items.last()?,
            other => other,
        };
        let fields = latest.as_object()?;

        let list = |key: &str| {
            fields
                .get(key)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()))
        };

        Some(Self {
            predicted_condition: fields
                .get("predicted_condition")
                .cloned()
                .unwrap_or_else(|| Value::String(PENDING_CONDITION.to_string())),
            medication_alerts: list("medication_alerts"),
            home_remedies: list("home_remedies"),
            diet_plan: list("diet_plan"),
            youtube_videos: list("youtube_videos"),
        })
    }
}

/// JSON values the analyzer slot treats as "nothing stored yet".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitFailure {
    pub success: bool,
    pub error: String,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
