use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

/// Success envelope: `{ "success": true, "message"?: ..., <payload keys> }`
#[derive(Debug)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    fn with_status(status: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        ApiResponse { status, body }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body.insert("message".to_string(), Value::String(message.into()));
        self
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            error!("Failed to serialize response field {}: {}", key, e);
            Value::Null
        });
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}
