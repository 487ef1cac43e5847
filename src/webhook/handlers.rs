//! Webhook endpoint handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::webhook::error::ApiError;
use crate::webhook::state::AppState;

pub const ROOT_TEXT: &str = "Hello from Koyeb - you reached the main page!";
pub const DEFAULT_USER: &str = "Unknown";
pub const IGNORED: &str = "ignored";

/// Incoming chat message as posted by the chat platform
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct WebhookPayload {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Any JSON value; judged by truthiness
    #[serde(default)]
    pub bot: Value,
}

impl WebhookPayload {
    /// Parses a request body; `None` unless it is a JSON object of the expected shape
    pub fn parse(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }

    pub fn user_id(&self) -> &str {
        self.user_name.as_deref().unwrap_or(DEFAULT_USER)
    }

    /// Bot-authored or empty messages are not answered
    pub fn should_ignore(&self) -> bool {
        is_truthy(&self.bot) || self.text.as_deref().is_none_or(str::is_empty)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QueryResponse {
    Reply { text: String },
    Ignored { status: String },
}

impl QueryResponse {
    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply { text: text.into() }
    }

    pub fn ignored() -> Self {
        Self::Ignored {
            status: IGNORED.to_string(),
        }
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub async fn root() -> Json<Value> {
    Json(serde_json::json!({ "text": ROOT_TEXT }))
}

pub async fn query(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QueryResponse>, ApiError> {
    let Some(payload) = WebhookPayload::parse(&body) else {
        debug!(bytes = body.len(), "Ignoring malformed webhook body");
        return Ok(Json(QueryResponse::ignored()));
    };

    if payload.should_ignore() {
        debug!(user = %payload.user_id(), "Ignoring bot or empty message");
        return Ok(Json(QueryResponse::ignored()));
    }

    let user_id = payload.user_id();
    let text = payload.text.as_deref().unwrap_or_default();
    info!(user = %user_id, "Message received");

    let reply = state.orchestrator.handle_message(user_id, text).await?;
    Ok(Json(QueryResponse::reply(reply)))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
