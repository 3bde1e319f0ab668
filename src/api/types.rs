//! API request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `/chat` and `/chathtml`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub product_description: Option<String>,
    /// Integer or numeric string
    #[serde(default)]
    pub init_count: Option<Value>,
}

/// Body of `/chat/stream`; exactly one stop parameter must be given
#[derive(Debug, Deserialize)]
pub struct StreamChatRequest {
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub init_count: Option<Value>,
    #[serde(default)]
    pub duration_secs: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: &'static str,
}

/// Slack slash-command payload (form encoded)
#[derive(Debug, Deserialize)]
pub struct SlackCommandForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub response_url: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthRedirectQuery {
    pub code: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
