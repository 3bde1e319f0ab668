//! Delivery of messages to a slash command's `response_url`

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Slack returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Who sees a reply: the whole channel or only the invoking user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlackMessage {
    pub response_type: ResponseType,
    pub text: String,
}

impl SlackMessage {
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
        }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
        }
    }
}

/// Posts JSON messages to Slack response URLs
#[derive(Clone)]
pub struct ResponseUrlClient {
    client: Client,
    timeout: Duration,
}

impl ResponseUrlClient {
    /// `timeout` bounds each delivery from connect to the end of the response.
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    pub async fn post(&self, response_url: &str, message: &SlackMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(response_url)
            .timeout(self.timeout)
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        Ok(())
    }
}
